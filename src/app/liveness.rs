// gametail - app/liveness.rs
//
// Amortised producer liveness checks.
//
// Scanning the process table is far more expensive than a failed read, so the
// tail loop does not check on every idle tick. It reports each empty poll
// here; only when `threshold` consecutive empty polls have accumulated is the
// process table scanned once. A line of output resets the count.

use crate::core::model::LivenessCheckResult;
use crate::platform::process::ProcessLocator;

/// What the tail loop should do after an empty poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleVerdict {
    /// Keep polling.
    KeepWaiting,
    /// The producer process is no longer running.
    ProducerGone,
}

/// Decides, on a bounded cadence, whether the producer is still alive.
pub struct LivenessMonitor {
    locator: ProcessLocator,
    target_name: String,
    threshold: u32,
    missed_polls: u32,
}

impl LivenessMonitor {
    /// `threshold` is clamped to at least one poll.
    pub fn new(locator: ProcessLocator, target_name: impl Into<String>, threshold: u32) -> Self {
        Self {
            locator,
            target_name: target_name.into(),
            threshold: threshold.max(1),
            missed_polls: 0,
        }
    }

    /// Single unconditional check by name.
    pub fn is_alive(&self, target_name: &str) -> bool {
        self.locator.find_process(target_name).is_some()
    }

    /// Single unconditional check of the monitored target.
    pub fn check(&self) -> LivenessCheckResult {
        LivenessCheckResult::from(self.locator.find_process(&self.target_name))
    }

    /// Consecutive empty polls since the last line or check.
    pub fn missed_polls(&self) -> u32 {
        self.missed_polls
    }

    /// A line was produced: the producer is evidently alive.
    pub fn record_activity(&mut self) {
        self.missed_polls = 0;
    }

    /// Start counting afresh, e.g. when the tail loop changes phase.
    pub fn reset(&mut self) {
        self.missed_polls = 0;
    }

    /// Record one empty poll; scans the process table when the threshold is
    /// reached.
    pub fn record_idle_poll(&mut self) -> IdleVerdict {
        self.missed_polls += 1;
        if self.missed_polls < self.threshold {
            return IdleVerdict::KeepWaiting;
        }

        let result = self.check();
        tracing::debug!(
            target_name = %self.target_name,
            alive = result.alive,
            missed_polls = self.missed_polls,
            "Producer liveness check"
        );
        if result.alive {
            self.missed_polls = 0;
            IdleVerdict::KeepWaiting
        } else {
            IdleVerdict::ProducerGone
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ProcessHandle;
    use crate::platform::process::ProcessTable;
    use crate::util::error::LocatorError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Table whose producer can be killed; counts scans.
    #[derive(Default)]
    struct SwitchTable {
        alive: AtomicBool,
        scans: AtomicUsize,
    }

    impl ProcessTable for SwitchTable {
        fn snapshot(&self) -> Result<Vec<ProcessHandle>, LocatorError> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            if self.alive.load(Ordering::SeqCst) {
                Ok(vec![ProcessHandle {
                    pid: 7,
                    name: "game.exe".to_string(),
                    executable_path: None,
                }])
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn monitor(table: &Arc<SwitchTable>, threshold: u32) -> LivenessMonitor {
        let table: Arc<dyn ProcessTable> = table.clone();
        LivenessMonitor::new(ProcessLocator::new(table, "Game.log"), "game.exe", threshold)
    }

    #[test]
    fn scans_only_at_threshold() {
        let table = Arc::new(SwitchTable::default());
        table.alive.store(true, Ordering::SeqCst);
        let mut m = monitor(&table, 6);

        for _ in 0..5 {
            assert_eq!(m.record_idle_poll(), IdleVerdict::KeepWaiting);
        }
        assert_eq!(table.scans.load(Ordering::SeqCst), 0);

        assert_eq!(m.record_idle_poll(), IdleVerdict::KeepWaiting);
        assert_eq!(table.scans.load(Ordering::SeqCst), 1);
        assert_eq!(m.missed_polls(), 0, "alive check resets the counter");
    }

    #[test]
    fn reports_gone_after_threshold_polls() {
        let table = Arc::new(SwitchTable::default());
        let mut m = monitor(&table, 3);

        assert_eq!(m.record_idle_poll(), IdleVerdict::KeepWaiting);
        assert_eq!(m.record_idle_poll(), IdleVerdict::KeepWaiting);
        assert_eq!(m.record_idle_poll(), IdleVerdict::ProducerGone);
    }

    #[test]
    fn activity_resets_the_count() {
        let table = Arc::new(SwitchTable::default());
        let mut m = monitor(&table, 2);

        assert_eq!(m.record_idle_poll(), IdleVerdict::KeepWaiting);
        m.record_activity();
        assert_eq!(m.record_idle_poll(), IdleVerdict::KeepWaiting);
        assert_eq!(table.scans.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn is_alive_and_check() {
        let table = Arc::new(SwitchTable::default());
        let m = monitor(&table, 1);
        assert!(!m.is_alive("game.exe"));
        assert!(!m.check().alive);

        table.alive.store(true, Ordering::SeqCst);
        assert!(m.is_alive("game.exe"));
        assert!(!m.is_alive("other.exe"));
        assert!(m.check().alive);
    }
}
