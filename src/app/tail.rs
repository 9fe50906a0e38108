// gametail - app/tail.rs
//
// Live tail of the producer's log, on a background thread.
//
// Architecture:
//   - `TailManager` lives on the host thread; `run_tail_loop` runs on a
//     dedicated background thread per session.
//   - An `Arc<AtomicBool>` cancel flag allows the host to stop the tail. It is
//     the only state written from outside the background thread.
//   - Lines and lifecycle events are sent as `TailProgress` messages over one
//     mpsc channel, in file order, one message per line.
//
// State machine:
//   AwaitingProcess -> AwaitingFile -> Tailing -> Stopped
//   Every phase checks the cancel flag at least once per iteration, and every
//   sleep is sliced so cancellation is observed within
//   TAIL_CANCEL_CHECK_INTERVAL_MS. Every exit path sends exactly one
//   `ProducerEnded`, after the file handle has been released.
//
// Non-fatal conditions:
//   - Producer not running, or its log not created yet: keep polling.
//   - Process table scan failure: treated as "not found".
//   - Truncated/rotated log: the line source stalls; the loop keeps idling
//     until cancelled or, in auto-exit mode, until the producer exits.
//   - Host dropped the receiver: the loop exits silently.

use crate::app::liveness::{IdleVerdict, LivenessMonitor};
use crate::core::line_source::{LineSource, LogFollower};
use crate::core::model::{StopReason, TaggedLine, TailPhase, TailProgress, TailState};
use crate::platform::config::AppConfig;
use crate::platform::process::ProcessLocator;
use crate::util::constants::{
    DEBUG_MAX_LINE_PREVIEW, DEFAULT_AUTO_EXIT, DEFAULT_LIVENESS_THRESHOLD, DEFAULT_PROCESS_NAME,
    TAIL_CANCEL_CHECK_INTERVAL_MS, TAIL_POLL_FLOOR_MS, TAIL_POLL_INTERVAL_MS,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

// =============================================================================
// Configuration
// =============================================================================

/// Read-only inputs of one tail session.
#[derive(Debug, Clone, PartialEq)]
pub struct TailConfig {
    /// Producer executable name, matched exactly.
    pub process_name: String,
    /// End the session when the producer exits.
    pub auto_exit: bool,
    /// Delay between unsuccessful attempts. Raised to `TAIL_POLL_FLOOR_MS`
    /// if lower.
    pub poll_interval: Duration,
    /// Empty polls between liveness checks.
    pub liveness_threshold: u32,
    /// Follow this file instead of deriving the path from the producer.
    pub log_path_override: Option<PathBuf>,
}

impl Default for TailConfig {
    fn default() -> Self {
        Self {
            process_name: DEFAULT_PROCESS_NAME.to_string(),
            auto_exit: DEFAULT_AUTO_EXIT,
            poll_interval: Duration::from_millis(TAIL_POLL_INTERVAL_MS),
            liveness_threshold: DEFAULT_LIVENESS_THRESHOLD,
            log_path_override: None,
        }
    }
}

impl TailConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            process_name: config.process_name.clone(),
            auto_exit: config.auto_exit,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            liveness_threshold: config.liveness_threshold,
            log_path_override: None,
        }
    }
}

// =============================================================================
// TailManager
// =============================================================================

/// Manages one live tail session on a background thread.
///
/// Exposes a start/stop/poll interface to the host thread.
pub struct TailManager {
    /// Channel receiver for the host to poll tail progress messages.
    progress_rx: Option<mpsc::Receiver<TailProgress>>,
    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
    worker: Option<JoinHandle<()>>,
}

impl TailManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
            worker: None,
        }
    }

    /// Start a new session. Any running session is stopped first and its
    /// pending messages are discarded.
    pub fn start_tail(&mut self, config: TailConfig, locator: ProcessLocator) {
        self.stop_tail();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        let process_name = config.process_name.clone();
        let auto_exit = config.auto_exit;
        self.worker = Some(std::thread::spawn(move || {
            run_tail_loop(config, locator, tx, cancel);
        }));

        tracing::info!(process = %process_name, auto_exit, "Live tail started");
    }

    /// Ask the background thread to stop without waiting for it.
    ///
    /// The thread observes the flag within `TAIL_CANCEL_CHECK_INTERVAL_MS` and
    /// sends `ProducerEnded` before terminating. Safe to call repeatedly.
    pub fn request_stop(&self) {
        if let Some(flag) = &self.cancel_flag {
            flag.store(true, Ordering::SeqCst);
        }
    }

    /// Stop the session and wait for the background thread to exit.
    ///
    /// Messages already queued, including the final `ProducerEnded`, stay
    /// available to `poll_progress` until the next `start_tail`.
    pub fn stop_tail(&mut self) {
        self.request_stop();
        self.cancel_flag = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Tail thread panicked");
            }
        }
    }

    /// Returns `true` while the background thread is running.
    pub fn is_active(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Drain all currently queued messages without blocking.
    pub fn poll_progress(&self) -> Vec<TailProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while let Ok(msg) = rx.try_recv() {
                messages.push(msg);
            }
        }
        messages
    }

    /// Take one queued message without blocking.
    pub fn try_next(&self) -> Option<TailProgress> {
        self.progress_rx.as_ref()?.try_recv().ok()
    }

    /// Wait up to `timeout` for the next message.
    ///
    /// Returns `None` on timeout, or when no session was ever started or the
    /// background thread has exited and the queue is empty.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<TailProgress> {
        self.progress_rx.as_ref()?.recv_timeout(timeout).ok()
    }
}

impl Default for TailManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TailManager {
    fn drop(&mut self) {
        self.request_stop();
    }
}

// =============================================================================
// Background tail loop
// =============================================================================

/// The host dropped its receiver; nothing is listening any more.
struct ConsumerGone;

/// Outcome of a waiting phase.
enum Waited<T> {
    Ready(T),
    Stop(StopReason),
}

struct TailLoop {
    config: TailConfig,
    locator: ProcessLocator,
    monitor: LivenessMonitor,
    tx: mpsc::Sender<TailProgress>,
    cancel: Arc<AtomicBool>,
    state: TailState,
    lines_emitted: u64,
}

/// Run one tail session to completion on the current thread.
///
/// Sends `Started`, phase changes, lines, and finally exactly one
/// `ProducerEnded` on `tx`, unless the receiver is dropped first.
pub fn run_tail_loop(
    mut config: TailConfig,
    locator: ProcessLocator,
    tx: mpsc::Sender<TailProgress>,
    cancel: Arc<AtomicBool>,
) {
    let floor = Duration::from_millis(TAIL_POLL_FLOOR_MS);
    if config.poll_interval < floor {
        tracing::debug!(
            requested_ms = config.poll_interval.as_millis() as u64,
            floor_ms = TAIL_POLL_FLOOR_MS,
            "Poll interval raised to floor"
        );
        config.poll_interval = floor;
    }
    let monitor = LivenessMonitor::new(
        locator.clone(),
        config.process_name.clone(),
        config.liveness_threshold,
    );
    let mut tail = TailLoop {
        config,
        locator,
        monitor,
        tx,
        cancel,
        state: TailState::default(),
        lines_emitted: 0,
    };

    match tail.drive() {
        Ok(reason) => {
            tracing::info!(
                ?reason,
                lines = tail.lines_emitted,
                file = ?tail.state.file_path,
                "Live tail stopped"
            );
            // Receiver may already be gone; nothing left to do either way.
            let _ = tail.send(TailProgress::PhaseChanged(TailPhase::Stopped));
            let _ = tail.send(TailProgress::ProducerEnded {
                reason,
                lines_emitted: tail.lines_emitted,
            });
        }
        Err(ConsumerGone) => {
            tracing::debug!("Tail output channel closed; exiting silently");
        }
    }
}

impl TailLoop {
    fn send(&self, msg: TailProgress) -> Result<(), ConsumerGone> {
        self.tx.send(msg).map_err(|_| ConsumerGone)
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    fn enter(&mut self, phase: TailPhase) -> Result<(), ConsumerGone> {
        tracing::debug!(%phase, "Tail phase");
        self.monitor.reset();
        self.state.missed_poll_count = 0;
        self.send(TailProgress::PhaseChanged(phase))
    }

    /// Sleep one poll interval in cancel-check slices.
    ///
    /// Returns `false` if cancellation was observed.
    fn sleep_poll(&self) -> bool {
        let slice =
            Duration::from_millis(TAIL_CANCEL_CHECK_INTERVAL_MS).min(self.config.poll_interval);
        let deadline = Instant::now() + self.config.poll_interval;
        loop {
            if self.cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(slice.min(deadline - now));
        }
    }

    /// Count an empty poll; in auto-exit mode this may end the session.
    fn idle_poll(&mut self) -> Option<StopReason> {
        if !self.config.auto_exit {
            self.state.missed_poll_count = self.state.missed_poll_count.saturating_add(1);
            return None;
        }
        let verdict = self.monitor.record_idle_poll();
        self.state.missed_poll_count = self.monitor.missed_polls();
        match verdict {
            IdleVerdict::ProducerGone => {
                tracing::info!(process = %self.config.process_name, "Producer process exited");
                Some(StopReason::ProducerExited)
            }
            IdleVerdict::KeepWaiting => None,
        }
    }

    fn drive(&mut self) -> Result<StopReason, ConsumerGone> {
        self.send(TailProgress::Started)?;

        let path = match self.await_log_path()? {
            Waited::Ready(path) => path,
            Waited::Stop(reason) => return Ok(reason),
        };

        // The source is dropped (file closed) when this function returns,
        // before the caller sends `ProducerEnded`.
        let mut source = match self.await_file(&path)? {
            Waited::Ready(source) => source,
            Waited::Stop(reason) => return Ok(reason),
        };

        self.follow(&mut source)
    }

    /// AwaitingProcess: poll the process table until the producer appears.
    fn await_log_path(&mut self) -> Result<Waited<PathBuf>, ConsumerGone> {
        if let Some(path) = self.config.log_path_override.clone() {
            tracing::info!(file = %path.display(), "Following explicit log path");
            self.state.resolve_path(path.clone());
            return Ok(Waited::Ready(path));
        }

        self.enter(TailPhase::AwaitingProcess)?;
        tracing::debug!(process = %self.config.process_name, "Waiting for producer process");
        let mut unusable_reported = false;

        loop {
            if self.cancelled() {
                tracing::debug!("Cancelled before producer started");
                return Ok(Waited::Stop(StopReason::Cancelled));
            }

            if let Some(handle) = self.locator.find_process(&self.config.process_name) {
                if let Some(path) = self.locator.derive_log_path(&handle) {
                    tracing::info!(
                        pid = handle.pid,
                        file = %path.display(),
                        "Producer process found"
                    );
                    self.state.resolve_path(path.clone());
                    return Ok(Waited::Ready(path));
                }
                // Executable path not visible (yet); a later scan may expose it.
                if !unusable_reported {
                    tracing::warn!(
                        pid = handle.pid,
                        exe = ?handle.executable_path,
                        "Cannot derive log location from producer executable; still waiting"
                    );
                    unusable_reported = true;
                }
            }

            if !self.sleep_poll() {
                return Ok(Waited::Stop(StopReason::Cancelled));
            }
        }
    }

    /// AwaitingFile: retry opening the derived path until it exists.
    fn await_file(&mut self, path: &Path) -> Result<Waited<LineSource>, ConsumerGone> {
        self.enter(TailPhase::AwaitingFile)?;
        let mut reported = false;

        loop {
            if self.cancelled() {
                return Ok(Waited::Stop(StopReason::Cancelled));
            }

            match LineSource::open(path) {
                Ok(source) => return Ok(Waited::Ready(source)),
                Err(e) if !reported => {
                    tracing::debug!(error = %e, "Log file not available yet");
                    reported = true;
                }
                Err(_) => {}
            }

            if !self.sleep_poll() {
                return Ok(Waited::Stop(StopReason::Cancelled));
            }
            if let Some(reason) = self.idle_poll() {
                return Ok(Waited::Stop(reason));
            }
        }
    }

    /// Tailing: deliver lines as they appear.
    fn follow(&mut self, source: &mut LineSource) -> Result<StopReason, ConsumerGone> {
        self.enter(TailPhase::Tailing)?;
        tracing::info!(file = %source.path().display(), "Tailing log file");

        loop {
            if self.cancelled() {
                return Ok(StopReason::Cancelled);
            }

            if let Some(text) = source.next_line() {
                self.monitor.record_activity();
                self.state.missed_poll_count = 0;
                self.lines_emitted += 1;
                tracing::trace!(
                    line = %preview(&text),
                    n = self.lines_emitted,
                    "Tail: new line"
                );
                self.send(TailProgress::Line(TaggedLine::plain(text)))?;
                // Read again straight away to drain a burst.
                continue;
            }

            if !self.sleep_poll() {
                return Ok(StopReason::Cancelled);
            }
            if let Some(reason) = self.idle_poll() {
                return Ok(reason);
            }
        }
    }
}

/// Truncate a line for debug output.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ProcessHandle;
    use crate::platform::process::ProcessTable;
    use crate::util::error::LocatorError;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const GAME: &str = "game.exe";

    /// Scripted process table: the producer is present while `exe` is set.
    #[derive(Default)]
    struct ScriptedTable {
        exe: Mutex<Option<PathBuf>>,
        scans: AtomicUsize,
    }

    impl ScriptedTable {
        fn launch(&self, exe: PathBuf) {
            *self.exe.lock().unwrap() = Some(exe);
        }

        fn kill(&self) {
            *self.exe.lock().unwrap() = None;
        }
    }

    impl ProcessTable for ScriptedTable {
        fn snapshot(&self) -> Result<Vec<ProcessHandle>, LocatorError> {
            self.scans.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .exe
                .lock()
                .unwrap()
                .clone()
                .map(|exe| ProcessHandle {
                    pid: 100,
                    name: GAME.to_string(),
                    executable_path: Some(exe),
                })
                .into_iter()
                .collect())
        }
    }

    fn fast_config(auto_exit: bool, threshold: u32) -> TailConfig {
        TailConfig {
            process_name: GAME.to_string(),
            auto_exit,
            poll_interval: Duration::from_millis(20),
            liveness_threshold: threshold,
            log_path_override: None,
        }
    }

    fn locator(table: &Arc<ScriptedTable>) -> ProcessLocator {
        let table: Arc<dyn ProcessTable> = table.clone();
        ProcessLocator::new(table, "Game.log")
    }

    /// Creates `<root>/Bin64/game.exe`'s expected layout and returns
    /// (exe path, log path).
    fn install(dir: &TempDir) -> (PathBuf, PathBuf) {
        let bin = dir.path().join("LIVE").join("Bin64");
        fs::create_dir_all(&bin).expect("mkdir");
        (bin.join(GAME), dir.path().join("LIVE").join("Game.log"))
    }

    fn append(path: &Path, text: &str) {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("open");
        f.write_all(text.as_bytes()).expect("write");
    }

    fn wait_for(manager: &TailManager, pred: impl Fn(&TailProgress) -> bool) -> Vec<TailProgress> {
        let mut seen = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(msg) = manager.recv_timeout(Duration::from_millis(50)) {
                let done = pred(&msg);
                seen.push(msg);
                if done {
                    return seen;
                }
            }
        }
        panic!("timed out; seen: {seen:?}");
    }

    fn lines(msgs: &[TailProgress]) -> Vec<String> {
        msgs.iter()
            .filter_map(|m| match m {
                TailProgress::Line(l) => Some(l.text.clone()),
                _ => None,
            })
            .collect()
    }

    fn ended_count(msgs: &[TailProgress]) -> usize {
        msgs.iter()
            .filter(|m| matches!(m, TailProgress::ProducerEnded { .. }))
            .count()
    }

    #[test]
    fn cancel_before_process_found_ends_once_with_no_lines() {
        let table = Arc::new(ScriptedTable::default());
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(true));

        run_tail_loop(fast_config(true, 3), locator(&table), tx, cancel);

        let msgs: Vec<_> = rx.try_iter().collect();
        assert_eq!(msgs.first(), Some(&TailProgress::Started));
        assert_eq!(
            msgs.last(),
            Some(&TailProgress::ProducerEnded {
                reason: StopReason::Cancelled,
                lines_emitted: 0
            })
        );
        assert_eq!(ended_count(&msgs), 1);
        assert!(lines(&msgs).is_empty());
    }

    #[test]
    fn never_found_stays_awaiting_process_until_cancelled() {
        let table = Arc::new(ScriptedTable::default());
        let mut manager = TailManager::new();
        manager.start_tail(fast_config(true, 1), locator(&table));

        std::thread::sleep(Duration::from_millis(200));
        assert!(manager.is_active());
        assert!(table.scans.load(Ordering::SeqCst) >= 2, "must keep polling");

        manager.stop_tail();
        let msgs = manager.poll_progress();
        assert!(!msgs.contains(&TailProgress::PhaseChanged(TailPhase::AwaitingFile)));
        assert_eq!(ended_count(&msgs), 1);
        assert!(lines(&msgs).is_empty());
    }

    #[test]
    fn waits_for_log_file_then_tails_new_lines_in_order() {
        let dir = TempDir::new().expect("tmpdir");
        let (exe, log) = install(&dir);
        let table = Arc::new(ScriptedTable::default());
        table.launch(exe);

        let mut manager = TailManager::new();
        manager.start_tail(fast_config(false, 1), locator(&table));
        wait_for(&manager, |m| {
            *m == TailProgress::PhaseChanged(TailPhase::AwaitingFile)
        });

        // Game creates its log with some history before the tailer opens it.
        let staging = log.with_extension("staging");
        fs::write(&staging, "history\n").expect("write");
        fs::rename(&staging, &log).expect("rename");
        wait_for(&manager, |m| *m == TailProgress::PhaseChanged(TailPhase::Tailing));

        append(&log, "A\nB\nC\n");
        let msgs = wait_for(&manager, |m| matches!(m, TailProgress::Line(l) if l.text == "C"));
        assert_eq!(lines(&msgs), vec!["A", "B", "C"]);

        manager.stop_tail();
        let rest = manager.poll_progress();
        assert_eq!(
            rest.last(),
            Some(&TailProgress::ProducerEnded {
                reason: StopReason::Cancelled,
                lines_emitted: 3
            })
        );
    }

    #[test]
    fn auto_exit_stops_after_threshold_idle_polls() {
        let dir = TempDir::new().expect("tmpdir");
        let log = dir.path().join("Game.log");
        fs::write(&log, "").expect("create log");
        // Producer never running; the explicit path lets tailing begin anyway.
        let table = Arc::new(ScriptedTable::default());

        let mut config = fast_config(true, 4);
        config.log_path_override = Some(log);
        let started = Instant::now();
        let mut manager = TailManager::new();
        manager.start_tail(config, locator(&table));

        let msgs = wait_for(&manager, |m| matches!(m, TailProgress::ProducerEnded { .. }));
        let elapsed = started.elapsed();
        assert_eq!(
            msgs.last(),
            Some(&TailProgress::ProducerEnded {
                reason: StopReason::ProducerExited,
                lines_emitted: 0
            })
        );
        // Four full 20 ms polls before the single liveness scan.
        assert!(elapsed >= Duration::from_millis(80), "ended too early: {elapsed:?}");
        assert_eq!(table.scans.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn auto_exit_notices_producer_exit_while_tailing() {
        let dir = TempDir::new().expect("tmpdir");
        let (exe, log) = install(&dir);
        fs::write(&log, "").expect("create log");
        let table = Arc::new(ScriptedTable::default());
        table.launch(exe);

        let mut manager = TailManager::new();
        manager.start_tail(fast_config(true, 3), locator(&table));
        wait_for(&manager, |m| *m == TailProgress::PhaseChanged(TailPhase::Tailing));

        append(&log, "last words\n");
        let msgs = wait_for(&manager, |m| matches!(m, TailProgress::Line(_)));
        assert_eq!(lines(&msgs), vec!["last words"]);
        table.kill();

        let msgs = wait_for(&manager, |m| matches!(m, TailProgress::ProducerEnded { .. }));
        assert_eq!(
            msgs.last(),
            Some(&TailProgress::ProducerEnded {
                reason: StopReason::ProducerExited,
                lines_emitted: 1
            })
        );
    }

    #[test]
    fn without_auto_exit_producer_death_is_ignored() {
        let dir = TempDir::new().expect("tmpdir");
        let (exe, log) = install(&dir);
        fs::write(&log, "").expect("create log");
        let table = Arc::new(ScriptedTable::default());
        table.launch(exe);

        let mut manager = TailManager::new();
        manager.start_tail(fast_config(false, 1), locator(&table));
        wait_for(&manager, |m| *m == TailProgress::PhaseChanged(TailPhase::Tailing));
        table.kill();

        std::thread::sleep(Duration::from_millis(150));
        assert!(manager.is_active());
        append(&log, "still here\n");
        wait_for(&manager, |m| matches!(m, TailProgress::Line(_)));
        manager.stop_tail();
    }

    #[test]
    fn explicit_path_skips_process_lookup() {
        let dir = TempDir::new().expect("tmpdir");
        let log = dir.path().join("custom.log");
        fs::write(&log, "").expect("create log");
        let table = Arc::new(ScriptedTable::default());

        let mut config = fast_config(false, 1);
        config.log_path_override = Some(log.clone());
        let mut manager = TailManager::new();
        manager.start_tail(config, locator(&table));

        let msgs = wait_for(&manager, |m| *m == TailProgress::PhaseChanged(TailPhase::Tailing));
        assert!(!msgs.contains(&TailProgress::PhaseChanged(TailPhase::AwaitingProcess)));
        assert_eq!(table.scans.load(Ordering::SeqCst), 0);
        manager.stop_tail();
    }

    #[test]
    fn zero_poll_interval_is_raised_to_floor() {
        let dir = TempDir::new().expect("tmpdir");
        let log = dir.path().join("Game.log");
        fs::write(&log, "").expect("create log");
        let table = Arc::new(ScriptedTable::default());

        let mut config = fast_config(true, 3);
        config.poll_interval = Duration::ZERO;
        config.log_path_override = Some(log);
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();
        run_tail_loop(config, locator(&table), tx, Arc::new(AtomicBool::new(false)));

        let floor = Duration::from_millis(TAIL_POLL_FLOOR_MS);
        assert!(started.elapsed() >= floor * 3, "idle polls did not sleep");
        assert_eq!(table.scans.load(Ordering::SeqCst), 1);
        assert_eq!(
            rx.try_iter().last(),
            Some(TailProgress::ProducerEnded {
                reason: StopReason::ProducerExited,
                lines_emitted: 0
            })
        );
    }

    #[test]
    fn unusable_executable_path_keeps_waiting_until_it_resolves() {
        let dir = TempDir::new().expect("tmpdir");
        let (exe, log) = install(&dir);
        fs::write(&log, "").expect("create log");
        let table = Arc::new(ScriptedTable::default());
        // Too shallow to have a grandparent directory.
        table.launch(PathBuf::from(GAME));

        let mut manager = TailManager::new();
        manager.start_tail(fast_config(true, 1), locator(&table));
        std::thread::sleep(Duration::from_millis(150));
        assert!(manager.is_active());
        assert!(table.scans.load(Ordering::SeqCst) >= 3, "must keep polling");
        let msgs = manager.poll_progress();
        assert!(!msgs.contains(&TailProgress::PhaseChanged(TailPhase::AwaitingFile)));

        table.launch(exe);
        wait_for(&manager, |m| *m == TailProgress::PhaseChanged(TailPhase::Tailing));
        manager.stop_tail();
    }

    #[test]
    fn dropped_receiver_ends_thread() {
        let table = Arc::new(ScriptedTable::default());
        let (tx, rx) = mpsc::channel();
        drop(rx);
        // Would loop forever in AwaitingProcess if the closed channel were ignored.
        run_tail_loop(
            fast_config(true, 1),
            locator(&table),
            tx,
            Arc::new(AtomicBool::new(false)),
        );
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(DEBUG_MAX_LINE_PREVIEW + 5);
        assert_eq!(preview(&long).chars().count(), DEBUG_MAX_LINE_PREVIEW);
        assert_eq!(preview("short"), "short");
    }
}
