// gametail - app/dispatch.rs
//
// Host-side delivery of tail output.
//
// The host implements `LineConsumer` and hands it to one of the pump
// functions below, which drain the session's channel on the host's own
// thread. Consumers therefore never need to be `Send`.

use crate::app::tail::TailManager;
use crate::core::backlog::RecentLines;
use crate::core::format::OutputStyle;
use crate::core::model::{StopReason, TaggedLine, TailPhase, TailProgress};
use crate::util::constants::MAX_TAIL_MESSAGES_PER_DISPATCH;
use std::time::{Duration, Instant};

/// Receiver of tailed lines and the end-of-session signal.
pub trait LineConsumer {
    /// Called once per line, in file order.
    fn on_line(&mut self, line: TaggedLine);

    /// Called exactly once, after the last line of the session.
    fn on_producer_ended(&mut self, reason: StopReason);

    /// Called when the tail loop changes phase. Default: ignored.
    fn on_phase(&mut self, _phase: TailPhase) {}
}

/// Result of a pump call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// The session is still running (or nothing has been received yet).
    Running,
    /// `ProducerEnded` was delivered during this call.
    Ended(StopReason),
}

/// Route one message to the consumer.
pub fn deliver(msg: TailProgress, consumer: &mut dyn LineConsumer) -> DispatchStatus {
    match msg {
        TailProgress::Started => DispatchStatus::Running,
        TailProgress::PhaseChanged(phase) => {
            consumer.on_phase(phase);
            DispatchStatus::Running
        }
        TailProgress::Line(line) => {
            consumer.on_line(line);
            DispatchStatus::Running
        }
        TailProgress::ProducerEnded {
            reason,
            lines_emitted,
        } => {
            tracing::debug!(?reason, lines_emitted, "Delivering producer-ended signal");
            consumer.on_producer_ended(reason);
            DispatchStatus::Ended(reason)
        }
    }
}

/// Deliver queued messages without blocking, at most
/// `MAX_TAIL_MESSAGES_PER_DISPATCH` per call so a burst cannot stall the host.
pub fn dispatch_pending(manager: &TailManager, consumer: &mut dyn LineConsumer) -> DispatchStatus {
    for _ in 0..MAX_TAIL_MESSAGES_PER_DISPATCH {
        let Some(msg) = manager.try_next() else {
            break;
        };
        if let DispatchStatus::Ended(reason) = deliver(msg, consumer) {
            return DispatchStatus::Ended(reason);
        }
    }
    DispatchStatus::Running
}

/// Block for up to `timeout`, delivering messages as they arrive. Returns as
/// soon as the session ends.
pub fn dispatch_for(
    manager: &TailManager,
    consumer: &mut dyn LineConsumer,
    timeout: Duration,
) -> DispatchStatus {
    let deadline = Instant::now() + timeout;
    loop {
        let now = Instant::now();
        if now >= deadline {
            return DispatchStatus::Running;
        }
        match manager.recv_timeout(deadline - now) {
            Some(msg) => {
                if let DispatchStatus::Ended(reason) = deliver(msg, consumer) {
                    return DispatchStatus::Ended(reason);
                }
            }
            // Timed out, or the session thread exited and the queue is drained.
            None => return DispatchStatus::Running,
        }
    }
}

// =============================================================================
// Overlay feed
// =============================================================================

/// Consumer that keeps the last N lines rendered for an overlay-style view.
#[derive(Debug, Clone)]
pub struct OverlayFeed {
    lines: RecentLines,
    style: OutputStyle,
    ended: Option<StopReason>,
    phase: Option<TailPhase>,
}

impl OverlayFeed {
    pub fn new(line_count: usize, style: OutputStyle) -> Self {
        Self {
            lines: RecentLines::new(line_count),
            style,
            ended: None,
            phase: None,
        }
    }

    /// Change how many lines are kept, keeping the newest.
    pub fn set_line_count(&mut self, line_count: usize) {
        self.lines.resize(line_count);
    }

    /// Inject a host message (e.g. an update notice) between tailed lines.
    pub fn push_message(&mut self, tag: u8, text: impl Into<String>) {
        self.lines.push(TaggedLine::tagged(tag, text));
    }

    /// The current window, rendered in the feed's style.
    pub fn render(&self) -> String {
        self.lines.render(self.style)
    }

    pub fn ended(&self) -> Option<StopReason> {
        self.ended
    }

    pub fn phase(&self) -> Option<TailPhase> {
        self.phase
    }
}

impl LineConsumer for OverlayFeed {
    fn on_line(&mut self, line: TaggedLine) {
        self.lines.push(line);
    }

    fn on_producer_ended(&mut self, reason: StopReason) {
        self.ended = Some(reason);
    }

    fn on_phase(&mut self, phase: TailPhase) {
        self.phase = Some(phase);
    }
}
