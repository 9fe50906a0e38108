// gametail - core/model.rs
//
// Data types shared by the tail loop, the host dispatch layer, and tests.
// Pure data: no I/O, no threads.

use std::path::PathBuf;

// =============================================================================
// Process information
// =============================================================================

/// A snapshot of one running OS process.
///
/// Queried fresh on every lookup and never cached across producer restarts:
/// a restarted producer has a new pid and possibly a new install location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    /// OS process identifier.
    pub pid: u32,
    /// Executable file name as reported by the OS (e.g. `StarCitizen.exe`).
    pub name: String,
    /// Absolute path of the executable, when the OS exposes it.
    pub executable_path: Option<PathBuf>,
}

/// Outcome of a single producer liveness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessCheckResult {
    /// Whether a process with the target name was found.
    pub alive: bool,
    /// Executable path of the found process, used to recompute the log path
    /// when the producer appears after the session started waiting.
    pub executable_path: Option<PathBuf>,
}

impl LivenessCheckResult {
    pub fn gone() -> Self {
        Self {
            alive: false,
            executable_path: None,
        }
    }
}

impl From<Option<ProcessHandle>> for LivenessCheckResult {
    fn from(handle: Option<ProcessHandle>) -> Self {
        match handle {
            Some(h) => Self {
                alive: true,
                executable_path: h.executable_path,
            },
            None => Self::gone(),
        }
    }
}

// =============================================================================
// Lines
// =============================================================================

/// One newline-stripped line of log text, optionally tagged.
///
/// The tailer never generates a tag; it exists so consumers that inject their
/// own messages (update notices, status banners) can mark a message class
/// without a second channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedLine {
    /// Opaque message-class tag. `None` for every line read from the log.
    pub tag: Option<u8>,
    /// Line text without its terminating newline.
    pub text: String,
}

impl TaggedLine {
    /// An untagged line, as produced by the tailer.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            tag: None,
            text: text.into(),
        }
    }

    /// A line carrying a consumer-defined message class.
    pub fn tagged(tag: u8, text: impl Into<String>) -> Self {
        Self {
            tag: Some(tag),
            text: text.into(),
        }
    }
}

// =============================================================================
// Session state
// =============================================================================

/// Phase of the tail loop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailPhase {
    /// No producer process found yet.
    AwaitingProcess,
    /// Log path resolved; waiting for the file to become openable.
    AwaitingFile,
    /// File open; lines are being delivered.
    Tailing,
    /// Terminal.
    Stopped,
}

impl std::fmt::Display for TailPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitingProcess => "awaiting process",
            Self::AwaitingFile => "awaiting file",
            Self::Tailing => "tailing",
            Self::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Why a session reached `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The owning host requested shutdown.
    Cancelled,
    /// Auto-exit mode found the producer process gone.
    ProducerExited,
}

/// Mutable bookkeeping for one tailing session.
///
/// The cancellation flag belonging to the session lives outside this struct
/// (an `Arc<AtomicBool>` shared with the host) since it is the only state
/// written from another thread.
#[derive(Debug, Default)]
pub struct TailState {
    /// Resolved log path. Set at most once per session, never cleared.
    pub file_path: Option<PathBuf>,
    /// True once the producer lookup phase has completed.
    pub initialized: bool,
    /// Consecutive empty polls since the last line or liveness check.
    pub missed_poll_count: u32,
}

impl TailState {
    /// Record the resolved log path.
    ///
    /// Later calls are ignored: the first resolved path stays for the whole
    /// session.
    pub fn resolve_path(&mut self, path: PathBuf) {
        if self.file_path.is_none() {
            self.file_path = Some(path);
        }
        self.initialized = true;
    }
}

// =============================================================================
// Progress messages (background thread -> host)
// =============================================================================

/// Messages sent from the tail thread to the host over the output channel.
///
/// Within one session the order is: `Started`, any number of `PhaseChanged`
/// and `Line` messages, then exactly one `ProducerEnded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailProgress {
    /// The background thread is running.
    Started,
    /// The state machine entered a new phase.
    PhaseChanged(TailPhase),
    /// A new line was read from the log.
    Line(TaggedLine),
    /// The session is over. Sent exactly once.
    ProducerEnded {
        reason: StopReason,
        lines_emitted: u64,
    },
}
