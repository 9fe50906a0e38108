// gametail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "gametail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "gametail";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Producer process
// =============================================================================

/// Executable name of the producer process, matched exactly (case-sensitive).
pub const DEFAULT_PROCESS_NAME: &str = "StarCitizen.exe";

/// File name of the log, located two directory levels above the executable.
pub const DEFAULT_LOG_FILE_NAME: &str = "Game.log";

/// Whether the session ends when the producer process exits.
pub const DEFAULT_AUTO_EXIT: bool = true;

// =============================================================================
// Live tail timing
// =============================================================================

/// Delay between unsuccessful read, open, or process-lookup attempts (ms).
pub const TAIL_POLL_INTERVAL_MS: u64 = 1_000;

/// Minimum user-configurable poll interval (ms).
pub const MIN_TAIL_POLL_INTERVAL_MS: u64 = 100;

/// Maximum user-configurable poll interval (ms).
pub const MAX_TAIL_POLL_INTERVAL_MS: u64 = 10_000; // 10 s

/// How often the cancel flag is checked within each poll sleep (ms).
/// The background thread wakes every this many ms to check for cancellation.
pub const TAIL_CANCEL_CHECK_INTERVAL_MS: u64 = 100;

/// Lowest poll interval the tail loop will run with, whatever its caller
/// passes (ms). Keeps an idle loop from spinning.
pub const TAIL_POLL_FLOOR_MS: u64 = 10;

/// Consecutive empty polls before the producer's liveness is re-checked.
///
/// With the default poll interval this amortises the process-table scan to
/// one every six seconds of idleness.
pub const DEFAULT_LIVENESS_THRESHOLD: u32 = 6;

/// Minimum user-configurable liveness threshold (polls).
pub const MIN_LIVENESS_THRESHOLD: u32 = 1;

/// Maximum user-configurable liveness threshold (polls).
pub const MAX_LIVENESS_THRESHOLD: u32 = 60;

// =============================================================================
// Line source limits
// =============================================================================

/// Size of the buffered reader wrapped around the tailed file.
pub const LINE_READER_CAPACITY: usize = 64 * 1_024; // 64 KiB

/// Maximum accumulated size of an in-progress (newline-less) line fragment.
///
/// Guards against unbounded growth when the producer writes binary content
/// or an extremely long single line. An oversize fragment is discarded with
/// a warning.
pub const MAX_PARTIAL_LINE_BYTES: usize = 2 * 1_024 * 1_024; // 2 MiB

// =============================================================================
// Display
// =============================================================================

/// Default number of lines kept in the recent-lines backlog.
pub const DEFAULT_LINE_COUNT: usize = 10;

/// Minimum user-configurable backlog size.
pub const MIN_LINE_COUNT: usize = 1;

/// Maximum user-configurable backlog size.
pub const MAX_LINE_COUNT: usize = 100;

/// Maximum number of progress messages drained per dispatch call so a burst
/// cannot starve the host loop.
pub const MAX_TAIL_MESSAGES_PER_DISPATCH: usize = 200;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a tailed line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
