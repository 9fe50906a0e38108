// gametail - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr only. Stdout is reserved for tailed lines.

use tracing_subscriber::EnvFilter;

/// Resolve the filter directive string with the documented priority.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default "info".
/// Returns `None` when RUST_LOG should be used verbatim.
fn filter_directive(
    rust_log_set: bool,
    debug_flag: bool,
    config_level: Option<&str>,
) -> Option<String> {
    if rust_log_set {
        None
    } else if debug_flag {
        Some("debug".to_string())
    } else if let Some(level) = config_level {
        Some(level.to_string())
    } else {
        Some(super::constants::DEFAULT_LOG_LEVEL.to_string())
    }
}

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the level from config.toml (if present).
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = match filter_directive(
        std::env::var("RUST_LOG").is_ok(),
        debug_flag,
        config_level,
    ) {
        None => EnvFilter::from_default_env(),
        Some(directive) => EnvFilter::new(directive),
    };

    // try_init: a second call (tests, embedding hosts) must not panic.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_wins_over_everything() {
        assert_eq!(filter_directive(true, true, Some("trace")), None);
    }

    #[test]
    fn debug_flag_beats_config_level() {
        assert_eq!(
            filter_directive(false, true, Some("warn")).as_deref(),
            Some("debug")
        );
    }

    #[test]
    fn falls_back_to_default_level() {
        assert_eq!(filter_directive(false, false, None).as_deref(), Some("info"));
        assert_eq!(
            filter_directive(false, false, Some("warn")).as_deref(),
            Some("warn")
        );
    }
}
