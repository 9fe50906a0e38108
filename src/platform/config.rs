// gametail - platform/config.rs
//
// Platform-specific config directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::format::OutputStyle;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for gametail configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/gametail/ or %APPDATA%\gametail\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Full path of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[tail]` section.
    pub tail: TailSection,
    /// `[display]` section.
    pub display: DisplaySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[tail]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TailSection {
    /// Producer executable name (exact match).
    pub process_name: Option<String>,
    /// End the session when the producer exits.
    pub auto_exit: Option<bool>,
    /// Poll interval in ms.
    pub poll_interval_ms: Option<u64>,
    /// Idle polls between liveness checks.
    pub liveness_threshold: Option<u32>,
    /// Log file name relative to the producer's install root.
    pub log_file_name: Option<String>,
}

/// `[display]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Number of recent lines kept on screen.
    pub line_count: Option<usize>,
    /// "plain", "ansi", or "html".
    pub style: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    // -- Tail --
    pub process_name: String,
    pub auto_exit: bool,
    pub poll_interval_ms: u64,
    pub liveness_threshold: u32,
    pub log_file_name: String,

    // -- Display --
    pub line_count: usize,
    pub style: OutputStyle,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            process_name: constants::DEFAULT_PROCESS_NAME.to_string(),
            auto_exit: constants::DEFAULT_AUTO_EXIT,
            poll_interval_ms: constants::TAIL_POLL_INTERVAL_MS,
            liveness_threshold: constants::DEFAULT_LIVENESS_THRESHOLD,
            log_file_name: constants::DEFAULT_LOG_FILE_NAME.to_string(),
            line_count: constants::DEFAULT_LINE_COUNT,
            style: OutputStyle::default(),
            log_level: None,
        }
    }
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning; the application still
/// starts.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            };
            let msg = format!("{err}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Tail: process_name --
    if let Some(name) = raw.tail.process_name {
        if name.trim().is_empty() {
            warnings.push(format!(
                "[tail] process_name is empty. Using default ({}).",
                constants::DEFAULT_PROCESS_NAME
            ));
        } else {
            config.process_name = name;
        }
    }

    if let Some(auto_exit) = raw.tail.auto_exit {
        config.auto_exit = auto_exit;
    }

    // -- Tail: poll_interval_ms --
    if let Some(ms) = raw.tail.poll_interval_ms {
        if (constants::MIN_TAIL_POLL_INTERVAL_MS..=constants::MAX_TAIL_POLL_INTERVAL_MS)
            .contains(&ms)
        {
            config.poll_interval_ms = ms;
        } else {
            warnings.push(out_of_range(
                "tail.poll_interval_ms",
                ms,
                constants::MIN_TAIL_POLL_INTERVAL_MS,
                constants::MAX_TAIL_POLL_INTERVAL_MS,
                constants::TAIL_POLL_INTERVAL_MS,
            ));
        }
    }

    // -- Tail: liveness_threshold --
    if let Some(n) = raw.tail.liveness_threshold {
        if (constants::MIN_LIVENESS_THRESHOLD..=constants::MAX_LIVENESS_THRESHOLD).contains(&n) {
            config.liveness_threshold = n;
        } else {
            warnings.push(out_of_range(
                "tail.liveness_threshold",
                n,
                constants::MIN_LIVENESS_THRESHOLD,
                constants::MAX_LIVENESS_THRESHOLD,
                constants::DEFAULT_LIVENESS_THRESHOLD,
            ));
        }
    }

    // -- Tail: log_file_name --
    if let Some(name) = raw.tail.log_file_name {
        let bare = Path::new(&name).file_name().map(|f| f == name.as_str());
        if bare == Some(true) {
            config.log_file_name = name;
        } else {
            warnings.push(format!(
                "[tail] log_file_name = \"{name}\" must be a bare file name. Using default ({}).",
                constants::DEFAULT_LOG_FILE_NAME
            ));
        }
    }

    // -- Display: line_count --
    if let Some(count) = raw.display.line_count {
        if (constants::MIN_LINE_COUNT..=constants::MAX_LINE_COUNT).contains(&count) {
            config.line_count = count;
        } else {
            warnings.push(out_of_range(
                "display.line_count",
                count,
                constants::MIN_LINE_COUNT,
                constants::MAX_LINE_COUNT,
                constants::DEFAULT_LINE_COUNT,
            ));
        }
    }

    // -- Display: style --
    if let Some(ref style) = raw.display.style {
        match style.parse::<OutputStyle>() {
            Ok(s) => config.style = s,
            Err(e) => warnings.push(format!("[display] style: {e}. Using default (plain).")),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    config
}

fn out_of_range<T: std::fmt::Display>(field: &str, value: T, min: T, max: T, default: T) -> String {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: format!("{min}-{max}"),
    };
    format!("{err}. Using default ({default}).")
}

// =============================================================================
// First-run default file
// =============================================================================

/// Commented config.toml written on first run.
const DEFAULT_CONFIG_TOML: &str = r#"# gametail configuration

[tail]
# Executable name of the game process (exact, case-sensitive).
process_name = "StarCitizen.exe"

# Whether gametail should also quit when the game quits.
auto_exit = true

# Delay between polls when no new line is available (100-10000 ms).
poll_interval_ms = 1000

# Idle polls between checks that the game is still running (1-60).
liveness_threshold = 6

# Log file name, two directory levels above the game executable.
log_file_name = "Game.log"

[display]
# Number of recent lines kept on screen (1-100).
line_count = 10

# Output style: "plain", "ansi", or "html".
style = "plain"

[logging]
# error, warn, info, debug, trace
level = "info"
"#;

/// Write the commented default config if no file exists at `config_path`.
///
/// Returns `Ok(true)` when a file was written, `Ok(false)` when one already
/// existed.
pub fn write_default_config(config_path: &Path) -> Result<bool, ConfigError> {
    if config_path.exists() {
        return Ok(false);
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(config_path, DEFAULT_CONFIG_TOML).map_err(|source| ConfigError::Io {
        path: config_path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %config_path.display(), "Wrote default config.toml");
    Ok(true)
}
