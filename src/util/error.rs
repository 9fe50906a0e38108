// gametail - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Conditions the tail loop recovers from by polling (process not found,
// file not yet present) are not represented here; they never surface as
// errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all gametail operations.
#[derive(Debug)]
pub enum GameTailError {
    /// Opening or reading the tailed log failed.
    Source(SourceError),

    /// Enumerating the process table failed.
    Locator(LocatorError),

    /// Configuration loading, validation, or writing failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for GameTailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Log source error: {e}"),
            Self::Locator(e) => write!(f, "Process locator error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for GameTailError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Locator(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Line source errors
// ---------------------------------------------------------------------------

/// Errors raised while opening or positioning the tailed log file.
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be opened (usually: not created yet).
    Open { path: PathBuf, source: io::Error },

    /// Seeking to the current end of the file failed.
    Seek { path: PathBuf, source: io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Cannot open '{}': {source}", path.display())
            }
            Self::Seek { path, source } => {
                write!(f, "Cannot seek to end of '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Seek { source, .. } => Some(source),
        }
    }
}

impl From<SourceError> for GameTailError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Process locator errors
// ---------------------------------------------------------------------------

/// Errors raised by a process table implementation.
///
/// The locator converts every variant into "not found"; they exist so the
/// table implementation can report *why* a scan produced nothing.
#[derive(Debug)]
pub enum LocatorError {
    /// The process table could not be enumerated (permissions, races).
    ScanFailed { reason: String },
}

impl fmt::Display for LocatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanFailed { reason } => write!(f, "Process table scan failed: {reason}"),
        }
    }
}

impl std::error::Error for LocatorError {}

impl From<LocatorError> for GameTailError {
    fn from(e: LocatorError) -> Self {
        Self::Locator(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading and validation.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading or writing the config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for GameTailError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for gametail results.
pub type Result<T> = std::result::Result<T, GameTailError>;
