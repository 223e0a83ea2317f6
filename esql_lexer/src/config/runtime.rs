// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use super::compile_time::{batch_processing, lexical};

/// Errors raised while loading runtime preferences
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid runtime configuration: {message}")]
    Parse { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalPreferences {
    /// Whether preview-only syntax (DEV_JOIN, DEV_METRICS, gated params) is recognized
    pub dev_version: bool,

    /// Whether the first in-band diagnostic aborts the analyzer run
    pub strict: bool,

    /// Whether to collect per-category token metrics
    pub collect_detailed_metrics: bool,

    /// Whether to keep a histogram of emitted token kinds
    pub track_kind_usage: bool,

    /// Whether to show position information in error messages
    pub include_position_in_errors: bool,

    /// Whether every diagnostic is reported through the logging layer
    pub log_diagnostics: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            dev_version: env::var("ESQL_LEXER_DEV_VERSION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(lexical::DEV_VERSION_DEFAULT),
            strict: env::var("ESQL_LEXER_STRICT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            collect_detailed_metrics: env::var("ESQL_LEXICAL_DETAILED_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            track_kind_usage: env::var("ESQL_LEXICAL_TRACK_KINDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            include_position_in_errors: env::var("ESQL_LEXICAL_INCLUDE_POSITIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_diagnostics: env::var("ESQL_LEXICAL_LOG_DIAGNOSTICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Worker threads used for parallel batches (clamped to the build-time maximum)
    pub max_threads: usize,

    /// Whether the batch stops at the first failed query
    pub fail_fast: bool,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            max_threads: env::var("ESQL_BATCH_MAX_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(available)
                .clamp(1, batch_processing::MAX_WORKER_THREADS),
            fail_fast: env::var("ESQL_BATCH_FAIL_FAST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Preferred minimum log level (within security constraints)
    pub min_log_level: LogLevel,

    /// Whether batch query identifiers are attached to log events
    pub include_query_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("ESQL_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("ESQL_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("ESQL_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            include_query_context: env::var("ESQL_LOGGING_INCLUDE_QUERY_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML; missing tables and keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: RuntimeConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            })?;
        config.batch.max_threads = config
            .batch
            .max_threads
            .clamp(1, batch_processing::MAX_WORKER_THREADS);
        Ok(config)
    }

    /// Load preferences from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Render the effective preferences as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexical
    pub const LEXER_DEV_VERSION: &str = "ESQL_LEXER_DEV_VERSION";
    pub const LEXER_STRICT: &str = "ESQL_LEXER_STRICT";
    pub const LEXICAL_DETAILED_METRICS: &str = "ESQL_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_TRACK_KINDS: &str = "ESQL_LEXICAL_TRACK_KINDS";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "ESQL_LEXICAL_INCLUDE_POSITIONS";
    pub const LEXICAL_LOG_DIAGNOSTICS: &str = "ESQL_LEXICAL_LOG_DIAGNOSTICS";

    // Batch
    pub const BATCH_MAX_THREADS: &str = "ESQL_BATCH_MAX_THREADS";
    pub const BATCH_FAIL_FAST: &str = "ESQL_BATCH_FAIL_FAST";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ESQL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ESQL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ESQL_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_QUERY_CONTEXT: &str = "ESQL_LOGGING_INCLUDE_QUERY_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [lexical]
            dev_version = true
            strict = true

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(config.lexical.dev_version);
        assert!(config.lexical.strict);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
        assert!(config.batch.max_threads >= 1);
    }

    #[test]
    fn test_thread_count_is_clamped() {
        let config = RuntimeConfig::from_toml_str("[batch]\nmax_threads = 0\n").unwrap();
        assert_eq!(config.batch.max_threads, 1);

        let config = RuntimeConfig::from_toml_str("[batch]\nmax_threads = 100000\n").unwrap();
        assert_eq!(config.batch.max_threads, batch_processing::MAX_WORKER_THREADS);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = RuntimeConfig::from_toml_str("[lexical]\ndev_version = \"maybe\"\n");
        assert_matches!(result, Err(ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[batch]\nfail_fast = true").unwrap();

        let config = RuntimeConfig::from_file(file.path()).unwrap();
        assert!(config.batch.fail_fast);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = RuntimeConfig::from_file(dir.path().join("absent.toml"));
        assert_matches!(result, Err(ConfigError::Io { .. }));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let config = RuntimeConfig::default();
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(RuntimeConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
