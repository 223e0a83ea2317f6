//! Logging configuration: compile-time limits plus runtime preferences
//!
//! The compile-time values come from the build profile and cannot be
//! changed at runtime. Preferences may be installed once; until then the
//! environment-derived defaults apply.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;
type RuntimeLogLevel = crate::config::runtime::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime logging preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

/// Floor below which events can never be filtered out
pub fn get_security_log_level() -> EventsLogLevel {
    EventsLogLevel::from_u8(SECURITY_MIN_LOG_LEVEL)
}

/// Effective minimum level: the user preference, but never stricter than the security floor
pub fn effective_min_level(preferred: RuntimeLogLevel) -> EventsLogLevel {
    preferred
        .to_events_log_level()
        .max(get_security_log_level())
}

pub fn get_min_log_level() -> EventsLogLevel {
    effective_min_level(get_runtime_preferences().min_log_level)
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Whether events raised inside a batch query carry the query id and label
pub fn include_query_context() -> bool {
    get_runtime_preferences().include_query_context
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_events_per_query() -> usize {
    MAX_LOG_EVENTS_PER_QUERY
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }
    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }
    if MAX_LOG_EVENTS_PER_QUERY > LOG_BUFFER_SIZE {
        return Err("Max log events per query exceeds total buffer size".to_string());
    }
    if SECURITY_MIN_LOG_LEVEL > 3 {
        return Err(format!(
            "Security minimum log level out of range: {}",
            SECURITY_MIN_LOG_LEVEL
        ));
    }
    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Compile-time ===\n\
         - Log buffer size: {}\n\
         - Max events per query: {}\n\
         - Max message length: {}\n\
         - Security min level: {}\n\
         === Runtime ===\n\
         - Min log level: {} (effective {})\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Include query context: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_QUERY,
        MAX_LOG_MESSAGE_LENGTH,
        get_security_log_level().as_str(),
        preferences.min_log_level.as_str(),
        get_min_log_level().as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.include_query_context,
    )
}

pub fn get_development_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: false,
        enable_console_logging: true,
        min_log_level: RuntimeLogLevel::Debug,
        include_query_context: true,
    }
}

pub fn get_production_preferences() -> LoggingPreferences {
    LoggingPreferences {
        use_structured_logging: true,
        enable_console_logging: true,
        min_log_level: RuntimeLogLevel::Info,
        include_query_context: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_security_floor_cannot_be_undercut() {
        let floor = get_security_log_level();
        assert_eq!(effective_min_level(RuntimeLogLevel::Error), floor);
        assert_eq!(
            effective_min_level(RuntimeLogLevel::Debug),
            EventsLogLevel::Debug
        );
    }

    #[test]
    fn test_summary_lists_limits() {
        let summary = get_config_summary();
        assert!(summary.contains(&format!("Log buffer size: {}", LOG_BUFFER_SIZE)));
        assert!(summary.contains("Include query context"));
    }

    #[test]
    fn test_profiles_differ() {
        assert!(get_production_preferences().use_structured_logging);
        assert_eq!(
            get_development_preferences().min_log_level,
            RuntimeLogLevel::Debug
        );
    }
}
