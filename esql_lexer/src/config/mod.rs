//! Configuration module for the ES|QL lexer
//!
//! Build-time limits come from the TOML profile compiled in by build.rs;
//! user-facing preferences live in [`runtime`].

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    BatchPreferences, ConfigError, LexicalPreferences, LogLevel, LoggingPreferences,
    RuntimeConfig,
};

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("ESQL_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("ESQL_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time::{batch_processing, lexical, logging};
    use super::*;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(lexical::MAX_SOURCE_SIZE > 0);
        assert!(lexical::MAX_TOKEN_COUNT > 0);
        assert!(lexical::MAX_MODE_DEPTH >= 4);
        assert!(batch_processing::MAX_WORKER_THREADS > 0);
        assert!(logging::MAX_LOG_EVENTS_PER_QUERY <= logging::LOG_BUFFER_SIZE);
    }

    #[test]
    fn test_source_info_names_profile() {
        let info = build_info::source_info();
        assert!(info.contains(build_info::profile()));
        assert!(info.ends_with(".toml"));
    }
}
