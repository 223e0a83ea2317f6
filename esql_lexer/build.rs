// build.rs - TOML-driven lexer limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    lexical: LexicalLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_source_size: usize,
    max_token_count: usize,
    max_mode_depth: usize,
    dev_version_default: bool,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_queries_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_events_per_query: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ESQL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ESQL_CONFIG_DIR");

    let profile = env::var("ESQL_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ESQL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Configuration lives at the workspace root, one level above this crate
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_SOURCE_SIZE: usize = 100_000_000;
    const ABSOLUTE_MAX_MODE_DEPTH: usize = 4096;

    if config.lexical.max_source_size > ABSOLUTE_MAX_SOURCE_SIZE {
        panic!("SECURITY: max_source_size exceeds absolute maximum");
    }

    // DEFAULT plus at least one command context and a nested bracket pair
    if config.lexical.max_mode_depth < 4 || config.lexical.max_mode_depth > ABSOLUTE_MAX_MODE_DEPTH
    {
        panic!("SECURITY: max_mode_depth must be between 4 and {}", ABSOLUTE_MAX_MODE_DEPTH);
    }

    if config.lexical.max_token_count == 0 {
        panic!("SECURITY: max_token_count cannot be zero");
    }

    if config.batch_processing.max_worker_threads == 0 {
        panic!("SECURITY: max_worker_threads cannot be zero");
    }

    if config.logging.max_log_events_per_query > config.logging.log_buffer_size {
        panic!("SECURITY: max_log_events_per_query exceeds log_buffer_size");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("SECURITY: security_min_log_level too high (max: 2)");
    }

    if profile == "production" {
        if config.lexical.max_source_size > 10_000_000 {
            panic!("PRODUCTION: max_source_size too high for production");
        }
        if config.lexical.dev_version_default {
            panic!("PRODUCTION: preview syntax cannot be enabled by default");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod lexical {{
        pub const MAX_SOURCE_SIZE: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
        pub const MAX_MODE_DEPTH: usize = {};
        pub const DEV_VERSION_DEFAULT: bool = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_QUERIES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_EVENTS_PER_QUERY: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.lexical.max_source_size,
        config.lexical.max_token_count,
        config.lexical.max_mode_depth,
        config.lexical.dev_version_default,
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_queries_per_batch,
        config.logging.log_buffer_size,
        config.logging.max_log_events_per_query,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
