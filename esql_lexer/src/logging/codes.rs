//! Error, warning and success codes with their classification metadata
//!
//! Every code the crate logs is declared here once, together with the
//! metadata used for detailed and JSON formatting.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Severity::Critical),
            "High" => Some(Severity::High),
            "Medium" => Some(Severity::Medium),
            "Low" => Some(Severity::Low),
            _ => None,
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Lexical diagnostics and analyzer limits
pub mod lexical {
    use super::Code;

    pub const UNRECOGNIZED_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_LITERAL: Code = Code::new("E021");
    pub const INVALID_ESCAPE_SEQUENCE: Code = Code::new("E022");
    pub const UNBALANCED_MODE: Code = Code::new("E023");
    pub const MODE_STACK_OVERFLOW: Code = Code::new("E024");
    pub const SOURCE_TOO_LARGE: Code = Code::new("E025");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
}

pub mod config {
    use super::Code;

    pub const INVALID_CONFIGURATION: Code = Code::new("E030");
}

pub mod batch {
    use super::Code;

    pub const BATCH_TOO_LARGE: Code = Code::new("E060");
    pub const WORKER_THREAD_FAILURE: Code = Code::new("E061");
    pub const EMPTY_BATCH: Code = Code::new("E062");
    pub const QUERY_FAILED: Code = Code::new("E063");
}

pub mod warnings {
    use super::Code;

    pub const GENERIC: Code = Code::new("W000");
    pub const EVENT_LIMIT_REACHED: Code = Code::new("W001");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

pub mod success {
    use super::Code;

    pub const GENERIC_INFO: Code = Code::new("I000");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const BATCH_COMPLETE: Code = Code::new("I030");
}

pub const GENERIC_DEBUG: Code = Code::new("D000");

// ============================================================================
// METADATA REGISTRY
// ============================================================================

const METADATA: &[ErrorMetadata] = &[
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Critical internal error",
        "File a bug report with the query that triggered it",
    ),
    ErrorMetadata::new(
        "ERR002",
        "System",
        Severity::Critical,
        false,
        true,
        "Logging or runtime initialization failed",
        "Check runtime preferences and initialize only once",
    ),
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Character cannot start any token in the current mode",
        "Remove the character or quote it inside a string or identifier",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "String, block comment or quoted identifier is not closed",
        "Add the missing closing delimiter",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Backslash escape is not one of \\t \\n \\r \\\" \\\\",
        "Use a supported escape or a triple-quoted string",
    ),
    ErrorMetadata::new(
        "E023",
        "Lexical",
        Severity::Medium,
        true,
        false,
        "Closing token found with no enclosing context",
        "Remove the stray closing bracket or pipe",
    ),
    ErrorMetadata::new(
        "E024",
        "Lexical",
        Severity::High,
        true,
        false,
        "Nesting exceeds the configured maximum mode depth",
        "Reduce bracket nesting or raise max_mode_depth",
    ),
    ErrorMetadata::new(
        "E025",
        "Lexical",
        Severity::High,
        false,
        true,
        "Query exceeds the maximum source size",
        "Split the query or raise max_source_size",
    ),
    ErrorMetadata::new(
        "E027",
        "Lexical",
        Severity::High,
        false,
        true,
        "Query produces more tokens than allowed",
        "Split the query or raise max_token_count",
    ),
    ErrorMetadata::new(
        "E030",
        "Configuration",
        Severity::Medium,
        false,
        false,
        "Runtime preference file is unreadable or invalid",
        "Fix the TOML file or remove it to use defaults",
    ),
    ErrorMetadata::new(
        "E060",
        "Batch",
        Severity::Medium,
        false,
        true,
        "Batch holds more queries than allowed",
        "Submit the queries in smaller batches",
    ),
    ErrorMetadata::new(
        "E061",
        "Batch",
        Severity::High,
        false,
        true,
        "A worker thread panicked",
        "Rerun the batch sequentially to isolate the query",
    ),
    ErrorMetadata::new(
        "E062",
        "Batch",
        Severity::Low,
        true,
        false,
        "Batch contains no queries",
        "Provide at least one query",
    ),
    ErrorMetadata::new(
        "E063",
        "Batch",
        Severity::Medium,
        true,
        false,
        "A query in the batch failed to tokenize",
        "Inspect the per-query failure",
    ),
    ErrorMetadata::new(
        "W001",
        "Logging",
        Severity::Low,
        true,
        false,
        "Per-query event limit reached; later events were dropped",
        "Raise max_log_events_per_query",
    ),
    ErrorMetadata::new(
        "I004",
        "System",
        Severity::Low,
        true,
        false,
        "Logging initialized",
        "None",
    ),
    ErrorMetadata::new(
        "I020",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Query tokenized",
        "Hand the token stream to the parser",
    ),
    ErrorMetadata::new(
        "I030",
        "Batch",
        Severity::Low,
        true,
        false,
        "Batch tokenized",
        "Inspect per-query results",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| METADATA.iter().map(|meta| (meta.code, meta)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_codes_are_unique() {
        let codes: HashSet<_> = METADATA.iter().map(|m| m.code).collect();
        assert_eq!(codes.len(), METADATA.len());
    }

    #[test]
    fn test_every_logged_error_code_has_metadata() {
        let declared = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            lexical::UNRECOGNIZED_CHARACTER,
            lexical::UNTERMINATED_LITERAL,
            lexical::INVALID_ESCAPE_SEQUENCE,
            lexical::UNBALANCED_MODE,
            lexical::MODE_STACK_OVERFLOW,
            lexical::SOURCE_TOO_LARGE,
            lexical::TOO_MANY_TOKENS,
            config::INVALID_CONFIGURATION,
            batch::BATCH_TOO_LARGE,
            batch::WORKER_THREAD_FAILURE,
            batch::EMPTY_BATCH,
            batch::QUERY_FAILED,
            success::TOKENIZATION_COMPLETE,
            success::BATCH_COMPLETE,
        ];
        for code in declared {
            assert!(get_error_metadata(code.as_str()).is_some(), "{}", code);
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E021"), "Lexical");
        assert!(is_recoverable("E021"));
        assert!(!requires_halt("E021"));

        assert_eq!(get_severity("E027"), Severity::High);
        assert!(requires_halt("E027"));

        assert_eq!(get_category("X999"), "Unknown");
        assert_eq!(get_description("X999"), "Unknown error");
        assert_eq!(Severity::parse(Severity::Low.as_str()), Some(Severity::Low));
    }
}
