//! Lexical analysis for ES|QL queries
//!
//! The [`Scanner`] is a pure mode-stack tokenizer: it never fails and never
//! logs. [`LexicalAnalyzer`] wraps it with the build-time limits, metrics,
//! strict mode and diagnostic logging, and produces a [`TokenStream`].

pub mod analyzer;
pub mod error;
pub mod gate;
pub mod matchers;
pub mod mode_stack;
pub mod scanner;

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{TokenCategory, TokenKind, TokenStream};

pub use analyzer::{LexicalAnalyzer, LexicalMetrics};
pub use error::{Diagnostic, LexerError, LexicalError, LiteralKind};
pub use gate::VersionGate;
pub use mode_stack::ModeStack;
pub use scanner::{tokenize_all, Scanner, Tokens};

/// Tokenize with preferences taken from the environment
pub fn tokenize(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

/// Tokenize with explicit runtime preferences; build-time limits still apply
pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::with_preferences(preferences).tokenize(source)
}

pub fn create_analyzer() -> LexicalAnalyzer {
    LexicalAnalyzer::new()
}

pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

const LEXICAL_CODES: [codes::Code; 7] = [
    codes::lexical::UNRECOGNIZED_CHARACTER,
    codes::lexical::UNTERMINATED_LITERAL,
    codes::lexical::INVALID_ESCAPE_SEQUENCE,
    codes::lexical::UNBALANCED_MODE,
    codes::lexical::MODE_STACK_OVERFLOW,
    codes::lexical::SOURCE_TOO_LARGE,
    codes::lexical::TOO_MANY_TOKENS,
];

/// Check that every lexical code is registered, then log the active limits
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    for code in &LEXICAL_CODES {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    crate::log_debug!("Lexical limits initialized",
        "max_source_size" => MAX_SOURCE_SIZE,
        "max_token_count" => MAX_TOKEN_COUNT,
        "max_mode_depth" => MAX_MODE_DEPTH,
        "dev_version_default" => DEV_VERSION_DEFAULT
    );

    Ok(())
}

/// Sanity-check the code registry and the build-time limits
pub fn validate_tokenization() -> Result<(), String> {
    for code in &LEXICAL_CODES {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!(
                "Lexical error code {} has no description",
                code.as_str()
            ));
        }
    }

    if MAX_SOURCE_SIZE == 0 {
        return Err("MAX_SOURCE_SIZE cannot be zero".to_string());
    }
    if MAX_TOKEN_COUNT == 0 {
        return Err("MAX_TOKEN_COUNT cannot be zero".to_string());
    }
    // every command pushes at least one mode and brackets push two
    if MAX_MODE_DEPTH < 4 {
        return Err(format!("MAX_MODE_DEPTH too small: {}", MAX_MODE_DEPTH));
    }
    if MAX_TOKEN_COUNT > MAX_SOURCE_SIZE.saturating_add(1) {
        return Err("MAX_TOKEN_COUNT exceeds one token per source byte".to_string());
    }

    Ok(())
}

pub fn get_security_limits() -> SecurityLimits {
    SecurityLimits {
        max_source_size: MAX_SOURCE_SIZE,
        max_token_count: MAX_TOKEN_COUNT,
        max_mode_depth: MAX_MODE_DEPTH,
        dev_version_default: DEV_VERSION_DEFAULT,
    }
}

/// Build-time limits in effect for this binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityLimits {
    pub max_source_size: usize,
    pub max_token_count: usize,
    pub max_mode_depth: usize,
    pub dev_version_default: bool,
}

impl SecurityLimits {
    /// Conservative bounds for services that lex untrusted queries
    pub fn is_within_recommended_bounds(&self) -> bool {
        self.max_source_size <= 10_000_000
            && self.max_token_count <= 5_000_000
            && self.max_mode_depth <= 1024
            && !self.dev_version_default
    }
}

// ============================================================================
// TOKEN DISTRIBUTION
// ============================================================================

/// Per-category token counts for an already tokenized stream
pub fn get_token_counts(token_stream: &TokenStream) -> TokenCounts {
    let mut counts = TokenCounts::default();

    for token in token_stream.all_tokens() {
        counts.total += 1;
        if token.is_hidden() {
            counts.hidden += 1;
        }
        if token.has_diagnostic() {
            counts.diagnostics += 1;
        }
        match token.category() {
            TokenCategory::Command | TokenCategory::DevCommand => counts.commands += 1,
            TokenCategory::Keyword => counts.keywords += 1,
            TokenCategory::Operator => counts.operators += 1,
            TokenCategory::Punctuation => counts.punctuation += 1,
            TokenCategory::Literal => counts.literals += 1,
            TokenCategory::Identifier => counts.identifiers += 1,
            TokenCategory::Source => counts.sources += 1,
            TokenCategory::Parameter => counts.parameters += 1,
            TokenCategory::Comment => counts.comments += 1,
            TokenCategory::Whitespace => counts.whitespace += 1,
            TokenCategory::Special if token.kind == TokenKind::Unrecognized => {
                counts.unrecognized += 1
            }
            TokenCategory::Special => {}
        }
    }

    counts
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCounts {
    pub total: usize,
    pub hidden: usize,
    pub commands: usize,
    pub keywords: usize,
    pub operators: usize,
    pub punctuation: usize,
    pub literals: usize,
    pub identifiers: usize,
    pub sources: usize,
    pub parameters: usize,
    pub comments: usize,
    pub whitespace: usize,
    pub unrecognized: usize,
    pub diagnostics: usize,
}

impl TokenCounts {
    /// Default-channel tokens other than `Eof`
    pub fn significant_tokens(&self) -> usize {
        self.total
            .saturating_sub(self.hidden)
            .saturating_sub(1)
    }

    /// Whether the query holds anything besides trivia
    pub fn has_content(&self) -> bool {
        self.significant_tokens() > 0
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics == 0 && self.unrecognized == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} tokens ({} significant, {} hidden): {} commands, {} identifiers, {} literals, {} operators, {} diagnostics",
            self.total,
            self.significant_tokens(),
            self.hidden,
            self.commands,
            self.identifiers,
            self.literals,
            self.operators,
            self.diagnostics
        )
    }
}
