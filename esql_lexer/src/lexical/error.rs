//! Lexical diagnostics and analyzer failures
//!
//! [`LexicalError`] travels in-band on the token that triggered it; the scanner
//! never aborts a pass. [`LexerError`] is the hard failure an analyzer run
//! returns when a compile-time limit is exceeded or strict mode is on.

use crate::config::compile_time::lexical::{MAX_SOURCE_SIZE, MAX_TOKEN_COUNT};
use crate::grammar::Mode;
use crate::logging::codes;
use crate::utils::Spanned;
use serde::Serialize;
use std::fmt;

/// Delimited constructs that can run off the end of their line or input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LiteralKind {
    /// `"..."` or `"""..."""`
    String,
    /// `/* ... */`
    BlockComment,
    /// `` `...` ``
    QuotedIdentifier,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralKind::String => f.write_str("string"),
            LiteralKind::BlockComment => f.write_str("block comment"),
            LiteralKind::QuotedIdentifier => f.write_str("quoted identifier"),
        }
    }
}

/// Recoverable diagnostic attached to a token
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum LexicalError {
    #[error("Unterminated {literal}")]
    UnterminatedLiteral { literal: LiteralKind },

    #[error("Unrecognized character {character:?}")]
    UnrecognizedCharacter { character: char },

    #[error("Invalid escape sequence '{sequence}'")]
    InvalidEscapeSequence { sequence: String },

    #[error("Unbalanced mode: pop requested with only {mode} on the stack")]
    UnbalancedMode { mode: Mode },

    #[error("Mode stack overflow: cannot enter {mode} at depth {depth}")]
    ModeStackOverflow { depth: usize, mode: Mode },
}

impl LexicalError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexicalError::UnterminatedLiteral { .. } => codes::lexical::UNTERMINATED_LITERAL,
            LexicalError::UnrecognizedCharacter { .. } => codes::lexical::UNRECOGNIZED_CHARACTER,
            LexicalError::InvalidEscapeSequence { .. } => {
                codes::lexical::INVALID_ESCAPE_SEQUENCE
            }
            LexicalError::UnbalancedMode { .. } => codes::lexical::UNBALANCED_MODE,
            LexicalError::ModeStackOverflow { .. } => codes::lexical::MODE_STACK_OVERFLOW,
        }
    }
}

/// A lexical error together with the source range of the token that raised it
pub type Diagnostic = Spanned<LexicalError>;

/// Hard failure of an analyzer run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Source too large: {size} bytes (max {limit})")]
    SourceTooLarge { size: usize, limit: usize },

    #[error("Too many tokens: {count} (max {limit})")]
    TooManyTokens { count: usize, limit: usize },

    #[error("{diagnostic} at line {line}, column {column}")]
    Strict {
        diagnostic: LexicalError,
        line: u32,
        column: u32,
    },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::SourceTooLarge { .. } => codes::lexical::SOURCE_TOO_LARGE,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::Strict { diagnostic, .. } => diagnostic.error_code(),
        }
    }
}
