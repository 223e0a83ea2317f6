//! Shared source-location utilities for the ES|QL lexer

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
