//! Token types for ES|QL lexical analysis
//!
//! - [`TokenKind`]: the token vocabulary (ids, symbolic and literal names)
//! - [`Token`]: one emitted token with text, channel, span and originating mode
//! - [`TokenStream`]: a materialized token sequence with significant-token
//!   navigation, diagnostics and losslessness validation

pub mod kind;
pub mod token;
pub mod token_stream;

pub use kind::{TokenCategory, TokenKind};
pub use token::{Channel, Token};
pub use token_stream::{TokenStream, TokenStreamError};

pub use crate::utils::{Position, SourceMap, Span, Spanned};
