//! Mode-stack scanner for the ES|QL pipe query language
//!
//! A query is split into [`Token`]s by a [`Scanner`] that keeps an explicit
//! stack of lexer modes: each command word switches the active vocabulary
//! until the next `|`. The scanner never fails; lexical problems travel in-band
//! on the token that caused them and the token sequence always covers the input
//! exactly.
//!
//! ```
//! use esql_lexer::{tokenize_all, TokenKind, VersionGate};
//!
//! let tokens = tokenize_all("FROM logs-* | KEEP host", VersionGate::RELEASE);
//! assert_eq!(tokens[0].kind, TokenKind::From);
//! assert!(tokens.last().is_some_and(|t| t.is_eof()));
//! ```

pub mod batch;
pub mod config;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

pub use batch::{BatchConfig, BatchError, BatchResults, QueryInput};
pub use grammar::Mode;
pub use lexical::{
    tokenize, tokenize_all, Diagnostic, LexerError, LexicalAnalyzer, LexicalError, Scanner,
    VersionGate,
};
pub use tokens::{Channel, Token, TokenKind, TokenStream};
