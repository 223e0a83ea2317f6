//! Materialized token sequence for a single query
//!
//! Keeps every token (hidden ones included) so the stream stays lossless,
//! while navigation methods walk only the significant, default-channel tokens.

use super::kind::TokenKind;
use super::token::Token;
use crate::lexical::error::Diagnostic;
use crate::utils::{SourceMap, Span};

#[derive(Debug, Clone)]
pub struct TokenStream {
    /// All tokens including whitespace and comments, ending with `Eof`
    all_tokens: Vec<Token>,
    /// Indices into all_tokens for default-channel tokens
    significant_indices: Vec<usize>,
    /// Current position in significant_indices
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let significant_indices = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.is_significant())
            .map(|(i, _)| i)
            .collect();

        Self {
            all_tokens: tokens,
            significant_indices,
            position: 0,
            source_map: None,
        }
    }

    /// Create stream with source map for caret diagnostics
    pub fn with_source_map(tokens: Vec<Token>, source_map: SourceMap) -> Self {
        Self {
            source_map: Some(source_map),
            ..Self::new(tokens)
        }
    }

    // === NAVIGATION OVER SIGNIFICANT TOKENS ===

    pub fn current(&self) -> Option<&Token> {
        self.peek_ahead(0)
    }

    pub fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|token| token.kind)
    }

    pub fn peek(&self) -> Option<&Token> {
        self.peek_ahead(1)
    }

    /// Peek ahead by n positions in significant tokens
    pub fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.significant_indices
            .get(self.position + n)
            .and_then(|&index| self.all_tokens.get(index))
    }

    pub fn advance(&mut self) -> Option<&Token> {
        if self.position < self.significant_indices.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn is_at_end(&self) -> bool {
        self.current().map_or(true, Token::is_eof)
    }

    /// Number of significant tokens (including `Eof`)
    pub fn len(&self) -> usize {
        self.significant_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.significant_indices.is_empty()
    }

    pub fn check_kind(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    /// Consume the current token if it has the given kind
    pub fn advance_if_kind(&mut self, kind: TokenKind) -> bool {
        if self.check_kind(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_kind(&mut self, expected: TokenKind) -> Result<Token, TokenStreamError> {
        let current = self
            .current()
            .cloned()
            .ok_or(TokenStreamError::UnexpectedEndOfStream { expected })?;

        if current.kind != expected {
            return Err(TokenStreamError::UnexpectedToken {
                expected,
                found: current.kind,
                span: current.span,
            });
        }

        self.advance();
        Ok(current)
    }

    /// Save current position as checkpoint for backtracking
    pub fn save_position(&self) -> usize {
        self.position
    }

    pub fn restore_position(&mut self, saved_position: usize) {
        self.position = saved_position.min(self.significant_indices.len());
    }

    pub fn position(&self) -> usize {
        self.position
    }

    // === WHOLE-STREAM VIEWS ===

    /// Every token in emission order, hidden ones included
    pub fn all_tokens(&self) -> &[Token] {
        &self.all_tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.all_tokens
    }

    pub fn iter_significant(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices
            .iter()
            .filter_map(|&i| self.all_tokens.get(i))
    }

    pub fn remaining_tokens(&self) -> impl Iterator<Item = &Token> {
        self.significant_indices
            .iter()
            .skip(self.position)
            .filter_map(|&i| self.all_tokens.get(i))
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.all_tokens.iter().map(|token| token.kind).collect()
    }

    pub fn has_eof(&self) -> bool {
        self.all_tokens.last().is_some_and(Token::is_eof)
    }

    /// Concatenated token text; equals the source for every scanned query
    pub fn reconstruct_source(&self) -> String {
        self.all_tokens.iter().map(|token| token.text.as_str()).collect()
    }

    // === DIAGNOSTICS ===

    pub fn has_diagnostics(&self) -> bool {
        self.all_tokens.iter().any(Token::has_diagnostic)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.all_tokens
            .iter()
            .filter_map(|token| {
                token
                    .diagnostic
                    .clone()
                    .map(|error| Diagnostic::new(error, token.span))
            })
            .collect()
    }

    /// Format an error with source context when the source is known
    pub fn format_error(&self, span: Span, message: &str) -> String {
        match &self.source_map {
            Some(source_map) => source_map.format_error(&span, message),
            None => format!("Error at {}: {}", span, message),
        }
    }

    /// One rendered report per diagnostic, in source order
    pub fn render_diagnostics(&self) -> Vec<String> {
        self.diagnostics()
            .iter()
            .map(|diagnostic| self.format_error(diagnostic.span, &diagnostic.value.to_string()))
            .collect()
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Tokens as a JSON array
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.all_tokens)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TokenStreamError {
    #[error("Expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        span: Span,
    },

    #[error("Expected {expected}, but reached end of input")]
    UnexpectedEndOfStream { expected: TokenKind },
}

/// Structural checks over a token stream
pub mod validation {
    use super::*;

    /// Spans must be contiguous: each token starts where the previous one ended
    pub fn validate_span_order(tokens: &[Token]) -> Result<(), String> {
        for window in tokens.windows(2) {
            let (current, next) = (&window[0], &window[1]);
            if current.end_offset() != next.start_offset() {
                return Err(format!(
                    "Span gap between token {} ending at {} and token {} starting at {}",
                    current.token_index,
                    current.end_offset(),
                    next.token_index,
                    next.start_offset()
                ));
            }
        }
        Ok(())
    }

    /// Token indices must count up from zero
    pub fn validate_token_indices(tokens: &[Token]) -> Result<(), String> {
        match tokens
            .iter()
            .enumerate()
            .find(|(i, token)| token.token_index != *i)
        {
            Some((i, token)) => Err(format!(
                "Token at position {} carries index {}",
                i, token.token_index
            )),
            None => Ok(()),
        }
    }

    /// The concatenated token text must reproduce the source exactly
    pub fn validate_lossless(stream: &TokenStream, source: &str) -> Result<(), String> {
        let rebuilt = stream.reconstruct_source();
        if rebuilt == source {
            return Ok(());
        }

        let diverges_at = rebuilt
            .bytes()
            .zip(source.bytes())
            .position(|(a, b)| a != b)
            .unwrap_or_else(|| rebuilt.len().min(source.len()));
        Err(format!(
            "Token text diverges from source at byte {} ({} vs {} bytes)",
            diverges_at,
            rebuilt.len(),
            source.len()
        ))
    }

    pub fn validate_token_stream(stream: &TokenStream, source: &str) -> Result<(), String> {
        if !stream.has_eof() {
            return Err("Token stream does not end with EOF".to_string());
        }
        validate_span_order(stream.all_tokens())?;
        validate_token_indices(stream.all_tokens())?;
        validate_lossless(stream, source)
    }
}
