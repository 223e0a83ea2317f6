//! Token record emitted by the scanner

use super::kind::{TokenCategory, TokenKind};
use crate::grammar::Mode;
use crate::lexical::error::LexicalError;
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the grammar consumes a token or skips it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Channel {
    /// Significant to the parser
    #[default]
    Default = 0,
    /// Whitespace and comments
    Hidden = 1,
}

impl Channel {
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Default => "DEFAULT_TOKEN_CHANNEL",
            Channel::Hidden => "HIDDEN",
        }
    }
}

/// One lexical unit of a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text; empty only for `Eof`
    pub text: String,
    pub channel: Channel,
    pub span: Span,
    /// Position of the token in the emitted sequence
    pub token_index: usize,
    /// Mode the token was scanned in
    pub mode: Mode,
    /// Grammar rule that produced the token (`UNRECOGNIZED` or `EOF` for synthetic ones)
    pub rule: &'static str,
    /// In-band lexical error raised while producing this token
    pub diagnostic: Option<LexicalError>,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_hidden(&self) -> bool {
        self.channel == Channel::Hidden
    }

    /// On the default channel, so a parser would consume it
    pub fn is_significant(&self) -> bool {
        self.channel == Channel::Default
    }

    pub fn has_diagnostic(&self) -> bool {
        self.diagnostic.is_some()
    }

    pub fn category(&self) -> TokenCategory {
        self.kind.category()
    }

    /// Byte offset of the first character
    pub fn start_offset(&self) -> usize {
        self.span.start.offset
    }

    /// Byte offset one past the last character
    pub fn end_offset(&self) -> usize {
        self.span.end.offset
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn column(&self) -> u32 {
        self.span.start.column
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.is_eof() {
            "<EOF>".to_string()
        } else {
            self.text
                .replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t")
        };

        write!(
            f,
            "[@{},{}:{}='{}',<{}>",
            self.token_index,
            self.start_offset(),
            self.end_offset(),
            text,
            self.kind
        )?;
        if self.is_hidden() {
            write!(f, ",channel={}", self.channel.id())?;
        }
        write!(f, ",{}:{}]", self.line(), self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn token(kind: TokenKind, text: &str, channel: Channel) -> Token {
        let start = Position::new(5, 1, 6);
        Token {
            kind,
            text: text.to_string(),
            channel,
            span: Span::new(start, start.advance_str(text)),
            token_index: 2,
            mode: Mode::Expression,
            rule: kind.symbolic_name(),
            diagnostic: None,
        }
    }

    #[test]
    fn test_display_matches_vocabulary_style() {
        let tok = token(TokenKind::Gte, ">=", Channel::Default);
        assert_eq!(tok.to_string(), "[@2,5:7='>=',<GTE>,1:6]");

        let ws = token(TokenKind::ExprWs, " \n", Channel::Hidden);
        assert_eq!(ws.to_string(), "[@2,5:7=' \\n',<EXPR_WS>,channel=1,1:6]");
    }

    #[test]
    fn test_channel_queries() {
        let ws = token(TokenKind::ExprWs, " ", Channel::Hidden);
        assert!(ws.is_hidden());
        assert!(!ws.is_significant());
        assert_eq!(Channel::Hidden.name(), "HIDDEN");
        assert_eq!(Channel::default(), Channel::Default);
    }
}
