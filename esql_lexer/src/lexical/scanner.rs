//! Mode-stack scanner
//!
//! A pure function of (source, version gate): no logging, no I/O, no shared
//! mutable state. Each call to [`Scanner::next_token`] selects the longest
//! match among the eligible rules of the current mode, emits it, then runs
//! the rule's mode actions.

use super::error::LexicalError;
use super::gate::VersionGate;
use super::matchers::{Scan, ScanIssue};
use super::mode_stack::ModeStack;
use crate::grammar::{Mode, ModeAction, Rule};
use crate::tokens::{Channel, Token, TokenKind};
use crate::utils::{Position, Span};
use std::iter::FusedIterator;

pub const UNRECOGNIZED_RULE: &str = "UNRECOGNIZED";
pub const EOF_RULE: &str = "EOF";

#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    /// Byte offset of the next unconsumed character
    cursor: usize,
    position: Position,
    modes: ModeStack,
    gate: VersionGate,
    token_index: usize,
    finished: bool,
    /// Modes still open when input ran out, innermost first
    unclosed_modes: Vec<Mode>,
    /// The next character closes an empty backquote pair and may not open
    /// an unterminated identifier
    closes_empty_pair: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, gate: VersionGate) -> Self {
        Self::with_mode_stack(source, gate, ModeStack::new())
    }

    pub fn with_max_mode_depth(source: &'a str, gate: VersionGate, max_depth: usize) -> Self {
        Self::with_mode_stack(source, gate, ModeStack::with_max_depth(max_depth))
    }

    fn with_mode_stack(source: &'a str, gate: VersionGate, modes: ModeStack) -> Self {
        Self {
            source,
            cursor: 0,
            position: Position::start(),
            modes,
            gate,
            token_index: 0,
            finished: false,
            unclosed_modes: Vec::new(),
            closes_empty_pair: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn gate(&self) -> VersionGate {
        self.gate
    }

    pub fn mode(&self) -> Mode {
        self.modes.current()
    }

    pub fn mode_stack(&self) -> &ModeStack {
        &self.modes
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Whether the end-of-input token has been produced
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn unclosed_modes(&self) -> &[Mode] {
        &self.unclosed_modes
    }

    /// Produce the next token; after the end of input every call returns `Eof`
    pub fn next_token(&mut self) -> Token {
        let rest = &self.source[self.cursor..];
        if rest.is_empty() {
            return self.end_of_input();
        }

        let mode = self.modes.current();
        let allow_unterminated = !std::mem::take(&mut self.closes_empty_pair);
        match self.select_rule(mode, rest, allow_unterminated) {
            Some((rule, scan)) => {
                let text = &rest[..scan.len];
                let issue = scan.issue.map(|issue| issue_to_error(issue, text));
                let transition = self.apply_actions(rule.actions);
                self.emit(
                    rule.kind,
                    text,
                    rule.channel,
                    mode,
                    rule.name,
                    issue.or(transition),
                )
            }
            None => {
                let character = rest.chars().next().unwrap_or('\u{FFFD}');
                let text = &rest[..character.len_utf8()];
                self.closes_empty_pair = rest.starts_with("``");
                self.emit(
                    TokenKind::Unrecognized,
                    text,
                    Channel::Default,
                    mode,
                    UNRECOGNIZED_RULE,
                    Some(LexicalError::UnrecognizedCharacter { character }),
                )
            }
        }
    }

    /// Lazy, single-pass iterator ending with (and including) `Eof`
    pub fn tokens(self) -> Tokens<'a> {
        Tokens {
            scanner: self,
            done: false,
        }
    }

    /// Longest eligible match; strict comparison keeps the earliest rule on ties
    fn select_rule(
        &self,
        mode: Mode,
        rest: &str,
        allow_unterminated: bool,
    ) -> Option<(&'static Rule, Scan)> {
        let mut best: Option<(&'static Rule, Scan)> = None;

        for rule in mode.rules() {
            if !self.gate.allows(rule.dev_only) {
                continue;
            }
            let Some(scan) = rule.matches(rest) else {
                continue;
            };
            if !allow_unterminated && scan.is_unterminated() {
                continue;
            }
            if best.map_or(true, |(_, current)| scan.is_better_than(&current)) {
                best = Some((rule, scan));
            }
        }

        best
    }

    /// Run mode actions in order; the first failure is reported
    ///
    /// An unbalanced pop resets the stack and abandons the remaining actions.
    /// Consecutive pushes land together or not at all.
    fn apply_actions(&mut self, actions: &[ModeAction]) -> Option<LexicalError> {
        let mut failure = None;
        let mut pending: Vec<Mode> = Vec::new();

        for action in actions {
            match action {
                ModeAction::Push(mode) => pending.push(*mode),
                ModeAction::Pop => {
                    if let Err(err) = self.modes.push_all(&pending) {
                        failure.get_or_insert(err);
                    }
                    pending.clear();

                    if let Err(err) = self.modes.pop() {
                        self.modes.reset();
                        failure.get_or_insert(err);
                        return failure;
                    }
                }
            }
        }

        if let Err(err) = self.modes.push_all(&pending) {
            failure.get_or_insert(err);
        }
        failure
    }

    fn end_of_input(&mut self) -> Token {
        if !self.finished {
            self.unclosed_modes = self.modes.unwind();
            self.finished = true;
        }

        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            channel: Channel::Default,
            span: Span::empty_at(self.position),
            token_index: self.token_index,
            mode: self.modes.current(),
            rule: EOF_RULE,
            diagnostic: None,
        }
    }

    fn emit(
        &mut self,
        kind: TokenKind,
        text: &str,
        channel: Channel,
        mode: Mode,
        rule: &'static str,
        diagnostic: Option<LexicalError>,
    ) -> Token {
        let start = self.position;
        let end = start.advance_str(text);
        self.position = end;
        self.cursor += text.len();

        let token = Token {
            kind,
            text: text.to_string(),
            channel,
            span: Span::new(start, end),
            token_index: self.token_index,
            mode,
            rule,
            diagnostic,
        };
        self.token_index += 1;
        token
    }
}

fn issue_to_error(issue: ScanIssue, text: &str) -> LexicalError {
    match issue {
        ScanIssue::Unterminated(literal) => LexicalError::UnterminatedLiteral { literal },
        ScanIssue::InvalidEscape { offset, len } => LexicalError::InvalidEscapeSequence {
            sequence: text
                .get(offset..offset + len)
                .unwrap_or_default()
                .to_string(),
        },
    }
}

/// Iterator over a scanner's tokens
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    scanner: Scanner<'a>,
    done: bool,
}

impl<'a> Tokens<'a> {
    /// The underlying scanner (mode stack, unclosed modes, position)
    pub fn scanner(&self) -> &Scanner<'a> {
        &self.scanner
    }
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.scanner.next_token();
        self.done = token.is_eof();
        Some(token)
    }
}

impl FusedIterator for Tokens<'_> {}

impl<'a> IntoIterator for Scanner<'a> {
    type Item = Token;
    type IntoIter = Tokens<'a>;

    fn into_iter(self) -> Tokens<'a> {
        self.tokens()
    }
}

/// Tokenize a whole query, `Eof` included
pub fn tokenize_all(source: &str, gate: VersionGate) -> Vec<Token> {
    Scanner::new(source, gate).tokens().collect()
}
