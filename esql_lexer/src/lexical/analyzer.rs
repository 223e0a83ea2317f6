//! Lexical analyzer: limits, metrics and logging around the scanner

use super::error::{LexerError, LexicalError};
use super::gate::VersionGate;
use super::scanner::Scanner;
use crate::config::compile_time::lexical::{MAX_SOURCE_SIZE, MAX_TOKEN_COUNT};
use crate::config::runtime::LexicalPreferences;
use crate::grammar::Mode;
use crate::logging::codes;
use crate::tokens::{Token, TokenCategory, TokenKind, TokenStream};
use crate::utils::SourceMap;
use crate::{log_debug, log_error, log_success};
use std::collections::HashMap;
use std::time::Instant;

/// Counters gathered during one analyzer run
#[derive(Debug, Clone, Default)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub default_channel_tokens: usize,
    pub hidden_channel_tokens: usize,

    pub command_tokens: usize,
    pub dev_command_tokens: usize,
    pub keyword_tokens: usize,
    pub operator_tokens: usize,
    pub punctuation_tokens: usize,
    pub literal_tokens: usize,
    pub identifier_tokens: usize,
    pub source_tokens: usize,
    pub parameter_tokens: usize,
    pub comment_tokens: usize,
    pub whitespace_tokens: usize,
    pub unrecognized_tokens: usize,

    pub diagnostics: usize,
    /// Deepest mode stack reached during the pass
    pub max_mode_depth: usize,
    /// Modes that were still open when input ended, innermost first
    pub unclosed_modes_at_eof: Vec<Mode>,
    /// Populated only when kind tracking is enabled
    pub kind_usage: HashMap<TokenKind, usize>,
}

impl LexicalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;
        if token.is_hidden() {
            self.hidden_channel_tokens += 1;
        } else {
            self.default_channel_tokens += 1;
        }
        if token.has_diagnostic() {
            self.diagnostics += 1;
        }

        if preferences.collect_detailed_metrics {
            self.record_category(token);
        }
        if preferences.track_kind_usage {
            *self.kind_usage.entry(token.kind).or_insert(0) += 1;
        }
    }

    fn record_category(&mut self, token: &Token) {
        let counter = match token.category() {
            TokenCategory::Command => &mut self.command_tokens,
            TokenCategory::DevCommand => &mut self.dev_command_tokens,
            TokenCategory::Keyword => &mut self.keyword_tokens,
            TokenCategory::Operator => &mut self.operator_tokens,
            TokenCategory::Punctuation => &mut self.punctuation_tokens,
            TokenCategory::Literal => &mut self.literal_tokens,
            TokenCategory::Identifier => &mut self.identifier_tokens,
            TokenCategory::Source => &mut self.source_tokens,
            TokenCategory::Parameter => &mut self.parameter_tokens,
            TokenCategory::Comment => &mut self.comment_tokens,
            TokenCategory::Whitespace => &mut self.whitespace_tokens,
            TokenCategory::Special if token.kind == TokenKind::Unrecognized => {
                &mut self.unrecognized_tokens
            }
            TokenCategory::Special => return,
        };
        *counter += 1;
    }

    /// Tokens a parser would consume, excluding `Eof`
    pub fn significant_tokens(&self) -> usize {
        self.default_channel_tokens.saturating_sub(1)
    }

    pub fn has_diagnostics(&self) -> bool {
        self.diagnostics > 0
    }

    /// Most frequent kinds first; empty unless kind tracking was on
    pub fn most_used_kinds(&self, limit: usize) -> Vec<(TokenKind, usize)> {
        let mut usage: Vec<_> = self.kind_usage.iter().map(|(k, n)| (*k, *n)).collect();
        usage.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.id().cmp(&b.0.id())));
        usage.truncate(limit);
        usage
    }
}

/// Runs the scanner over a whole query under the configured limits
#[derive(Debug)]
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
    max_source_size: usize,
    max_token_count: usize,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::new(),
            preferences,
            max_source_size: MAX_SOURCE_SIZE,
            max_token_count: MAX_TOKEN_COUNT,
        }
    }

    /// Tighten the source size limit; the build-time ceiling still applies
    pub fn with_source_limit(mut self, bytes: usize) -> Self {
        self.max_source_size = bytes.min(MAX_SOURCE_SIZE);
        self
    }

    /// Tighten the token limit; the build-time ceiling still applies
    pub fn with_token_limit(mut self, tokens: usize) -> Self {
        self.max_token_count = tokens.min(MAX_TOKEN_COUNT);
        self
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn preferences(&self) -> &LexicalPreferences {
        &self.preferences
    }

    pub fn set_preferences(&mut self, preferences: LexicalPreferences) {
        self.preferences = preferences;
    }

    pub fn gate(&self) -> VersionGate {
        VersionGate::from_preferences(&self.preferences)
    }

    /// Tokenize a complete query into a stream ending with `Eof`
    ///
    /// Lexical problems stay in-band on their tokens unless strict mode is on,
    /// in which case the first one aborts the run.
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        let start = Instant::now();
        self.metrics = LexicalMetrics::new();

        if source.len() > self.max_source_size {
            let error = LexerError::SourceTooLarge {
                size: source.len(),
                limit: self.max_source_size,
            };
            log_error!(error.error_code(), &error.to_string(),
                "size" => source.len(),
                "limit" => self.max_source_size
            );
            return Err(error);
        }

        let gate = self.gate();
        log_debug!("Starting lexical analysis",
            "bytes" => source.len(),
            "dev_version" => gate.is_dev_version(),
            "strict" => self.preferences.strict
        );

        let mut scanner = Scanner::new(source, gate);
        let mut tokens = Vec::new();

        loop {
            let token = scanner.next_token();

            if tokens.len() >= self.max_token_count {
                let error = LexerError::TooManyTokens {
                    count: tokens.len() + 1,
                    limit: self.max_token_count,
                };
                log_error!(error.error_code(), &error.to_string(),
                    "limit" => self.max_token_count,
                    "offset" => token.start_offset()
                );
                return Err(error);
            }

            self.metrics.record_token(&token, &self.preferences);

            if let Some(diagnostic) = &token.diagnostic {
                self.report_diagnostic(diagnostic, &token);
                if self.preferences.strict {
                    return Err(LexerError::Strict {
                        diagnostic: diagnostic.clone(),
                        line: token.line(),
                        column: token.column(),
                    });
                }
            }

            let at_end = token.is_eof();
            tokens.push(token);
            if at_end {
                break;
            }
        }

        self.metrics.max_mode_depth = scanner.mode_stack().peak_depth();
        self.metrics.unclosed_modes_at_eof = scanner.unclosed_modes().to_vec();

        let stream = TokenStream::with_source_map(tokens, SourceMap::new(source.to_string()));

        log_success!(
            codes::success::TOKENIZATION_COMPLETE,
            "Lexical analysis completed",
            "tokens" => self.metrics.total_tokens,
            "significant" => self.metrics.significant_tokens(),
            "hidden" => self.metrics.hidden_channel_tokens,
            "diagnostics" => self.metrics.diagnostics,
            "max_mode_depth" => self.metrics.max_mode_depth,
            "unclosed_modes" => self.metrics.unclosed_modes_at_eof.len(),
            "elapsed_us" => start.elapsed().as_micros()
        );

        Ok(stream)
    }

    fn report_diagnostic(&self, diagnostic: &LexicalError, token: &Token) {
        if !self.preferences.log_diagnostics {
            return;
        }

        let message = if self.preferences.include_position_in_errors {
            format!(
                "{} at line {}, column {}",
                diagnostic,
                token.line(),
                token.column()
            )
        } else {
            diagnostic.to_string()
        };

        log_error!(diagnostic.error_code(), &message,
            span = token.span,
            "rule" => token.rule,
            "mode" => token.mode
        );
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::error::LiteralKind;
    use crate::logging::{test_memory_logger, with_query_context};
    use assert_matches::assert_matches;

    fn preferences(dev_version: bool, strict: bool) -> LexicalPreferences {
        LexicalPreferences {
            dev_version,
            strict,
            collect_detailed_metrics: true,
            track_kind_usage: true,
            include_position_in_errors: true,
            log_diagnostics: true,
        }
    }

    #[test]
    fn test_tokenize_produces_lossless_stream() {
        let source = "FROM logs-* | WHERE x > 1 // tail";
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false, false));
        let stream = analyzer.tokenize(source).unwrap();

        assert!(stream.has_eof());
        assert_eq!(stream.reconstruct_source(), source);
        assert!(!stream.has_diagnostics());
        assert_eq!(stream.current_kind(), Some(TokenKind::From));
    }

    #[test]
    fn test_metrics() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false, false));
        analyzer.tokenize("ROW a = 1, b = \"x\" | KEEP a").unwrap();
        let metrics = analyzer.metrics();

        assert_eq!(metrics.command_tokens, 2);
        assert_eq!(metrics.literal_tokens, 2);
        assert_eq!(metrics.identifier_tokens, 3);
        assert_eq!(metrics.operator_tokens, 2);
        assert_eq!(metrics.punctuation_tokens, 2);
        assert_eq!(
            metrics.total_tokens,
            metrics.default_channel_tokens + metrics.hidden_channel_tokens
        );
        assert_eq!(metrics.significant_tokens(), 11);
        assert_eq!(metrics.kind_usage.get(&TokenKind::Assign), Some(&2));
        assert_eq!(metrics.most_used_kinds(1)[0], (TokenKind::ExprWs, 7));
        assert_eq!(metrics.unrecognized_tokens, 0);
        assert!(!metrics.has_diagnostics());
    }

    #[test]
    fn test_metrics_track_modes() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false, false));
        analyzer.tokenize("ROW [1, (2").unwrap();
        let metrics = analyzer.metrics();

        // `[` enters two expression levels, `(` none
        assert_eq!(metrics.max_mode_depth, 4);
        assert_eq!(metrics.unclosed_modes_at_eof, vec![Mode::Expression; 3]);
    }

    #[test]
    fn test_kind_usage_off_by_default_switch() {
        let mut prefs = preferences(false, false);
        prefs.track_kind_usage = false;
        prefs.collect_detailed_metrics = false;
        let mut analyzer = LexicalAnalyzer::with_preferences(prefs);
        analyzer.tokenize("ROW 1").unwrap();

        assert!(analyzer.metrics().kind_usage.is_empty());
        assert_eq!(analyzer.metrics().command_tokens, 0);
        assert_eq!(analyzer.metrics().total_tokens, 4);
    }

    #[test]
    fn test_diagnostics_stay_in_band() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false, false));
        let stream = analyzer.tokenize("ROW a = \"open").unwrap();

        let diagnostics = stream.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_matches!(
            diagnostics[0].value,
            LexicalError::UnterminatedLiteral {
                literal: LiteralKind::String
            }
        );
        assert_eq!(analyzer.metrics().diagnostics, 1);
    }

    #[test]
    fn test_strict_mode_aborts_on_first_diagnostic() {
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false, true));
        let result = analyzer.tokenize("ROW a\n| EVAL b = $");

        assert_matches!(
            result,
            Err(LexerError::Strict {
                diagnostic: LexicalError::UnrecognizedCharacter { character: '$' },
                line: 2,
                column: 12,
            })
        );
    }

    #[test]
    fn test_source_limit() {
        let mut analyzer = LexicalAnalyzer::new().with_source_limit(4);
        assert_matches!(
            analyzer.tokenize("ROW 1"),
            Err(LexerError::SourceTooLarge { size: 5, limit: 4 })
        );
        assert!(analyzer.tokenize("ROW").is_ok());
    }

    #[test]
    fn test_token_limit() {
        let mut analyzer = LexicalAnalyzer::new().with_token_limit(3);
        assert_matches!(
            analyzer.tokenize("ROW 1, 2"),
            Err(LexerError::TooManyTokens { count: 4, limit: 3 })
        );

        // ROW, WS, 1, EOF
        let mut analyzer = LexicalAnalyzer::new().with_token_limit(4);
        assert_eq!(analyzer.tokenize("ROW 1").unwrap().all_tokens().len(), 4);
    }

    #[test]
    fn test_gate_follows_preferences() {
        let source = "METRICS m";

        let mut release = LexicalAnalyzer::with_preferences(preferences(false, false));
        let stream = release.tokenize(source).unwrap();
        assert_eq!(stream.current_kind(), Some(TokenKind::UnknownCmd));

        let mut dev = LexicalAnalyzer::with_preferences(preferences(true, false));
        let stream = dev.tokenize(source).unwrap();
        assert_eq!(stream.current_kind(), Some(TokenKind::DevMetrics));
        assert!(dev.gate().is_dev_version());
    }

    #[test]
    fn test_diagnostics_and_completion_are_logged() {
        let memory = test_memory_logger();
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences(false, false));

        with_query_context(737_001, "analyzer-logging", || {
            analyzer.tokenize("ROW `x").unwrap();
        });

        let events = memory.get_events_with_context("query", "analyzer-logging");
        let error = events
            .iter()
            .find(|e| e.is_error())
            .expect("diagnostic logged");
        assert_eq!(error.code, codes::lexical::UNTERMINATED_LITERAL);
        assert_eq!(
            error.message,
            "Unterminated quoted identifier at line 1, column 5"
        );
        assert_eq!(
            error.context.get("rule").map(String::as_str),
            Some("QUOTED_IDENTIFIER")
        );
        assert!(events
            .iter()
            .any(|e| e.code == codes::success::TOKENIZATION_COMPLETE));
    }

    #[test]
    fn test_diagnostic_logging_can_be_disabled() {
        let memory = test_memory_logger();
        let mut prefs = preferences(false, false);
        prefs.log_diagnostics = false;
        let mut analyzer = LexicalAnalyzer::with_preferences(prefs);

        with_query_context(737_002, "analyzer-quiet", || {
            analyzer.tokenize("ROW $").unwrap();
        });

        let events = memory.get_events_with_context("query", "analyzer-quiet");
        assert!(events.iter().all(|e| !e.is_error()));
        assert_eq!(analyzer.metrics().unrecognized_tokens, 1);
    }
}
