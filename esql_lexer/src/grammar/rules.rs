//! Ordered rule tables, one per lexer mode
//!
//! Declaration order is priority order: the scanner takes the longest match
//! and breaks ties in favor of the rule listed first. Rule names follow the
//! ES|QL grammar verbatim, including `JOIN_UNQUOTED_IDENTIFER` and
//! `SETTTING_MULTILINE_COMMENT`.

use super::modes::Mode;
use crate::lexical::matchers::{self, Scan};
use crate::tokens::{Channel, TokenKind};
use std::fmt;

/// How a rule recognizes text at the current position
#[derive(Clone, Copy)]
pub enum Matcher {
    /// Fixed text, compared ASCII case-insensitively
    Literal(&'static str),
    /// Character-class scanner from [`matchers`]
    Scan(fn(&str) -> Option<Scan>),
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Literal(text) => write!(f, "Literal({:?})", text),
            Matcher::Scan(_) => f.write_str("Scan(..)"),
        }
    }
}

/// Mode-stack command run after a rule's token is emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    Push(Mode),
    Pop,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    /// Kind of the emitted token (may differ from the rule name)
    pub kind: TokenKind,
    pub matcher: Matcher,
    pub channel: Channel,
    /// Eligible only when the version gate reports a dev build
    pub dev_only: bool,
    pub actions: &'static [ModeAction],
}

impl Rule {
    pub const fn literal(name: &'static str, kind: TokenKind, text: &'static str) -> Rule {
        Rule {
            name,
            kind,
            matcher: Matcher::Literal(text),
            channel: Channel::Default,
            dev_only: false,
            actions: &[],
        }
    }

    pub const fn scan(
        name: &'static str,
        kind: TokenKind,
        scanner: fn(&str) -> Option<Scan>,
    ) -> Rule {
        Rule {
            name,
            kind,
            matcher: Matcher::Scan(scanner),
            channel: Channel::Default,
            dev_only: false,
            actions: &[],
        }
    }

    pub const fn hidden(self) -> Rule {
        Rule {
            channel: Channel::Hidden,
            ..self
        }
    }

    pub const fn dev_only(self) -> Rule {
        Rule {
            dev_only: true,
            ..self
        }
    }

    pub const fn then(self, actions: &'static [ModeAction]) -> Rule {
        Rule { actions, ..self }
    }

    /// Match this rule against the unconsumed input
    pub fn matches(&self, input: &str) -> Option<Scan> {
        match self.matcher {
            Matcher::Literal(text) => {
                matchers::literal(input, text).map(|len| Scan { len, issue: None })
            }
            Matcher::Scan(scanner) => scanner(input).filter(|scan| scan.len > 0),
        }
    }
}

impl Mode {
    /// Rules active in this mode, in priority order
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Mode::Default => DEFAULT_RULES,
            Mode::Expression => EXPRESSION_RULES,
            Mode::Explain => EXPLAIN_RULES,
            Mode::From => FROM_RULES,
            Mode::Project => PROJECT_RULES,
            Mode::Rename => RENAME_RULES,
            Mode::Enrich => ENRICH_RULES,
            Mode::EnrichField => ENRICH_FIELD_RULES,
            Mode::Mvexpand => MVEXPAND_RULES,
            Mode::Show => SHOW_RULES,
            Mode::Setting => SETTING_RULES,
            Mode::Lookup => LOOKUP_RULES,
            Mode::LookupField => LOOKUP_FIELD_RULES,
            Mode::Join => JOIN_RULES,
            Mode::Metrics => METRICS_RULES,
            Mode::ClosingMetrics => CLOSING_METRICS_RULES,
        }
    }

    pub fn rule_names(self) -> impl Iterator<Item = &'static str> {
        self.rules().iter().map(|rule| rule.name)
    }
}

/// Every rule of every mode, in mode then priority order
pub fn all_rules() -> impl Iterator<Item = (Mode, &'static Rule)> {
    Mode::ALL
        .into_iter()
        .flat_map(|mode| mode.rules().iter().map(move |rule| (mode, rule)))
}

// ============================================================================
// Mode actions
// ============================================================================

use ModeAction::{Pop, Push};

const POP: &[ModeAction] = &[Pop];
const POP_TWICE: &[ModeAction] = &[Pop, Pop];
const PUSH_EXPRESSION: &[ModeAction] = &[Push(Mode::Expression)];
const PUSH_EXPRESSION_TWICE: &[ModeAction] = &[Push(Mode::Expression), Push(Mode::Expression)];
const SWITCH_TO_EXPRESSION: &[ModeAction] = &[Pop, Push(Mode::Expression)];
const SWITCH_TO_METRICS: &[ModeAction] = &[Pop, Push(Mode::Metrics)];
const SWITCH_TO_CLOSING_METRICS: &[ModeAction] = &[Pop, Push(Mode::ClosingMetrics)];

// ============================================================================
// Rule tables
// ============================================================================

use TokenKind as K;

static DEFAULT_RULES: &[Rule] = &[
    Rule::literal("DISSECT", K::Dissect, "dissect").then(PUSH_EXPRESSION),
    Rule::literal("DROP", K::Drop, "drop").then(&[Push(Mode::Project)]),
    Rule::literal("ENRICH", K::Enrich, "enrich").then(&[Push(Mode::Enrich)]),
    Rule::literal("EVAL", K::Eval, "eval").then(PUSH_EXPRESSION),
    Rule::literal("EXPLAIN", K::Explain, "explain").then(&[Push(Mode::Explain)]),
    Rule::literal("FROM", K::From, "from").then(&[Push(Mode::From)]),
    Rule::literal("GROK", K::Grok, "grok").then(PUSH_EXPRESSION),
    Rule::literal("KEEP", K::Keep, "keep").then(&[Push(Mode::Project)]),
    Rule::literal("LIMIT", K::Limit, "limit").then(PUSH_EXPRESSION),
    Rule::literal("MV_EXPAND", K::MvExpand, "mv_expand").then(&[Push(Mode::Mvexpand)]),
    Rule::literal("RENAME", K::Rename, "rename").then(&[Push(Mode::Rename)]),
    Rule::literal("ROW", K::Row, "row").then(PUSH_EXPRESSION),
    Rule::literal("SHOW", K::Show, "show").then(&[Push(Mode::Show)]),
    Rule::literal("SORT", K::Sort, "sort").then(PUSH_EXPRESSION),
    Rule::literal("STATS", K::Stats, "stats").then(PUSH_EXPRESSION),
    Rule::literal("WHERE", K::Where, "where").then(PUSH_EXPRESSION),
    Rule::literal("DEV_INLINESTATS", K::DevInlinestats, "inlinestats")
        .dev_only()
        .then(PUSH_EXPRESSION),
    Rule::literal("DEV_LOOKUP", K::DevLookup, "lookup_🐔")
        .dev_only()
        .then(&[Push(Mode::Lookup)]),
    Rule::literal("DEV_METRICS", K::DevMetrics, "metrics")
        .dev_only()
        .then(&[Push(Mode::Metrics)]),
    Rule::literal("DEV_JOIN", K::DevJoin, "join")
        .dev_only()
        .then(&[Push(Mode::Join)]),
    Rule::literal("DEV_JOIN_FULL", K::DevJoinFull, "full")
        .dev_only()
        .then(&[Push(Mode::Join)]),
    Rule::literal("DEV_JOIN_LEFT", K::DevJoinLeft, "left")
        .dev_only()
        .then(&[Push(Mode::Join)]),
    Rule::literal("DEV_JOIN_RIGHT", K::DevJoinRight, "right")
        .dev_only()
        .then(&[Push(Mode::Join)]),
    Rule::literal("DEV_JOIN_LOOKUP", K::DevJoinLookup, "lookup")
        .dev_only()
        .then(&[Push(Mode::Join)]),
    Rule::scan("UNKNOWN_CMD", K::UnknownCmd, matchers::unknown_command).then(PUSH_EXPRESSION),
    Rule::scan("LINE_COMMENT", K::LineComment, matchers::line_comment).hidden(),
    Rule::scan("MULTILINE_COMMENT", K::MultilineComment, matchers::multiline_comment).hidden(),
    Rule::scan("WS", K::Ws, matchers::whitespace).hidden(),
];

static EXPRESSION_RULES: &[Rule] = &[
    Rule::literal("PIPE", K::Pipe, "|").then(POP),
    Rule::scan("QUOTED_STRING", K::QuotedString, matchers::quoted_string),
    Rule::scan("INTEGER_LITERAL", K::IntegerLiteral, matchers::integer_literal),
    Rule::scan("DECIMAL_LITERAL", K::DecimalLiteral, matchers::decimal_literal),
    Rule::literal("BY", K::By, "by"),
    Rule::literal("AND", K::And, "and"),
    Rule::literal("ASC", K::Asc, "asc"),
    Rule::literal("ASSIGN", K::Assign, "="),
    Rule::literal("CAST_OP", K::CastOp, "::"),
    Rule::literal("COLON", K::Colon, ":"),
    Rule::literal("COMMA", K::Comma, ","),
    Rule::literal("DESC", K::Desc, "desc"),
    Rule::literal("DOT", K::Dot, "."),
    Rule::literal("FALSE", K::False, "false"),
    Rule::literal("FIRST", K::First, "first"),
    Rule::literal("IN", K::In, "in"),
    Rule::literal("IS", K::Is, "is"),
    Rule::literal("LAST", K::Last, "last"),
    Rule::literal("LIKE", K::Like, "like"),
    Rule::literal("LP", K::Lp, "("),
    Rule::literal("NOT", K::Not, "not"),
    Rule::literal("NULL", K::Null, "null"),
    Rule::literal("NULLS", K::Nulls, "nulls"),
    Rule::literal("OR", K::Or, "or"),
    Rule::literal("PARAM", K::Param, "?"),
    Rule::literal("RLIKE", K::Rlike, "rlike"),
    Rule::literal("RP", K::Rp, ")"),
    Rule::literal("TRUE", K::True, "true"),
    Rule::literal("EQ", K::Eq, "=="),
    Rule::literal("CIEQ", K::Cieq, "=~"),
    Rule::literal("NEQ", K::Neq, "!="),
    Rule::literal("LT", K::Lt, "<"),
    Rule::literal("LTE", K::Lte, "<="),
    Rule::literal("GT", K::Gt, ">"),
    Rule::literal("GTE", K::Gte, ">="),
    Rule::literal("PLUS", K::Plus, "+"),
    Rule::literal("MINUS", K::Minus, "-"),
    Rule::literal("ASTERISK", K::Asterisk, "*"),
    Rule::literal("SLASH", K::Slash, "/"),
    Rule::literal("PERCENT", K::Percent, "%"),
    Rule::literal("NESTED_WHERE", K::Where, "where"),
    Rule::scan(
        "NAMED_OR_POSITIONAL_PARAM",
        K::NamedOrPositionalParam,
        matchers::named_or_positional_param,
    ),
    Rule::literal("OPENING_BRACKET", K::OpeningBracket, "[").then(PUSH_EXPRESSION_TWICE),
    Rule::literal("CLOSING_BRACKET", K::ClosingBracket, "]").then(POP_TWICE),
    Rule::scan("UNQUOTED_IDENTIFIER", K::UnquotedIdentifier, matchers::unquoted_identifier),
    Rule::scan("QUOTED_IDENTIFIER", K::QuotedIdentifier, matchers::quoted_identifier),
    Rule::scan("EXPR_LINE_COMMENT", K::ExprLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "EXPR_MULTILINE_COMMENT",
        K::ExprMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("EXPR_WS", K::ExprWs, matchers::whitespace).hidden(),
];

static EXPLAIN_RULES: &[Rule] = &[
    Rule::literal("EXPLAIN_OPENING_BRACKET", K::OpeningBracket, "[")
        .then(&[Push(Mode::Default)]),
    Rule::literal("EXPLAIN_PIPE", K::Pipe, "|").then(POP),
    Rule::scan("EXPLAIN_WS", K::ExplainWs, matchers::whitespace).hidden(),
    Rule::scan("EXPLAIN_LINE_COMMENT", K::ExplainLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "EXPLAIN_MULTILINE_COMMENT",
        K::ExplainMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
];

static FROM_RULES: &[Rule] = &[
    Rule::literal("FROM_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("FROM_OPENING_BRACKET", K::OpeningBracket, "["),
    Rule::literal("FROM_CLOSING_BRACKET", K::ClosingBracket, "]"),
    Rule::literal("FROM_COLON", K::Colon, ":"),
    Rule::literal("FROM_COMMA", K::Comma, ","),
    Rule::literal("FROM_ASSIGN", K::Assign, "="),
    Rule::literal("METADATA", K::Metadata, "metadata"),
    Rule::scan("UNQUOTED_SOURCE", K::UnquotedSource, matchers::unquoted_source),
    // Same language as UNQUOTED_SOURCE above, so it never wins a match
    Rule::scan("FROM_UNQUOTED_SOURCE", K::UnquotedSource, matchers::unquoted_source),
    Rule::scan("FROM_QUOTED_SOURCE", K::QuotedString, matchers::quoted_string),
    Rule::scan("FROM_LINE_COMMENT", K::FromLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "FROM_MULTILINE_COMMENT",
        K::FromMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("FROM_WS", K::FromWs, matchers::whitespace).hidden(),
];

static PROJECT_RULES: &[Rule] = &[
    Rule::literal("PROJECT_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("PROJECT_DOT", K::Dot, "."),
    Rule::literal("PROJECT_COMMA", K::Comma, ","),
    Rule::literal("PROJECT_PARAM", K::Param, "?").dev_only(),
    Rule::scan(
        "PROJECT_NAMED_OR_POSITIONAL_PARAM",
        K::NamedOrPositionalParam,
        matchers::named_or_positional_param,
    )
    .dev_only(),
    Rule::scan("ID_PATTERN", K::IdPattern, matchers::id_pattern),
    Rule::scan("PROJECT_LINE_COMMENT", K::ProjectLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "PROJECT_MULTILINE_COMMENT",
        K::ProjectMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("PROJECT_WS", K::ProjectWs, matchers::whitespace).hidden(),
];

static RENAME_RULES: &[Rule] = &[
    Rule::literal("RENAME_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("RENAME_ASSIGN", K::Assign, "="),
    Rule::literal("RENAME_COMMA", K::Comma, ","),
    Rule::literal("RENAME_DOT", K::Dot, "."),
    Rule::literal("RENAME_PARAM", K::Param, "?").dev_only(),
    Rule::scan(
        "RENAME_NAMED_OR_POSITIONAL_PARAM",
        K::NamedOrPositionalParam,
        matchers::named_or_positional_param,
    )
    .dev_only(),
    Rule::literal("AS", K::As, "as"),
    Rule::scan("RENAME_ID_PATTERN", K::IdPattern, matchers::id_pattern),
    Rule::scan("RENAME_LINE_COMMENT", K::RenameLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "RENAME_MULTILINE_COMMENT",
        K::RenameMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("RENAME_WS", K::RenameWs, matchers::whitespace).hidden(),
];

static ENRICH_RULES: &[Rule] = &[
    Rule::literal("ENRICH_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("ENRICH_OPENING_BRACKET", K::OpeningBracket, "[")
        .then(&[Push(Mode::Setting)]),
    Rule::literal("ON", K::On, "on").then(&[Push(Mode::EnrichField)]),
    Rule::literal("WITH", K::With, "with").then(&[Push(Mode::EnrichField)]),
    Rule::scan("ENRICH_POLICY_NAME", K::EnrichPolicyName, matchers::enrich_policy_name),
    // Shadowed by ENRICH_POLICY_NAME
    Rule::scan(
        "ENRICH_MODE_UNQUOTED_VALUE",
        K::EnrichPolicyName,
        matchers::enrich_policy_name,
    ),
    Rule::scan("ENRICH_LINE_COMMENT", K::EnrichLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "ENRICH_MULTILINE_COMMENT",
        K::EnrichMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("ENRICH_WS", K::EnrichWs, matchers::whitespace).hidden(),
];

static ENRICH_FIELD_RULES: &[Rule] = &[
    Rule::literal("ENRICH_FIELD_PIPE", K::Pipe, "|").then(POP_TWICE),
    Rule::literal("ENRICH_FIELD_ASSIGN", K::Assign, "="),
    Rule::literal("ENRICH_FIELD_COMMA", K::Comma, ","),
    Rule::literal("ENRICH_FIELD_DOT", K::Dot, "."),
    Rule::literal("ENRICH_FIELD_WITH", K::With, "with"),
    Rule::scan("ENRICH_FIELD_ID_PATTERN", K::IdPattern, matchers::id_pattern),
    Rule::scan(
        "ENRICH_FIELD_QUOTED_IDENTIFIER",
        K::QuotedIdentifier,
        matchers::quoted_identifier,
    ),
    Rule::literal("ENRICH_FIELD_PARAM", K::Param, "?").dev_only(),
    Rule::scan(
        "ENRICH_FIELD_NAMED_OR_POSITIONAL_PARAM",
        K::NamedOrPositionalParam,
        matchers::named_or_positional_param,
    )
    .dev_only(),
    Rule::scan(
        "ENRICH_FIELD_LINE_COMMENT",
        K::EnrichFieldLineComment,
        matchers::line_comment,
    )
    .hidden(),
    Rule::scan(
        "ENRICH_FIELD_MULTILINE_COMMENT",
        K::EnrichFieldMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("ENRICH_FIELD_WS", K::EnrichFieldWs, matchers::whitespace).hidden(),
];

static MVEXPAND_RULES: &[Rule] = &[
    Rule::literal("MVEXPAND_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("MVEXPAND_DOT", K::Dot, "."),
    Rule::literal("MVEXPAND_PARAM", K::Param, "?").dev_only(),
    Rule::scan(
        "MVEXPAND_NAMED_OR_POSITIONAL_PARAM",
        K::NamedOrPositionalParam,
        matchers::named_or_positional_param,
    )
    .dev_only(),
    Rule::scan(
        "MVEXPAND_QUOTED_IDENTIFIER",
        K::QuotedIdentifier,
        matchers::quoted_identifier,
    ),
    Rule::scan(
        "MVEXPAND_UNQUOTED_IDENTIFIER",
        K::UnquotedIdentifier,
        matchers::unquoted_identifier,
    ),
    Rule::scan("MVEXPAND_LINE_COMMENT", K::MvexpandLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "MVEXPAND_MULTILINE_COMMENT",
        K::MvexpandMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("MVEXPAND_WS", K::MvexpandWs, matchers::whitespace).hidden(),
];

static SHOW_RULES: &[Rule] = &[
    Rule::literal("SHOW_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("INFO", K::Info, "info"),
    Rule::scan("SHOW_LINE_COMMENT", K::ShowLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "SHOW_MULTILINE_COMMENT",
        K::ShowMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("SHOW_WS", K::ShowWs, matchers::whitespace).hidden(),
];

static SETTING_RULES: &[Rule] = &[
    Rule::literal("SETTING_CLOSING_BRACKET", K::ClosingBracket, "]").then(POP),
    Rule::literal("SETTING_COLON", K::Colon, ":"),
    Rule::scan("SETTING", K::Setting, matchers::setting),
    Rule::scan("SETTING_LINE_COMMENT", K::SettingLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "SETTTING_MULTILINE_COMMENT",
        K::SetttingMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("SETTING_WS", K::SettingWs, matchers::whitespace).hidden(),
];

static LOOKUP_RULES: &[Rule] = &[
    Rule::literal("LOOKUP_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("LOOKUP_COLON", K::Colon, ":"),
    Rule::literal("LOOKUP_COMMA", K::Comma, ","),
    Rule::literal("LOOKUP_DOT", K::Dot, "."),
    Rule::literal("LOOKUP_ON", K::On, "on").then(&[Push(Mode::LookupField)]),
    Rule::scan("LOOKUP_UNQUOTED_SOURCE", K::UnquotedSource, matchers::unquoted_source),
    Rule::scan("LOOKUP_QUOTED_SOURCE", K::QuotedString, matchers::quoted_string),
    Rule::scan("LOOKUP_LINE_COMMENT", K::LookupLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "LOOKUP_MULTILINE_COMMENT",
        K::LookupMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("LOOKUP_WS", K::LookupWs, matchers::whitespace).hidden(),
];

static LOOKUP_FIELD_RULES: &[Rule] = &[
    Rule::literal("LOOKUP_FIELD_PIPE", K::Pipe, "|").then(POP_TWICE),
    Rule::literal("LOOKUP_FIELD_COMMA", K::Comma, ","),
    Rule::literal("LOOKUP_FIELD_DOT", K::Dot, "."),
    Rule::scan("LOOKUP_FIELD_ID_PATTERN", K::IdPattern, matchers::id_pattern),
    Rule::scan(
        "LOOKUP_FIELD_LINE_COMMENT",
        K::LookupFieldLineComment,
        matchers::line_comment,
    )
    .hidden(),
    Rule::scan(
        "LOOKUP_FIELD_MULTILINE_COMMENT",
        K::LookupFieldMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("LOOKUP_FIELD_WS", K::LookupFieldWs, matchers::whitespace).hidden(),
];

static JOIN_RULES: &[Rule] = &[
    Rule::literal("JOIN_PIPE", K::Pipe, "|").then(POP),
    Rule::literal("JOIN_JOIN", K::DevJoin, "join").dev_only(),
    Rule::literal("JOIN_AS", K::As, "as"),
    Rule::literal("JOIN_ON", K::On, "on").then(SWITCH_TO_EXPRESSION),
    Rule::literal("USING", K::Using, "USING").then(SWITCH_TO_EXPRESSION),
    Rule::scan(
        "JOIN_UNQUOTED_IDENTIFER",
        K::UnquotedIdentifier,
        matchers::unquoted_identifier,
    ),
    Rule::scan("JOIN_QUOTED_IDENTIFIER", K::QuotedIdentifier, matchers::quoted_identifier),
    Rule::scan("JOIN_LINE_COMMENT", K::JoinLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "JOIN_MULTILINE_COMMENT",
        K::JoinMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("JOIN_WS", K::JoinWs, matchers::whitespace).hidden(),
];

static METRICS_RULES: &[Rule] = &[
    Rule::literal("METRICS_PIPE", K::Pipe, "|").then(POP),
    Rule::scan(
        "METRICS_UNQUOTED_SOURCE",
        K::UnquotedSource,
        matchers::unquoted_source,
    )
    .then(SWITCH_TO_CLOSING_METRICS),
    Rule::scan("METRICS_QUOTED_SOURCE", K::QuotedString, matchers::quoted_string)
        .then(SWITCH_TO_CLOSING_METRICS),
    Rule::scan("METRICS_LINE_COMMENT", K::MetricsLineComment, matchers::line_comment).hidden(),
    Rule::scan(
        "METRICS_MULTILINE_COMMENT",
        K::MetricsMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("METRICS_WS", K::MetricsWs, matchers::whitespace).hidden(),
];

static CLOSING_METRICS_RULES: &[Rule] = &[
    Rule::literal("CLOSING_METRICS_COLON", K::Colon, ":").then(SWITCH_TO_METRICS),
    Rule::literal("CLOSING_METRICS_COMMA", K::Comma, ",").then(SWITCH_TO_METRICS),
    Rule::scan(
        "CLOSING_METRICS_LINE_COMMENT",
        K::ClosingMetricsLineComment,
        matchers::line_comment,
    )
    .hidden(),
    Rule::scan(
        "CLOSING_METRICS_MULTILINE_COMMENT",
        K::ClosingMetricsMultilineComment,
        matchers::multiline_comment,
    )
    .hidden(),
    Rule::scan("CLOSING_METRICS_WS", K::ClosingMetricsWs, matchers::whitespace).hidden(),
    Rule::scan(
        "CLOSING_METRICS_QUOTED_IDENTIFIER",
        K::QuotedIdentifier,
        matchers::quoted_identifier,
    )
    .then(SWITCH_TO_EXPRESSION),
    Rule::scan(
        "CLOSING_METRICS_UNQUOTED_IDENTIFIER",
        K::UnquotedIdentifier,
        matchers::unquoted_identifier,
    )
    .then(SWITCH_TO_EXPRESSION),
    // Loses every tie to CLOSING_METRICS_UNQUOTED_IDENTIFIER
    Rule::literal("CLOSING_METRICS_BY", K::By, "by").then(SWITCH_TO_EXPRESSION),
    Rule::literal("CLOSING_METRICS_PIPE", K::Pipe, "|").then(POP),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_mode_has_hidden_trivia() {
        for mode in Mode::ALL {
            let hidden: Vec<_> = mode
                .rules()
                .iter()
                .filter(|rule| rule.channel == Channel::Hidden)
                .collect();
            assert_eq!(hidden.len(), 3, "{}", mode);
            assert!(hidden.iter().all(|rule| rule.kind.is_trivia()));
        }
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut seen = HashSet::new();
        for (mode, rule) in all_rules() {
            assert!(seen.insert(rule.name), "{} repeated in {}", rule.name, mode);
        }
        assert_eq!(seen.len(), 198);
    }

    #[test]
    fn test_every_grammar_kind_is_reachable() {
        let emitted: HashSet<TokenKind> = all_rules().map(|(_, rule)| rule.kind).collect();
        for kind in TokenKind::ALL {
            if kind.id() > 0 {
                assert!(emitted.contains(kind), "{} has no rule", kind);
            }
        }
    }

    #[test]
    fn test_gated_rules() {
        let gated: Vec<&str> = all_rules()
            .filter(|(_, rule)| rule.dev_only)
            .map(|(_, rule)| rule.name)
            .collect();
        assert_eq!(gated.len(), 17);
        assert!(gated.contains(&"DEV_JOIN_LOOKUP"));
        assert!(gated.contains(&"MVEXPAND_NAMED_OR_POSITIONAL_PARAM"));
        assert!(!gated.contains(&"PARAM"));
    }

    #[test]
    fn test_rule_order_is_grammar_order() {
        let names: Vec<_> = Mode::Join.rule_names().collect();
        assert_eq!(
            names,
            [
                "JOIN_PIPE",
                "JOIN_JOIN",
                "JOIN_AS",
                "JOIN_ON",
                "USING",
                "JOIN_UNQUOTED_IDENTIFER",
                "JOIN_QUOTED_IDENTIFIER",
                "JOIN_LINE_COMMENT",
                "JOIN_MULTILINE_COMMENT",
                "JOIN_WS",
            ]
        );
        assert_eq!(Mode::Default.rules().len(), 28);
        assert_eq!(Mode::Expression.rules().len(), 49);
    }

    #[test]
    fn test_literal_rules_match_case_insensitively() {
        let from = &Mode::Default.rules()[5];
        assert_eq!(from.name, "FROM");
        assert_eq!(from.matches("FrOm x").map(|scan| scan.len), Some(4));
        assert!(from.matches("fro").is_none());
    }
}
