//! ES|QL token vocabulary
//!
//! Ids 1-128 are the grammar's token types. `Unrecognized` (0) marks input no
//! rule in the active mode accepts, `Eof` (-1) terminates every stream.
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! token_kinds {
    ($( $variant:ident = $id:literal, $name:literal, $literal:expr; )*) => {
        /// Every token type the scanner can emit
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum TokenKind {
            $( $variant, )*
        }

        impl TokenKind {
            /// All kinds in id order (`Eof` first)
            pub const ALL: &'static [TokenKind] = &[ $( TokenKind::$variant, )* ];

            /// Numeric token type
            pub fn id(self) -> i32 {
                match self {
                    $( TokenKind::$variant => $id, )*
                }
            }

            /// Upper-case vocabulary name (`FROM`, `PROJECT_WS`, ...)
            pub fn symbolic_name(self) -> &'static str {
                match self {
                    $( TokenKind::$variant => $name, )*
                }
            }

            /// Fixed source text for kinds that only ever match one literal
            pub fn literal_name(self) -> Option<&'static str> {
                match self {
                    $( TokenKind::$variant => $literal, )*
                }
            }

            pub fn from_id(id: i32) -> Option<TokenKind> {
                match id {
                    $( $id => Some(TokenKind::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

token_kinds! {
    Eof = -1, "EOF", None;
    Unrecognized = 0, "UNRECOGNIZED", None;
    Dissect = 1, "DISSECT", Some("dissect");
    Drop = 2, "DROP", Some("drop");
    Enrich = 3, "ENRICH", Some("enrich");
    Eval = 4, "EVAL", Some("eval");
    Explain = 5, "EXPLAIN", Some("explain");
    From = 6, "FROM", Some("from");
    Grok = 7, "GROK", Some("grok");
    Keep = 8, "KEEP", Some("keep");
    Limit = 9, "LIMIT", Some("limit");
    MvExpand = 10, "MV_EXPAND", Some("mv_expand");
    Rename = 11, "RENAME", Some("rename");
    Row = 12, "ROW", Some("row");
    Show = 13, "SHOW", Some("show");
    Sort = 14, "SORT", Some("sort");
    Stats = 15, "STATS", Some("stats");
    Where = 16, "WHERE", Some("where");
    DevInlinestats = 17, "DEV_INLINESTATS", None;
    DevLookup = 18, "DEV_LOOKUP", None;
    DevMetrics = 19, "DEV_METRICS", None;
    DevJoin = 20, "DEV_JOIN", None;
    DevJoinFull = 21, "DEV_JOIN_FULL", None;
    DevJoinLeft = 22, "DEV_JOIN_LEFT", None;
    DevJoinRight = 23, "DEV_JOIN_RIGHT", None;
    DevJoinLookup = 24, "DEV_JOIN_LOOKUP", None;
    UnknownCmd = 25, "UNKNOWN_CMD", None;
    LineComment = 26, "LINE_COMMENT", None;
    MultilineComment = 27, "MULTILINE_COMMENT", None;
    Ws = 28, "WS", None;
    Pipe = 29, "PIPE", Some("|");
    QuotedString = 30, "QUOTED_STRING", None;
    IntegerLiteral = 31, "INTEGER_LITERAL", None;
    DecimalLiteral = 32, "DECIMAL_LITERAL", None;
    By = 33, "BY", Some("by");
    And = 34, "AND", Some("and");
    Asc = 35, "ASC", Some("asc");
    Assign = 36, "ASSIGN", Some("=");
    CastOp = 37, "CAST_OP", Some("::");
    Colon = 38, "COLON", Some(":");
    Comma = 39, "COMMA", Some(",");
    Desc = 40, "DESC", Some("desc");
    Dot = 41, "DOT", Some(".");
    False = 42, "FALSE", Some("false");
    First = 43, "FIRST", Some("first");
    In = 44, "IN", Some("in");
    Is = 45, "IS", Some("is");
    Last = 46, "LAST", Some("last");
    Like = 47, "LIKE", Some("like");
    Lp = 48, "LP", Some("(");
    Not = 49, "NOT", Some("not");
    Null = 50, "NULL", Some("null");
    Nulls = 51, "NULLS", Some("nulls");
    Or = 52, "OR", Some("or");
    Param = 53, "PARAM", Some("?");
    Rlike = 54, "RLIKE", Some("rlike");
    Rp = 55, "RP", Some(")");
    True = 56, "TRUE", Some("true");
    Eq = 57, "EQ", Some("==");
    Cieq = 58, "CIEQ", Some("=~");
    Neq = 59, "NEQ", Some("!=");
    Lt = 60, "LT", Some("<");
    Lte = 61, "LTE", Some("<=");
    Gt = 62, "GT", Some(">");
    Gte = 63, "GTE", Some(">=");
    Plus = 64, "PLUS", Some("+");
    Minus = 65, "MINUS", Some("-");
    Asterisk = 66, "ASTERISK", Some("*");
    Slash = 67, "SLASH", Some("/");
    Percent = 68, "PERCENT", Some("%");
    NamedOrPositionalParam = 69, "NAMED_OR_POSITIONAL_PARAM", None;
    OpeningBracket = 70, "OPENING_BRACKET", None;
    ClosingBracket = 71, "CLOSING_BRACKET", Some("]");
    UnquotedIdentifier = 72, "UNQUOTED_IDENTIFIER", None;
    QuotedIdentifier = 73, "QUOTED_IDENTIFIER", None;
    ExprLineComment = 74, "EXPR_LINE_COMMENT", None;
    ExprMultilineComment = 75, "EXPR_MULTILINE_COMMENT", None;
    ExprWs = 76, "EXPR_WS", None;
    ExplainWs = 77, "EXPLAIN_WS", None;
    ExplainLineComment = 78, "EXPLAIN_LINE_COMMENT", None;
    ExplainMultilineComment = 79, "EXPLAIN_MULTILINE_COMMENT", None;
    Metadata = 80, "METADATA", Some("metadata");
    UnquotedSource = 81, "UNQUOTED_SOURCE", None;
    FromLineComment = 82, "FROM_LINE_COMMENT", None;
    FromMultilineComment = 83, "FROM_MULTILINE_COMMENT", None;
    FromWs = 84, "FROM_WS", None;
    IdPattern = 85, "ID_PATTERN", None;
    ProjectLineComment = 86, "PROJECT_LINE_COMMENT", None;
    ProjectMultilineComment = 87, "PROJECT_MULTILINE_COMMENT", None;
    ProjectWs = 88, "PROJECT_WS", None;
    As = 89, "AS", Some("as");
    RenameLineComment = 90, "RENAME_LINE_COMMENT", None;
    RenameMultilineComment = 91, "RENAME_MULTILINE_COMMENT", None;
    RenameWs = 92, "RENAME_WS", None;
    On = 93, "ON", Some("on");
    With = 94, "WITH", Some("with");
    EnrichPolicyName = 95, "ENRICH_POLICY_NAME", None;
    EnrichLineComment = 96, "ENRICH_LINE_COMMENT", None;
    EnrichMultilineComment = 97, "ENRICH_MULTILINE_COMMENT", None;
    EnrichWs = 98, "ENRICH_WS", None;
    EnrichFieldLineComment = 99, "ENRICH_FIELD_LINE_COMMENT", None;
    EnrichFieldMultilineComment = 100, "ENRICH_FIELD_MULTILINE_COMMENT", None;
    EnrichFieldWs = 101, "ENRICH_FIELD_WS", None;
    MvexpandLineComment = 102, "MVEXPAND_LINE_COMMENT", None;
    MvexpandMultilineComment = 103, "MVEXPAND_MULTILINE_COMMENT", None;
    MvexpandWs = 104, "MVEXPAND_WS", None;
    Info = 105, "INFO", Some("info");
    ShowLineComment = 106, "SHOW_LINE_COMMENT", None;
    ShowMultilineComment = 107, "SHOW_MULTILINE_COMMENT", None;
    ShowWs = 108, "SHOW_WS", None;
    Setting = 109, "SETTING", None;
    SettingLineComment = 110, "SETTING_LINE_COMMENT", None;
    SetttingMultilineComment = 111, "SETTTING_MULTILINE_COMMENT", None;
    SettingWs = 112, "SETTING_WS", None;
    LookupLineComment = 113, "LOOKUP_LINE_COMMENT", None;
    LookupMultilineComment = 114, "LOOKUP_MULTILINE_COMMENT", None;
    LookupWs = 115, "LOOKUP_WS", None;
    LookupFieldLineComment = 116, "LOOKUP_FIELD_LINE_COMMENT", None;
    LookupFieldMultilineComment = 117, "LOOKUP_FIELD_MULTILINE_COMMENT", None;
    LookupFieldWs = 118, "LOOKUP_FIELD_WS", None;
    Using = 119, "USING", Some("USING");
    JoinLineComment = 120, "JOIN_LINE_COMMENT", None;
    JoinMultilineComment = 121, "JOIN_MULTILINE_COMMENT", None;
    JoinWs = 122, "JOIN_WS", None;
    MetricsLineComment = 123, "METRICS_LINE_COMMENT", None;
    MetricsMultilineComment = 124, "METRICS_MULTILINE_COMMENT", None;
    MetricsWs = 125, "METRICS_WS", None;
    ClosingMetricsLineComment = 126, "CLOSING_METRICS_LINE_COMMENT", None;
    ClosingMetricsMultilineComment = 127, "CLOSING_METRICS_MULTILINE_COMMENT", None;
    ClosingMetricsWs = 128, "CLOSING_METRICS_WS", None;
}

/// Coarse classification used by metrics and highlighters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCategory {
    /// Processing commands (`FROM`, `WHERE`, ...) and unknown command words
    Command,
    /// Preview-only commands behind the version gate
    DevCommand,
    /// Reserved words inside a command (`BY`, `METADATA`, `ON`, ...)
    Keyword,
    Operator,
    Punctuation,
    Literal,
    Identifier,
    /// Index, enrich policy and setting names
    Source,
    Parameter,
    Comment,
    Whitespace,
    /// `Unrecognized` and `Eof`
    Special,
}

impl TokenKind {
    /// Number of grammar token types (excluding `Unrecognized` and `Eof`)
    pub const GRAMMAR_TOKEN_COUNT: usize = 128;

    /// Display name in vocabulary style: the quoted literal when there is one
    pub fn display_name(self) -> String {
        match self.literal_name() {
            Some(literal) => format!("'{}'", literal),
            None => self.symbolic_name().to_string(),
        }
    }

    /// Look up a kind by its vocabulary name
    pub fn from_symbolic_name(name: &str) -> Option<TokenKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.symbolic_name() == name)
    }

    pub fn is_comment(self) -> bool {
        self.symbolic_name().ends_with("_COMMENT")
    }

    pub fn is_whitespace(self) -> bool {
        let name = self.symbolic_name();
        name == "WS" || name.ends_with("_WS")
    }

    /// Comment and whitespace kinds, which are always emitted on the hidden channel
    pub fn is_trivia(self) -> bool {
        self.is_comment() || self.is_whitespace()
    }

    pub fn category(self) -> TokenCategory {
        use TokenKind::*;

        if self.is_comment() {
            return TokenCategory::Comment;
        }
        if self.is_whitespace() {
            return TokenCategory::Whitespace;
        }

        match self {
            Dissect | Drop | Enrich | Eval | Explain | From | Grok | Keep | Limit | MvExpand
            | Rename | Row | Show | Sort | Stats | Where | UnknownCmd => TokenCategory::Command,

            DevInlinestats | DevLookup | DevMetrics | DevJoin | DevJoinFull | DevJoinLeft
            | DevJoinRight | DevJoinLookup => TokenCategory::DevCommand,

            By | And | Asc | Desc | First | In | Is | Last | Like | Not | Nulls | Or | Rlike
            | Metadata | As | On | With | Info | Using => TokenCategory::Keyword,

            Assign | CastOp | Eq | Cieq | Neq | Lt | Lte | Gt | Gte | Plus | Minus | Asterisk
            | Slash | Percent => TokenCategory::Operator,

            Pipe | Colon | Comma | Dot | Lp | Rp | OpeningBracket | ClosingBracket => {
                TokenCategory::Punctuation
            }

            QuotedString | IntegerLiteral | DecimalLiteral | True | False | Null => {
                TokenCategory::Literal
            }

            UnquotedIdentifier | QuotedIdentifier | IdPattern => TokenCategory::Identifier,

            UnquotedSource | EnrichPolicyName | Setting => TokenCategory::Source,

            Param | NamedOrPositionalParam => TokenCategory::Parameter,

            _ => TokenCategory::Special,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbolic_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_dense_and_ordered() {
        assert_eq!(TokenKind::ALL.len(), TokenKind::GRAMMAR_TOKEN_COUNT + 2);
        for (index, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.id(), index as i32 - 1, "{}", kind);
            assert_eq!(TokenKind::from_id(kind.id()), Some(*kind));
        }
        assert_eq!(TokenKind::from_id(129), None);
    }

    #[test]
    fn test_vocabulary_anchors() {
        assert_eq!(TokenKind::Dissect.id(), 1);
        assert_eq!(TokenKind::Where.id(), 16);
        assert_eq!(TokenKind::Pipe.id(), 29);
        assert_eq!(TokenKind::Percent.id(), 68);
        assert_eq!(TokenKind::IdPattern.id(), 85);
        assert_eq!(TokenKind::Using.id(), 119);
        assert_eq!(TokenKind::ClosingMetricsWs.id(), 128);
        assert_eq!(
            TokenKind::SetttingMultilineComment.symbolic_name(),
            "SETTTING_MULTILINE_COMMENT"
        );
    }

    #[test]
    fn test_literal_and_display_names() {
        assert_eq!(TokenKind::Lte.literal_name(), Some("<="));
        assert_eq!(TokenKind::OpeningBracket.literal_name(), None);
        assert_eq!(TokenKind::ClosingBracket.display_name(), "']'");
        assert_eq!(TokenKind::UnquotedSource.display_name(), "UNQUOTED_SOURCE");
        assert_eq!(TokenKind::Using.literal_name(), Some("USING"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(TokenKind::From.category(), TokenCategory::Command);
        assert_eq!(TokenKind::DevJoin.category(), TokenCategory::DevCommand);
        assert_eq!(TokenKind::Gte.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::ProjectWs.category(), TokenCategory::Whitespace);
        assert_eq!(TokenKind::SetttingMultilineComment.category(), TokenCategory::Comment);
        assert_eq!(TokenKind::Eof.category(), TokenCategory::Special);
        assert!(TokenKind::Ws.is_trivia());
        assert!(!TokenKind::Where.is_trivia());
    }

    #[test]
    fn test_serialized_name_matches_vocabulary() {
        for kind in TokenKind::ALL {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.symbolic_name()));
            assert_eq!(TokenKind::from_symbolic_name(kind.symbolic_name()), Some(*kind));
        }
    }
}
