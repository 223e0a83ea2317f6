//! Character-class scanners for the non-literal lexical rules
//!
//! Every scanner receives the unconsumed remainder of the query and reports
//! how many bytes its rule accepts there, or `None` when the rule cannot
//! start at this position. Lengths always end on a character boundary.
//!
//! Delimited constructs never fail once their opening delimiter is seen:
//! a missing terminator or a bad escape is reported through [`ScanIssue`]
//! and the scanner still claims the text, so the stream stays lossless.

use super::error::LiteralKind;

/// Result of a successful scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan {
    pub len: usize,
    pub issue: Option<ScanIssue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanIssue {
    Unterminated(LiteralKind),
    /// Byte range of the offending sequence, relative to the token start
    InvalidEscape { offset: usize, len: usize },
}

impl Scan {
    fn clean(len: usize) -> Option<Scan> {
        (len > 0).then_some(Scan { len, issue: None })
    }

    fn unterminated(len: usize, literal: LiteralKind) -> Scan {
        Scan {
            len,
            issue: Some(ScanIssue::Unterminated(literal)),
        }
    }

    pub fn is_unterminated(&self) -> bool {
        matches!(self.issue, Some(ScanIssue::Unterminated(_)))
    }

    /// Longer scans win; on equal length a terminated scan beats an unterminated one
    pub fn is_better_than(&self, other: &Scan) -> bool {
        self.len > other.len
            || (self.len == other.len && other.is_unterminated() && !self.is_unterminated())
    }
}

// ============================================================================
// Character classes
// ============================================================================

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_id_body(c: char) -> bool {
    is_letter(c) || is_digit(c) || c == '_'
}

fn is_id_pattern_body(c: char) -> bool {
    is_id_body(c) || c == '*'
}

fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\n' | '\t')
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

fn is_policy_name_body(c: char) -> bool {
    !matches!(
        c,
        '\\' | '/' | '?' | '"' | '<' | '>' | '|' | ' ' | ',' | '#' | '\t' | '\r' | '\n' | ':'
    )
}

fn is_setting_char(c: char) -> bool {
    c == '@' || is_digit(c) || c == '.' || is_letter(c) || c == '_'
}

/// Byte length of the longest prefix whose characters all satisfy `pred`
fn take_while(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn first_char(s: &str) -> Option<char> {
    s.chars().next()
}

// ============================================================================
// Literal matching
// ============================================================================

/// Case-insensitive match of a fixed keyword or symbol
pub fn literal(s: &str, text: &str) -> Option<usize> {
    let n = text.len();
    (s.len() >= n && s.as_bytes()[..n].eq_ignore_ascii_case(text.as_bytes())).then_some(n)
}

// ============================================================================
// Trivia
// ============================================================================

/// `[ \r\n\t]+`
pub fn whitespace(s: &str) -> Option<Scan> {
    Scan::clean(take_while(s, is_ws))
}

/// `//` up to the end of the line, including one `\r`? `\n`? terminator
pub fn line_comment(s: &str) -> Option<Scan> {
    let body = s.strip_prefix("//")?;
    let mut len = 2 + take_while(body, |c| !is_line_break(c));
    if s[len..].starts_with('\r') {
        len += 1;
    }
    if s[len..].starts_with('\n') {
        len += 1;
    }
    Scan::clean(len)
}

/// `/* ... */`, closed by the first `*/`
pub fn multiline_comment(s: &str) -> Option<Scan> {
    let body = s.strip_prefix("/*")?;
    Some(match body.find("*/") {
        Some(end) => Scan {
            len: 2 + end + 2,
            issue: None,
        },
        None => Scan::unterminated(s.len(), LiteralKind::BlockComment),
    })
}

// ============================================================================
// Literals
// ============================================================================

/// `"..."` with escapes, or the raw `"""..."""` form; neither spans lines
pub fn quoted_string(s: &str) -> Option<Scan> {
    let regular = regular_string(s)?;
    match triple_quoted_string(s) {
        Some(triple) if triple.is_better_than(&regular) => Some(triple),
        _ => Some(regular),
    }
}

fn regular_string(s: &str) -> Option<Scan> {
    if !s.starts_with('"') {
        return None;
    }

    let mut first_bad_escape = None;
    let mut chars = s.char_indices().skip(1).peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                return Some(Scan {
                    len: i + 1,
                    issue: first_bad_escape,
                })
            }
            '\r' | '\n' => return Some(Scan::unterminated(i, LiteralKind::String)),
            '\\' => match chars.peek().copied() {
                None => return Some(Scan::unterminated(s.len(), LiteralKind::String)),
                Some((j, _)) if s[j..].starts_with(is_line_break) => {
                    return Some(Scan::unterminated(j, LiteralKind::String))
                }
                Some((j, next)) => {
                    chars.next();
                    let valid = matches!(next.to_ascii_lowercase(), 't' | 'n' | 'r' | '"' | '\\');
                    if !valid && first_bad_escape.is_none() {
                        first_bad_escape = Some(ScanIssue::InvalidEscape {
                            offset: i,
                            len: j + next.len_utf8() - i,
                        });
                    }
                }
            },
            _ => {}
        }
    }

    Some(Scan::unterminated(s.len(), LiteralKind::String))
}

fn triple_quoted_string(s: &str) -> Option<Scan> {
    let body = s.strip_prefix("\"\"\"")?;
    let line = &body[..take_while(body, |c| !is_line_break(c))];

    match line.find("\"\"\"") {
        Some(close) => {
            let mut len = 3 + close + 3;
            for _ in 0..2 {
                if s[len..].starts_with('"') {
                    len += 1;
                }
            }
            Some(Scan { len, issue: None })
        }
        None => Some(Scan::unterminated(3 + line.len(), LiteralKind::String)),
    }
}

/// `DIGIT+`
pub fn integer_literal(s: &str) -> Option<Scan> {
    Scan::clean(take_while(s, is_digit))
}

/// `[eE] [+-]? DIGIT+`
fn exponent(s: &str) -> Option<usize> {
    let rest = s.strip_prefix(['e', 'E'])?;
    let sign = usize::from(rest.starts_with(['+', '-']));
    let digits = take_while(&rest[sign..], is_digit);
    (digits > 0).then_some(1 + sign + digits)
}

/// Decimal forms: `1.`, `1.5`, `.5`, `1e3`, `1.5e-3`, `.5E+2`
pub fn decimal_literal(s: &str) -> Option<Scan> {
    let int_digits = take_while(s, is_digit);
    let after_int = &s[int_digits..];

    let mantissa = if after_int.starts_with('.') {
        let frac_digits = take_while(&after_int[1..], is_digit);
        if int_digits == 0 && frac_digits == 0 {
            return None;
        }
        int_digits + 1 + frac_digits
    } else if int_digits > 0 {
        // Without a fraction, only the exponent form is a decimal
        return exponent(after_int).and_then(|exp| Scan::clean(int_digits + exp));
    } else {
        return None;
    };

    let exp = exponent(&s[mantissa..]).unwrap_or(0);
    Scan::clean(mantissa + exp)
}

// ============================================================================
// Identifiers and parameters
// ============================================================================

/// `LETTER (LETTER|DIGIT|_)*` or `(_|@) (LETTER|DIGIT|_)+`
pub fn unquoted_identifier(s: &str) -> Option<Scan> {
    let c = first_char(s)?;
    let rest = &s[c.len_utf8()..];
    let body = take_while(rest, is_id_body);

    if is_letter(c) {
        Scan::clean(1 + body)
    } else if (c == '_' || c == '@') && body > 0 {
        Scan::clean(1 + body)
    } else {
        None
    }
}

/// `` `...` `` where a doubled backquote stands for a literal one
///
/// The longest well-formed identifier wins. With an opening backquote but no
/// valid close the identifier runs to the end of input. An empty pair is
/// closed but holds no block, so it matches nothing.
pub fn quoted_identifier(s: &str) -> Option<Scan> {
    if !s.starts_with('`') {
        return None;
    }

    let bytes = s.as_bytes();
    let mut i = 1;
    let mut has_block = false;
    let mut last_close = None;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            has_block = true;
            i += s[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            continue;
        }

        let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
        if run % 2 == 1 {
            // Pairs up to the last backquote, which closes; nothing can follow
            if has_block || run >= 3 {
                return Some(Scan {
                    len: i + run,
                    issue: None,
                });
            }
            return None;
        }

        // An even run either continues the body or closes one backquote early
        if has_block || run >= 4 {
            last_close = Some(i + run - 1);
        }
        has_block = true;
        i += run;
    }

    Some(match last_close {
        Some(len) => Scan { len, issue: None },
        None => Scan::unterminated(s.len(), LiteralKind::QuotedIdentifier),
    })
}

/// `?` followed by a name or a position: `?name`, `?_x1`, `?2`
pub fn named_or_positional_param(s: &str) -> Option<Scan> {
    let rest = s.strip_prefix('?')?;
    let c = first_char(rest)?;

    if is_letter(c) || c == '_' {
        Scan::clean(1 + 1 + take_while(&rest[1..], is_id_body))
    } else if is_digit(c) {
        Scan::clean(1 + take_while(rest, is_digit))
    } else {
        None
    }
}

/// `(LETTER|*) (LETTER|DIGIT|_|*)*` or `(_|@) (LETTER|DIGIT|_|*)+`
fn unquoted_id_pattern(s: &str) -> Option<usize> {
    let c = first_char(s)?;
    let body = take_while(&s[c.len_utf8()..], is_id_pattern_body);

    if is_letter(c) || c == '*' || ((c == '_' || c == '@') && body > 0) {
        Some(1 + body)
    } else {
        None
    }
}

/// One or more unquoted pattern parts or quoted identifiers, e.g. `a*`, `` `x`.y* ``
pub fn id_pattern(s: &str) -> Option<Scan> {
    let mut len = 0;

    loop {
        let rest = &s[len..];
        if let Some(part) = unquoted_id_pattern(rest) {
            len += part;
            continue;
        }

        match quoted_identifier(rest) {
            Some(quoted) if !quoted.is_unterminated() => len += quoted.len,
            Some(quoted) if len == 0 => return Some(quoted),
            _ => break,
        }
    }

    Scan::clean(len)
}

// ============================================================================
// Sources, policies, settings, commands
// ============================================================================

/// Index names and patterns: `logs-*`, `cluster:index`, `<logs-{now/d}>`
///
/// A `/` is accepted only when the next character cannot start a comment.
pub fn unquoted_source(s: &str) -> Option<Scan> {
    let mut chars = s.char_indices().peekable();
    let mut len = 0;

    while let Some((i, c)) = chars.next() {
        match c {
            ':' | '"' | '=' | '|' | ',' | '[' | ']' | ' ' | '\t' | '\r' | '\n' => break,
            '/' => match chars.peek().copied() {
                Some((j, next)) if next != '*' && next != '/' => {
                    chars.next();
                    len = j + next.len_utf8();
                }
                _ => break,
            },
            _ => len = i + c.len_utf8(),
        }
    }

    Scan::clean(len)
}

/// `(BODY+ ':')? BODY+`, an optionally cluster-qualified policy name
pub fn enrich_policy_name(s: &str) -> Option<Scan> {
    let head = take_while(s, is_policy_name_body);
    if head == 0 {
        return None;
    }

    if s[head..].starts_with(':') {
        let tail = take_while(&s[head + 1..], is_policy_name_body);
        if tail > 0 {
            return Scan::clean(head + 1 + tail);
        }
    }
    Scan::clean(head)
}

/// `(@|DIGIT|.|LETTER|_)+`
pub fn setting(s: &str) -> Option<Scan> {
    Scan::clean(take_while(s, is_setting_char))
}

/// Any run of characters that cannot separate commands
pub fn unknown_command(s: &str) -> Option<Scan> {
    Scan::clean(take_while(s, |c| !matches!(c, ' ' | '\r' | '\n' | '\t' | '[' | ']' | '/')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn len(scan: Option<Scan>) -> Option<usize> {
        scan.map(|s| s.len)
    }

    #[test]
    fn test_literal_is_case_insensitive() {
        assert_eq!(literal("FROM logs", "from"), Some(4));
        assert_eq!(literal("fRoM", "from"), Some(4));
        assert_eq!(literal("fro", "from"), None);
        assert_eq!(literal("LOOKUP_🐔 x", "lookup_🐔"), Some(11));
        assert_eq!(literal("lookup_x", "lookup_🐔"), None);
    }

    #[test]
    fn test_comments() {
        assert_eq!(len(line_comment("// hi\r\nrest")), Some(7));
        assert_eq!(len(line_comment("// hi")), Some(5));
        assert_eq!(line_comment("/ hi"), None);

        assert_eq!(len(multiline_comment("/* a */ b")), Some(7));
        assert_eq!(len(multiline_comment("/* a */ b */")), Some(7));
        assert_eq!(len(multiline_comment("/**/")), Some(4));

        let scan = multiline_comment("/*/ open").unwrap();
        assert_eq!(scan.len, 8);
        assert_matches!(
            scan.issue,
            Some(ScanIssue::Unterminated(LiteralKind::BlockComment))
        );
    }

    #[test]
    fn test_regular_strings() {
        assert_eq!(quoted_string(r#""abc" rest"#), Some(Scan { len: 5, issue: None }));
        assert_eq!(len(quoted_string(r#""a\"b""#)), Some(6));
        assert_eq!(len(quoted_string(r#""\T\N""#)), Some(6));
        assert_eq!(quoted_string("abc"), None);

        let scan = quoted_string("\"abc\nnext").unwrap();
        assert_eq!(scan.len, 4);
        assert!(scan.is_unterminated());

        let scan = quoted_string(r#""a\qb""#).unwrap();
        assert_eq!(scan.len, 6);
        assert_eq!(
            scan.issue,
            Some(ScanIssue::InvalidEscape { offset: 2, len: 2 })
        );
    }

    #[test]
    fn test_triple_quoted_strings() {
        assert_eq!(len(quoted_string(r#""""a "b" c""" x"#)), Some(13));
        assert_eq!(len(quoted_string(r#""""a""""""#)), Some(9));
        assert_eq!(len(quoted_string(r#""""""""#)), Some(6));

        let scan = quoted_string("\"\"\"abc\n\"\"\"").unwrap();
        assert_eq!(scan.len, 6);
        assert!(scan.is_unterminated());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(len(integer_literal("123abc")), Some(3));
        assert_eq!(integer_literal("abc"), None);

        assert_eq!(len(decimal_literal("1.5")), Some(3));
        assert_eq!(len(decimal_literal("1.")), Some(2));
        assert_eq!(len(decimal_literal(".5")), Some(2));
        assert_eq!(len(decimal_literal("1e10")), Some(4));
        assert_eq!(len(decimal_literal("1.5E-3x")), Some(6));
        assert_eq!(len(decimal_literal(".5e+2")), Some(5));
        assert_eq!(len(decimal_literal("2e")), None);
        assert_eq!(decimal_literal("12"), None);
        assert_eq!(decimal_literal("."), None);
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(len(unquoted_identifier("abc_1 x")), Some(5));
        assert_eq!(len(unquoted_identifier("_x")), Some(2));
        assert_eq!(len(unquoted_identifier("@timestamp")), Some(10));
        assert_eq!(unquoted_identifier("_"), None);
        assert_eq!(unquoted_identifier("1a"), None);

        assert_eq!(len(quoted_identifier("`a b` c")), Some(5));
        assert_eq!(len(quoted_identifier("`a``b`")), Some(6));
        assert_eq!(len(quoted_identifier("````")), Some(4));
        assert_eq!(len(quoted_identifier("`a`` ")), Some(3));

        let scan = quoted_identifier("`open").unwrap();
        assert_eq!(scan.len, 5);
        assert!(scan.is_unterminated());

        assert_eq!(quoted_identifier("``"), None);
        assert_eq!(quoted_identifier("`` | LIMIT 1"), None);
        assert_eq!(id_pattern("`` | LIMIT 1"), None);
    }

    #[test]
    fn test_params() {
        assert_eq!(len(named_or_positional_param("?name1 ")), Some(6));
        assert_eq!(len(named_or_positional_param("?_x")), Some(3));
        assert_eq!(len(named_or_positional_param("?12")), Some(3));
        assert_eq!(named_or_positional_param("?"), None);
        assert_eq!(named_or_positional_param("?-"), None);
    }

    #[test]
    fn test_id_patterns() {
        assert_eq!(len(id_pattern("a*, b")), Some(2));
        assert_eq!(len(id_pattern("*")), Some(1));
        assert_eq!(len(id_pattern("first_*name")), Some(11));
        assert_eq!(len(id_pattern("a@b")), Some(3));
        assert_eq!(len(id_pattern("`x y`*")), Some(6));
        assert_eq!(len(id_pattern("a`b` c")), Some(4));
        assert_eq!(len(id_pattern("a`b")), Some(1));
        assert_eq!(id_pattern("_"), None);
        assert_eq!(id_pattern(".a"), None);

        let scan = id_pattern("`open").unwrap();
        assert!(scan.is_unterminated());
    }

    #[test]
    fn test_unquoted_sources() {
        assert_eq!(len(unquoted_source("logs-* | x")), Some(6));
        assert_eq!(len(unquoted_source("<logs-{now/d}>,b")), Some(14));
        assert_eq!(len(unquoted_source("a:b")), Some(1));
        assert_eq!(len(unquoted_source("a//c")), Some(1));
        assert_eq!(len(unquoted_source("a/*c")), Some(1));
        assert_eq!(unquoted_source("/"), None);
        assert_eq!(unquoted_source(",a"), None);
    }

    #[test]
    fn test_policy_names_and_settings() {
        assert_eq!(len(enrich_policy_name("my-policy ON")), Some(9));
        assert_eq!(len(enrich_policy_name("remote:policy x")), Some(13));
        assert_eq!(len(enrich_policy_name("policy: x")), Some(6));
        assert_eq!(enrich_policy_name(":x"), None);

        assert_eq!(len(setting("ccq.mode:any")), Some(8));
        assert_eq!(setting(":any"), None);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(len(unknown_command("join x")), Some(4));
        assert_eq!(len(unknown_command("a|b[")), Some(3));
        assert_eq!(unknown_command(" x"), None);
    }

    #[test]
    fn test_scan_preference() {
        let terminated = Scan { len: 4, issue: None };
        let open = Scan::unterminated(4, LiteralKind::String);
        assert!(terminated.is_better_than(&open));
        assert!(!open.is_better_than(&terminated));
        assert!(Scan::unterminated(5, LiteralKind::String).is_better_than(&terminated));
    }
}
