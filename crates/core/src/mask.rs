//! Case-insensitive catalog masks.
//!
//! A mask is either `*`-wildcard shorthand (`SWT*`, `PROJ-??`) or a regular
//! expression. Matching is anchored to the whole candidate and folds ASCII
//! letters only; other characters match exactly.
//!
//! Masks run in two engines: the `regex` crate for in-memory filtering and
//! PostgreSQL (`column ~ pattern`) for catalogs. A mask is parsed into a
//! syntax tree and re-emitted in a small dialect both engines read the same
//! way: letters become `[aA]` classes, every other non-alphanumeric
//! character becomes a `\uXXXX` escape, and Perl or POSIX classes are
//! spelled out as explicit ranges. Constructs outside that dialect (named
//! groups, inline flags, Unicode classes, `\A`/`\z` and word boundaries) are
//! rejected as validation errors.

use regex::Regex;
use regex_syntax::ast::parse::Parser;
use regex_syntax::ast::{
    AssertionKind, Ast, ClassAsciiKind, ClassPerlKind, ClassSet, ClassSetItem, GroupKind,
    RepetitionKind, RepetitionRange,
};

use crate::error::CoreError;

/// Characters whose presence marks a mask as a regular expression.
const REGEX_META: &[char] = &['^', '$', '(', ')', '[', ']', '{', '}', '|', '+', '\\'];

/// Any character, newline included, in both engines.
const ANY_CHAR: &str = "(?:.|\\n)";

/// PostgreSQL rejects counted repetitions above this bound.
const MAX_REPETITION: u32 = 255;

type Ranges = Vec<(char, char)>;

/// A parsed mask.
#[derive(Debug, Clone, Default)]
pub enum Mask {
    /// Absent, empty or `*`: matches everything.
    #[default]
    Any,
    /// A compiled, anchored pattern.
    Pattern {
        /// Anchored pattern text, shared with SQL queries.
        anchored: String,
        regex: Regex,
    },
}

impl Mask {
    /// Parse an optional mask string.
    ///
    /// Returns a validation error when the mask is not a valid regular
    /// expression or uses syntax outside the portable dialect.
    pub fn parse(mask: Option<&str>) -> Result<Self, CoreError> {
        let mask = match mask.map(str::trim) {
            None | Some("") | Some("*") => return Ok(Mask::Any),
            Some(m) => m,
        };
        let invalid = |reason: String| CoreError::Validation(format!("Invalid mask '{mask}': {reason}"));

        let source = if is_glob(mask) {
            glob_to_regex(mask)
        } else {
            mask.to_string()
        };
        let ast = Parser::new()
            .parse(&source)
            .map_err(|e| invalid(e.kind().to_string()))?;

        let mut body = String::with_capacity(source.len() * 4);
        emit(&ast, &mut body).map_err(invalid)?;
        let anchored = format!("^(?:{body})$");

        let regex = Regex::new(&anchored).map_err(|e| invalid(e.to_string()))?;

        Ok(Mask::Pattern { anchored, regex })
    }

    /// Whether `candidate` matches the whole mask.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Mask::Any => true,
            Mask::Pattern { regex, .. } => regex.is_match(candidate),
        }
    }

    /// Pattern for a PostgreSQL match (`~`), `None` for match-all.
    ///
    /// Case folding is already spelled out in the pattern, so the SQL side
    /// uses the case-sensitive operator.
    pub fn to_pg_regex(&self) -> Option<&str> {
        match self {
            Mask::Any => None,
            Mask::Pattern { anchored, .. } => Some(anchored),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Mask::Any)
    }
}

/// One-shot convenience: parse `mask` and test `candidate`.
///
/// An unparseable mask matches nothing.
pub fn matches(mask: Option<&str>, candidate: &str) -> bool {
    Mask::parse(mask).is_ok_and(|m| m.matches(candidate))
}

/// Whether a mask names exactly one value, i.e. uses no wildcard or regex
/// syntax at all.
pub fn is_literal(mask: &str) -> bool {
    !mask.contains(['*', '?', '.']) && !mask.contains(REGEX_META)
}

/// A mask is wildcard shorthand when it uses `*` or `?` and nothing that
/// only makes sense as regex syntax.
fn is_glob(mask: &str) -> bool {
    mask.contains(['*', '?'])
        && !mask.contains(REGEX_META)
        && !mask.contains(".*")
        && !mask.contains(".?")
}

fn glob_to_regex(mask: &str) -> String {
    let mut out = String::with_capacity(mask.len() * 2);
    for c in mask.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Portable dialect
// ---------------------------------------------------------------------------

fn emit(ast: &Ast, out: &mut String) -> Result<(), String> {
    match ast {
        Ast::Empty(_) => {}
        Ast::Literal(lit) => push_literal(lit.c, out),
        Ast::Dot(_) => out.push_str(ANY_CHAR),
        Ast::Assertion(assertion) => match assertion.kind {
            AssertionKind::StartLine => out.push('^'),
            AssertionKind::EndLine => out.push('$'),
            _ => return Err("only the ^ and $ anchors are supported".into()),
        },
        Ast::ClassPerl(class) => push_class(&perl_ranges(&class.kind), class.negated, out)?,
        Ast::ClassBracketed(class) => {
            let mut ranges = Vec::new();
            collect_class_set(&class.kind, &mut ranges)?;
            push_class(&ranges, class.negated, out)?;
        }
        Ast::ClassUnicode(_) => return Err("Unicode classes are not supported".into()),
        Ast::Flags(_) => return Err("inline flags are not supported".into()),
        Ast::Repetition(rep) => {
            match rep.ast.as_ref() {
                Ast::Empty(_) | Ast::Assertion(_) | Ast::Flags(_) => {
                    return Err("repetition needs something to repeat".into())
                }
                Ast::Concat(_) | Ast::Repetition(_) => {
                    out.push_str("(?:");
                    emit(&rep.ast, out)?;
                    out.push(')');
                }
                atom => emit(atom, out)?,
            }
            match &rep.op.kind {
                RepetitionKind::ZeroOrOne => out.push('?'),
                RepetitionKind::ZeroOrMore => out.push('*'),
                RepetitionKind::OneOrMore => out.push('+'),
                RepetitionKind::Range(range) => {
                    let (min, max) = match *range {
                        RepetitionRange::Exactly(n) => (n, Some(n)),
                        RepetitionRange::AtLeast(n) => (n, None),
                        RepetitionRange::Bounded(m, n) => (m, Some(n)),
                    };
                    if min.max(max.unwrap_or(0)) > MAX_REPETITION {
                        return Err(format!(
                            "repetition counts above {MAX_REPETITION} are not supported"
                        ));
                    }
                    match max {
                        Some(n) if n == min => out.push_str(&format!("{{{min}}}")),
                        Some(n) => out.push_str(&format!("{{{min},{n}}}")),
                        None => out.push_str(&format!("{{{min},}}")),
                    }
                }
            }
            if !rep.greedy {
                out.push('?');
            }
        }
        Ast::Group(group) => {
            match &group.kind {
                GroupKind::CaptureIndex(_) => {}
                GroupKind::NonCapturing(flags) if flags.items.is_empty() => {}
                GroupKind::NonCapturing(_) => return Err("inline flags are not supported".into()),
                GroupKind::CaptureName { .. } => return Err("named groups are not supported".into()),
            }
            out.push_str("(?:");
            emit(&group.ast, out)?;
            out.push(')');
        }
        Ast::Alternation(alternation) => {
            out.push_str("(?:");
            for (i, branch) in alternation.asts.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                emit(branch, out)?;
            }
            out.push(')');
        }
        Ast::Concat(concat) => {
            for item in &concat.asts {
                emit(item, out)?;
            }
        }
    }
    Ok(())
}

fn push_literal(c: char, out: &mut String) {
    if c.is_ascii_alphabetic() {
        out.push('[');
        out.push(c.to_ascii_lowercase());
        out.push(c.to_ascii_uppercase());
        out.push(']');
    } else {
        push_char(c, out);
    }
}

/// Alphanumerics as-is, everything else as a `\u` escape.
fn push_char(c: char, out: &mut String) {
    let code = u32::from(c);
    if c.is_ascii_alphanumeric() {
        out.push(c);
    } else if code <= 0xFFFF {
        out.push_str(&format!("\\u{code:04X}"));
    } else {
        out.push_str(&format!("\\U{code:08X}"));
    }
}

fn push_class(ranges: &[(char, char)], negated: bool, out: &mut String) -> Result<(), String> {
    let folded = fold_ascii_case(ranges);
    if folded.is_empty() {
        return Err("empty character class".into());
    }
    out.push('[');
    if negated {
        out.push('^');
    }
    for (lo, hi) in folded {
        push_char(lo, out);
        if hi != lo {
            out.push('-');
            push_char(hi, out);
        }
    }
    out.push(']');
    Ok(())
}

fn collect_class_set(set: &ClassSet, ranges: &mut Ranges) -> Result<(), String> {
    match set {
        ClassSet::Item(item) => collect_class_item(item, ranges),
        ClassSet::BinaryOp(_) => Err("class set operations are not supported".into()),
    }
}

fn collect_class_item(item: &ClassSetItem, ranges: &mut Ranges) -> Result<(), String> {
    match item {
        ClassSetItem::Empty(_) => {}
        ClassSetItem::Literal(lit) => ranges.push((lit.c, lit.c)),
        ClassSetItem::Range(range) => ranges.push((range.start.c, range.end.c)),
        ClassSetItem::Ascii(class) if !class.negated => ranges.extend(ascii_ranges(&class.kind)),
        ClassSetItem::Perl(class) if !class.negated => ranges.extend(perl_ranges(&class.kind)),
        ClassSetItem::Ascii(_) | ClassSetItem::Perl(_) => {
            return Err("negated classes inside brackets are not supported".into())
        }
        ClassSetItem::Unicode(_) => return Err("Unicode classes are not supported".into()),
        ClassSetItem::Bracketed(_) => return Err("nested classes are not supported".into()),
        ClassSetItem::Union(union) => {
            for item in &union.items {
                collect_class_item(item, ranges)?;
            }
        }
    }
    Ok(())
}

/// `\d`, `\s` and `\w` with their ASCII meaning.
fn perl_ranges(kind: &ClassPerlKind) -> Ranges {
    match kind {
        ClassPerlKind::Digit => vec![('0', '9')],
        ClassPerlKind::Space => vec![('\t', '\r'), (' ', ' ')],
        ClassPerlKind::Word => vec![('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')],
    }
}

fn ascii_ranges(kind: &ClassAsciiKind) -> Ranges {
    match kind {
        ClassAsciiKind::Alnum => vec![('0', '9'), ('A', 'Z'), ('a', 'z')],
        ClassAsciiKind::Alpha => vec![('A', 'Z'), ('a', 'z')],
        ClassAsciiKind::Ascii => vec![('\0', '\x7F')],
        ClassAsciiKind::Blank => vec![('\t', '\t'), (' ', ' ')],
        ClassAsciiKind::Cntrl => vec![('\0', '\x1F'), ('\x7F', '\x7F')],
        ClassAsciiKind::Digit => vec![('0', '9')],
        ClassAsciiKind::Graph => vec![('!', '~')],
        ClassAsciiKind::Lower => vec![('a', 'z')],
        ClassAsciiKind::Print => vec![(' ', '~')],
        ClassAsciiKind::Punct => vec![('!', '/'), (':', '@'), ('[', '`'), ('{', '~')],
        ClassAsciiKind::Space => vec![('\t', '\r'), (' ', ' ')],
        ClassAsciiKind::Upper => vec![('A', 'Z')],
        ClassAsciiKind::Word => vec![('0', '9'), ('A', 'Z'), ('_', '_'), ('a', 'z')],
        ClassAsciiKind::Xdigit => vec![('0', '9'), ('A', 'F'), ('a', 'f')],
    }
}

/// Add the other ASCII case of every letter in `ranges`, then sort and
/// merge.
fn fold_ascii_case(ranges: &[(char, char)]) -> Ranges {
    let mut all = ranges.to_vec();
    for &(lo, hi) in ranges {
        for (first, last) in [('a', 'z'), ('A', 'Z')] {
            let (from, to) = (lo.max(first), hi.min(last));
            if from <= to {
                all.push((swap_case(from), swap_case(to)));
            }
        }
    }
    all.sort_unstable();

    let mut merged: Ranges = Vec::with_capacity(all.len());
    for (lo, hi) in all {
        match merged.last_mut() {
            Some(last) if u32::from(lo) <= u32::from(last.1) + 1 => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

fn swap_case(c: char) -> char {
    if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else {
        c.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn absent_empty_and_star_match_all() {
        for mask in [None, Some(""), Some("*"), Some("  ")] {
            let parsed = Mask::parse(mask).unwrap();
            assert!(parsed.is_any(), "{mask:?} should be match-all");
            assert!(parsed.matches("anything at all"));
            assert!(parsed.matches(""));
        }
    }

    #[test]
    fn literal_is_full_and_case_insensitive() {
        let mask = Mask::parse(Some("keys")).unwrap();
        assert!(mask.matches("KEYS"));
        assert!(mask.matches("Keys"));
        assert!(!mask.matches("KEYSTONE"));
        assert!(!mask.matches("MKEYS"));
    }

    #[test]
    fn glob_star_and_question_mark() {
        let mask = Mask::parse(Some("proj-*")).unwrap();
        assert!(mask.matches("PROJ-1"));
        assert!(mask.matches("proj-"));
        assert!(!mask.matches("XPROJ-1"));

        let mask = Mask::parse(Some("A?C")).unwrap();
        assert!(mask.matches("abc"));
        assert!(!mask.matches("abbc"));
    }

    #[test]
    fn glob_escapes_literal_dots() {
        let mask = Mask::parse(Some("LOC.Stage*")).unwrap();
        assert!(mask.matches("LOC.Stage.Inst"));
        assert!(!mask.matches("LOCXStage"));
    }

    #[test]
    fn regex_mask_is_anchored() {
        let mask = Mask::parse(Some("SW[TF]")).unwrap();
        assert!(mask.matches("swt"));
        assert!(mask.matches("SWF"));
        assert!(!mask.matches("SWTX"));

        let mask = Mask::parse(Some("PROJ.*")).unwrap();
        assert!(mask.matches("PROJ"));
        assert!(mask.matches("proj_99"));
    }

    #[test]
    fn alternation_stays_inside_anchors() {
        let mask = Mask::parse(Some("A|B")).unwrap();
        assert!(mask.matches("a"));
        assert!(mask.matches("B"));
        assert!(!mask.matches("AB"));
        assert_eq!(mask.to_pg_regex(), Some("^(?:(?:[aA]|[bB]))$"));
    }

    #[test]
    fn invalid_regex_is_validation_error() {
        assert_matches!(Mask::parse(Some("(unclosed")), Err(CoreError::Validation(_)));
        assert!(!matches(Some("(unclosed"), "(unclosed"));
    }

    #[test]
    fn pg_regex_for_glob() {
        let mask = Mask::parse(Some("SWT*")).unwrap();
        assert_eq!(mask.to_pg_regex(), Some("^(?:[sS][wW][tT](?:.|\\n)*)$"));
        assert_eq!(Mask::Any.to_pg_regex(), None);
    }

    #[test]
    fn punctuation_is_escaped_for_both_engines() {
        let mask = Mask::parse(Some("LOC.Stage*")).unwrap();
        assert_eq!(
            mask.to_pg_regex(),
            Some("^(?:[lL][oO][cC]\\u002E[sS][tT][aA][gG][eE](?:.|\\n)*)$")
        );
    }

    #[test]
    fn engine_specific_syntax_is_rejected() {
        for mask in [
            "(?P<n>KEYS)",
            "(?<n>KEYS)",
            "KEY\\z",
            "\\AKEYS",
            "\\bKEYS",
            "\\p{L}+",
            "(?i)keys",
            "(?i:keys)",
            "[[a-z]&&[^x]]",
            "[\\D]",
            "A{256}",
        ] {
            assert_matches!(
                Mask::parse(Some(mask)),
                Err(CoreError::Validation(_)),
                "{mask} should be rejected"
            );
        }
    }

    #[test]
    fn only_ascii_letters_fold() {
        let mask = Mask::parse(Some("ära")).unwrap();
        assert!(mask.matches("ära"));
        assert!(mask.matches("äRA"));
        assert!(!mask.matches("ÄRA"));

        // Unicode simple folding would map these onto `s` and `k`.
        assert!(!Mask::parse(Some("s")).unwrap().matches("\u{17F}"));
        assert!(!Mask::parse(Some("k")).unwrap().matches("\u{212A}"));
    }

    #[test]
    fn perl_and_posix_classes_are_ascii() {
        let digits = Mask::parse(Some("\\d+")).unwrap();
        assert!(digits.matches("0042"));
        assert!(!digits.matches("\u{0663}"));

        let word = Mask::parse(Some("[[:alpha:]_]+")).unwrap();
        assert!(word.matches("Keys_Dam"));
        assert!(!word.matches("Keys Dam"));

        let not_digit = Mask::parse(Some("\\D")).unwrap();
        assert!(not_digit.matches("ä"));
        assert!(!not_digit.matches("7"));
    }

    #[test]
    fn bracket_ranges_fold_case() {
        let mask = Mask::parse(Some("[a-c]+")).unwrap();
        assert!(mask.matches("AbC"));
        assert!(!mask.matches("d"));

        let negated = Mask::parse(Some("[^a]")).unwrap();
        assert!(!negated.matches("A"));
        assert!(negated.matches("b"));
    }

    #[test]
    fn dot_matches_newline() {
        assert!(Mask::parse(Some("A.B")).unwrap().matches("a\nb"));
        assert!(Mask::parse(Some("A*")).unwrap().matches("a\nb"));
    }

    #[test]
    fn lazy_and_counted_repetition() {
        let mask = Mask::parse(Some("K{2,3}?S")).unwrap();
        assert!(mask.matches("kks"));
        assert!(mask.matches("KKKS"));
        assert!(!mask.matches("KS"));
        assert!(mask.to_pg_regex().unwrap().contains("[kK]{2,3}?"));
    }

    #[test]
    fn literal_masks() {
        assert!(is_literal("KEYS"));
        assert!(is_literal("Keys Dam-1"));
        assert!(!is_literal("KEY*"));
        assert!(!is_literal("KEY?"));
        assert!(!is_literal("K.YS"));
        assert!(!is_literal("KEYS|TENK"));
    }

    #[test]
    fn free_function_matches() {
        assert!(matches(None, "x"));
        assert!(matches(Some("*"), "x"));
        assert!(matches(Some("x*"), "XYZ"));
        assert!(!matches(Some("y*"), "XYZ"));
    }
}
