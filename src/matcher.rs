//! Missing reference-link detection
//!
//! Scans markdown for bracket citations (`[name]`, `[name][]`,
//! `[text][name]`) and returns the names that have no `[name]: target`
//! definition line in the document.
//!
//! Bracket forms overlap, so the scanner tries a fixed, ordered list of
//! patterns at each position and keeps the first one that matches.

use crate::expand::expand_reflinks;
use crate::names::is_valid_package_name;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\[([^\]]+)\])(\[([^\]]+)\])?").unwrap());

static NAME_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[-a-z0-9.]+$").unwrap());

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^v?[0-9]+\.").unwrap());

/// Bracket pattern classes, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// "`[": the bracket opens inside a code span
    CodeGuard,
    /// `[name][]`
    Collapsed,
    /// `[name]` not followed by a backtick, `(` or `[`
    Bare,
    /// `[text][label]`
    Full,
    /// `[name]` at the end of a line, with no backtick or `]` on the line
    /// from the bracket onwards
    TrailingBare,
}

impl Pattern {
    pub const ALL: [Pattern; 5] = [
        Pattern::CodeGuard,
        Pattern::Collapsed,
        Pattern::Bare,
        Pattern::Full,
        Pattern::TrailingBare,
    ];

    /// Try this pattern at byte offset `pos`, returning the end of the match.
    /// Offsets inside a multi-byte character never match.
    pub fn match_at(self, text: &str, pos: usize) -> Option<usize> {
        if !text.is_char_boundary(pos) {
            return None;
        }
        let bytes = text.as_bytes();
        match self {
            Pattern::CodeGuard => {
                (bytes.get(pos) == Some(&b'`') && bytes.get(pos + 1) == Some(&b'['))
                    .then_some(pos + 2)
            }
            Pattern::Collapsed => {
                let close = word_label(bytes, pos)?;
                let end = close + 3;
                (bytes.get(close + 1..end) == Some(b"[]".as_slice())
                    && bytes.get(end) != Some(&b'`'))
                .then_some(end)
            }
            Pattern::Bare => {
                let close = word_label(bytes, pos)?;
                match bytes.get(close + 1) {
                    Some(b'`' | b'(' | b'[') => None,
                    _ => Some(close + 1),
                }
            }
            Pattern::Full => {
                let first = any_label(bytes, pos)?;
                let second = any_label(bytes, first + 1)?;
                (bytes.get(second + 1) != Some(&b'`')).then_some(second + 1)
            }
            Pattern::TrailingBare => {
                let close = word_label(bytes, pos)?;
                // the closing `]` must sit past the end of this line
                let head = &text[pos..close];
                let line_end = head.find(is_line_break)?;
                if head[..line_end].contains('`') {
                    return None;
                }
                let rest = &text[close + 1..];
                (rest.is_empty() || rest.starts_with(' ') || rest.starts_with(is_line_break))
                    .then_some(close + 1)
            }
        }
    }
}

fn is_line_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Index of the first `]` after the `[` at `open`
fn closing_bracket(bytes: &[u8], open: usize) -> Option<usize> {
    if bytes.get(open) != Some(&b'[') {
        return None;
    }
    let start = open + 1;
    bytes
        .get(start..)?
        .iter()
        .position(|&b| b == b']')
        .map(|i| start + i)
}

/// `[` + word char + at least one more non-`]` char + `]`
fn word_label(bytes: &[u8], open: usize) -> Option<usize> {
    if !bytes.get(open + 1).is_some_and(|&b| is_word_byte(b)) {
        return None;
    }
    let close = closing_bracket(bytes, open)?;
    (close >= open + 3).then_some(close)
}

/// `[` + at least one non-`]` char + `]`
fn any_label(bytes: &[u8], open: usize) -> Option<usize> {
    let close = closing_bracket(bytes, open)?;
    (close >= open + 2).then_some(close)
}

/// Lazy left-to-right scan over bracket expressions, first pattern wins
pub struct Brackets<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Brackets<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Brackets<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            // every pattern opens with a backtick or `[`
            let start = self.pos + self.text.get(self.pos..)?.find(['`', '['])?;
            if let Some(end) = Pattern::ALL
                .iter()
                .find_map(|p| p.match_at(self.text, start))
            {
                self.pos = end;
                return Some(&self.text[start..end]);
            }
            self.pos = start + 1;
        }
    }
}

/// Name cited by a bracket expression: the label of `[x][y]`, else `x`
pub fn parse_name(bracket: &str) -> Option<&str> {
    let cap = NAME_RE.captures(bracket)?;
    cap.get(4).or_else(|| cap.get(2)).map(|m| m.as_str())
}

/// Package-style name that is not a version number
pub fn is_candidate(name: &str) -> bool {
    is_valid_package_name(name) && NAME_CHARS_RE.is_match(name) && !VERSION_RE.is_match(name)
}

/// True when a line of `text` starts with `[name]: ` followed by a target
pub fn has_definition(text: &str, name: &str) -> bool {
    let prefix = format!("[{}]: ", name);
    text.split('\n').any(|line| {
        line.strip_prefix(&prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| !is_line_break(c))
    })
}

/// Names cited in already-expanded `text` that lack a definition line,
/// sorted lexicographically
pub fn matches(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names: Vec<String> = Vec::new();

    for bracket in Brackets::new(text) {
        if !seen.insert(bracket) || bracket.starts_with('`') {
            continue;
        }
        let Some(name) = parse_name(bracket) else {
            continue;
        };
        if names.iter().any(|n| n == name) {
            continue;
        }
        if !is_candidate(name) {
            continue;
        }
        if has_definition(text, name) {
            continue;
        }
        names.push(name.to_string());
    }

    names.sort();
    names
}

/// Expand local shorthand, then collect missing reference names
pub fn extract(text: &str) -> Vec<String> {
    matches(&expand_reflinks(text))
}
