//! Shorthand expansion
//!
//! Reference usages that resolve to a definition inside the same document are
//! rewritten as inline links before scanning, so only citations without a
//! local target reach the matcher.

use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

static DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[([^\]\n]+)\]:[ \t]*(\S+)").unwrap());

static USAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]\n]+)\]\[([^\]\n]*)\]").unwrap());

/// Collect `[label]: target` definitions, keyed by lowercased label.
/// The first definition of a label wins.
pub fn definitions(text: &str) -> HashMap<String, String> {
    let mut defs = HashMap::new();
    for cap in DEFINITION_RE.captures_iter(text) {
        defs.entry(cap[1].to_lowercase())
            .or_insert_with(|| cap[2].to_string());
    }
    defs
}

/// Rewrite `[text][label]` and `[label][]` into `[text](target)` when
/// `label` is defined locally. Usages preceded by a backtick are left alone.
pub fn expand_reflinks(text: &str) -> Cow<'_, str> {
    let defs = definitions(text);
    if defs.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut changed = false;

    for cap in USAGE_RE.captures_iter(text) {
        let Some(whole) = cap.get(0) else {
            continue;
        };
        if text[..whole.start()].ends_with('`') {
            continue;
        }

        let content = &cap[1];
        let label = match &cap[2] {
            "" => content,
            label => label,
        };
        let Some(target) = defs.get(&label.to_lowercase()) else {
            continue;
        };

        out.push_str(&text[last..whole.start()]);
        out.push('[');
        out.push_str(content);
        out.push_str("](");
        out.push_str(target);
        out.push(')');
        last = whole.end();
        changed = true;
    }

    if !changed {
        return Cow::Borrowed(text);
    }

    out.push_str(&text[last..]);
    tracing::trace!(bytes = out.len(), "expanded local reference links");
    Cow::Owned(out)
}
