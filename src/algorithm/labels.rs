//! Free-text label handling
//!
//! Variable labels look like `Albumin, serum (g/dL)`. The trailing
//! parenthetical is the unit; what precedes it is the analyte name, which is
//! canonicalized into the grouping key used for pooling.

use std::sync::LazyLock;

use regex::Regex;

static TERMINAL_PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)\s*$").expect("terminal unit pattern is valid"));

/// A label split into analyte name and raw unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLabel {
    pub base: String,
    /// Raw unit text, empty when the label has no trailing parenthetical
    pub unit: String,
}

/// Split a label into its base name and trailing parenthesized unit
///
/// Only a non-nested group at the very end counts. Commas left dangling
/// before the group are trimmed from the base.
#[must_use]
pub fn split_label(label: &str) -> SplitLabel {
    let text = label.trim();
    match TERMINAL_PARENTHETICAL.captures(text) {
        Some(caps) => {
            let start = caps.get(0).map_or(text.len(), |m| m.start());
            let unit = caps.get(1).map_or("", |m| m.as_str()).trim().to_string();
            let base = text[..start].trim().trim_end_matches(',').to_string();
            SplitLabel { base, unit }
        }
        None => SplitLabel {
            base: text.to_string(),
            unit: String::new(),
        },
    }
}

fn fold_char(c: char) -> char {
    match c {
        'α' => 'a',
        'β' => 'b',
        'γ' => 'g',
        'δ' => 'd',
        '\u{00b5}' | '\u{03bc}' => 'u',
        '\u{2013}' | '\u{2014}' => '-',
        other => other,
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, ' ' | '%' | '/' | '+' | '-')
}

/// Canonicalize an analyte name into a grouping key
///
/// Lowercases, folds Greek letters and long dashes to ASCII, replaces any
/// character outside `[a-z0-9 %/+-]` with a space and collapses whitespace.
#[must_use]
pub fn normalize_base_name(name: &str) -> String {
    let mapped: String = name
        .to_lowercase()
        .chars()
        .map(fold_char)
        .map(|c| if is_key_char(c) { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}
