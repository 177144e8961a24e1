//! Static screening rule tables
//!
//! The comment/code pattern list is immutable data compiled once. It is
//! handed to the screener through `ScreeningRules` so tests can swap it out.

use std::sync::LazyLock;

use regex::Regex;

/// Patterns marking QC, comment, status, detection-limit, questionnaire and
/// duplicate-measurement fields. Matched against `"{name} {desc}"` lowercased.
pub const COMMENT_OR_CODE_PATTERNS: &[&str] = &[
    r"\bcomment\b",
    r"\bcomment code\b",
    r"\bresult code\b",
    r"\bstatus code\b",
    r"\bquality control\b",
    r"\bdetection limit\b",
    r"\bdo you\b",
    r"\bdid you\b",
    r"\bhow often\b",
    r"\bquestionnaire\b",
    r"\bdup\b",
    r"\bduplicate\b",
    r"\bab con\b",
    r"\bantibody con",
    r"\bod in dup",
    r"od_dup",
    r"\bmean ab conc",
];

static DEFAULT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    COMMENT_OR_CODE_PATTERNS
        .iter()
        .map(|p| Regex::new(p).expect("built-in screening pattern is valid"))
        .collect()
});

/// Name-based rules applied before any data is inspected
#[derive(Debug, Clone)]
pub struct ScreeningRules {
    comment_patterns: Vec<Regex>,
    subject_id_column: String,
    weight_prefix: String,
}

impl Default for ScreeningRules {
    fn default() -> Self {
        Self {
            comment_patterns: DEFAULT_PATTERNS.clone(),
            subject_id_column: "SEQN".to_string(),
            weight_prefix: "WT".to_string(),
        }
    }
}

impl ScreeningRules {
    /// Default pattern list with custom identifier and weight conventions
    #[must_use]
    pub fn new(subject_id_column: impl Into<String>, weight_prefix: impl Into<String>) -> Self {
        Self {
            subject_id_column: subject_id_column.into(),
            weight_prefix: weight_prefix.into(),
            ..Self::default()
        }
    }

    /// Replace the comment/code pattern list
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.comment_patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    #[must_use]
    pub fn subject_id_column(&self) -> &str {
        &self.subject_id_column
    }

    /// Identifier or sampling-weight field
    #[must_use]
    pub fn is_id_or_weight(&self, variable_name: &str) -> bool {
        variable_name == self.subject_id_column || variable_name.starts_with(&self.weight_prefix)
    }

    /// First comment/code pattern matching the variable, if any
    #[must_use]
    pub fn matching_comment_pattern(
        &self,
        variable_name: &str,
        variable_desc: &str,
    ) -> Option<&str> {
        let text = format!("{variable_name} {variable_desc}").to_lowercase();
        self.comment_patterns
            .iter()
            .find(|re| re.is_match(&text))
            .map(Regex::as_str)
    }

    #[must_use]
    pub fn is_comment_or_code(&self, variable_name: &str, variable_desc: &str) -> bool {
        self.matching_comment_pattern(variable_name, variable_desc)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_comment_and_questionnaire_fields() {
        let rules = ScreeningRules::default();
        assert!(rules.is_comment_or_code("LBDSALLC", "Albumin comment code"));
        assert!(rules.is_comment_or_code("LBXQC", "Quality control flag"));
        assert!(rules.is_comment_or_code("X", "Did you fast before the exam?"));
        assert!(rules.is_comment_or_code("LBXOD_DUP", "Optical density"));
        assert!(rules.is_comment_or_code("X", "Below detection limit indicator"));
        assert!(!rules.is_comment_or_code("LBXSAL", "Albumin, refrigerated serum (g/dL)"));
        // word boundaries: "duplex" is not "dup"
        assert!(!rules.is_comment_or_code("LBXDPX", "Duplex measurement (mg/L)"));
    }

    #[test]
    fn reports_first_matching_pattern() {
        let rules = ScreeningRules::default();
        assert_eq!(
            rules.matching_comment_pattern("LBDX", "Comment code"),
            Some(r"\bcomment\b")
        );
    }

    #[test]
    fn id_and_weight_fields() {
        let rules = ScreeningRules::default();
        assert!(rules.is_id_or_weight("SEQN"));
        assert!(rules.is_id_or_weight("WTSAF2YR"));
        assert!(!rules.is_id_or_weight("LBXWT"));
    }

    #[test]
    fn custom_patterns_replace_defaults() {
        let rules = ScreeningRules::default()
            .with_patterns([r"\bflag\b"])
            .unwrap();
        assert!(rules.is_comment_or_code("X", "Hemolysis flag"));
        assert!(!rules.is_comment_or_code("X", "Comment code"));
    }
}
