//! Identifier normalization for the CIRCL endpoints.
//!
//! Each endpoint expects ids in one canonical form: CVE lookups want the
//! `CVE-` prefix, while CWE and CAPEC lookups want the bare number.

/// Rewrites identifiers into one canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Substring to replace. Empty means "enforce `new` as a prefix".
    pub old: &'static str,
    pub new: &'static str,
}

impl Rule {
    /// Remove every occurrence of `prefix`.
    pub const fn strip(prefix: &'static str) -> Self {
        Self { old: prefix, new: "" }
    }

    /// Prepend `prefix` unless it is already present.
    pub const fn prefix(prefix: &'static str) -> Self {
        Self { old: "", new: prefix }
    }

    /// Leave identifiers untouched.
    pub const fn identity() -> Self {
        Self { old: "", new: "" }
    }

    pub fn apply(&self, input: &str) -> String {
        if !self.old.is_empty() {
            input.replace(self.old, self.new)
        } else if input.starts_with(self.new) {
            input.to_string()
        } else {
            format!("{}{}", self.new, input)
        }
    }
}

/// Normalize every input with `rule`, keeping length and order.
pub fn normalize_all<S: AsRef<str>>(inputs: &[S], rule: Rule) -> Vec<String> {
    inputs.iter().map(|s| rule.apply(s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_rule_removes_prefix() {
        let normalized = normalize_all(&["13", "CAPEC-13"], Rule::strip("CAPEC-"));
        assert_eq!(normalized, vec!["13", "13"]);
    }

    #[test]
    fn test_prefix_rule_is_idempotent() {
        assert_eq!(normalize_all(&["123"], Rule::prefix("CVE-")), vec!["CVE-123"]);
        assert_eq!(
            normalize_all(&["CVE-123"], Rule::prefix("CVE-")),
            vec!["CVE-123"]
        );
    }

    #[test]
    fn test_strip_replaces_every_occurrence() {
        assert_eq!(Rule::strip("CWE-").apply("CWE-CWE-79"), "79");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(Rule::strip("CAPEC-").apply(""), "");
        assert_eq!(Rule::prefix("CVE-").apply(""), "CVE-");
    }

    #[test]
    fn test_identity_keeps_uri() {
        let uri = "cpe:/a:openbsd:openssh:7.5:-";
        assert_eq!(normalize_all(&[uri], Rule::identity()), vec![uri]);
    }
}
