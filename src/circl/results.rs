//! Batch results keyed by canonical identifier.

use std::collections::HashMap;
use std::collections::hash_map::{Entry, Iter};
use std::fmt;

use crate::circl::capec::Capec;
use crate::circl::cpe::Cpe;
use crate::circl::cve::Cve;
use crate::circl::cwe::Cwe;
use crate::error::{Error, Result};

/// Any record the client can fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Cve(Cve),
    Cwe(Cwe),
    Capec(Capec),
    Cpe(Cpe),
}

impl Record {
    /// Short name of the record's domain, e.g. `"CVE"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Cve(_) => "CVE",
            Record::Cwe(_) => "CWE",
            Record::Capec(_) => "CAPEC",
            Record::Cpe(_) => "CPE",
        }
    }

    pub fn into_cve(self) -> Result<Cve> {
        match self {
            Record::Cve(cve) => Ok(cve),
            other => Err(other.mismatch("CVE")),
        }
    }

    pub fn into_cwe(self) -> Result<Cwe> {
        match self {
            Record::Cwe(cwe) => Ok(cwe),
            other => Err(other.mismatch("CWE")),
        }
    }

    pub fn into_capec(self) -> Result<Capec> {
        match self {
            Record::Capec(capec) => Ok(capec),
            other => Err(other.mismatch("CAPEC")),
        }
    }

    pub fn into_cpe(self) -> Result<Cpe> {
        match self {
            Record::Cpe(cpe) => Ok(cpe),
            other => Err(other.mismatch("CPE")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        Error::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Cve(cve) => fmt::Display::fmt(cve, f),
            Record::Cwe(cwe) => fmt::Display::fmt(cwe, f),
            Record::Capec(capec) => fmt::Display::fmt(capec, f),
            Record::Cpe(cpe) => fmt::Display::fmt(cpe, f),
        }
    }
}

impl From<Cve> for Record {
    fn from(cve: Cve) -> Self {
        Record::Cve(cve)
    }
}

impl From<Cwe> for Record {
    fn from(cwe: Cwe) -> Self {
        Record::Cwe(cwe)
    }
}

impl From<Capec> for Record {
    fn from(capec: Capec) -> Self {
        Record::Capec(capec)
    }
}

impl From<Cpe> for Record {
    fn from(cpe: Cpe) -> Self {
        Record::Cpe(cpe)
    }
}

/// Outcome for one requested identifier: the record, or why it is missing.
pub type ResultEntry = Result<Record>;

/// Results of a batch fetch, one entry per requested identifier.
///
/// Keys are the domain prefix joined with the normalized identifier, e.g.
/// `CAPEC-13` or `CWE-79`. The first entry written for a key wins.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    entries: HashMap<String, ResultEntry>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for `requested` under `prefix + requested`.
    ///
    /// The entry is kept only when `normalized` is empty or contains
    /// `requested`, and no entry exists yet for the key. Returns whether it
    /// was inserted.
    pub(crate) fn insert<R: Into<Record>>(
        &mut self,
        normalized: &[String],
        requested: &str,
        outcome: Result<R>,
        prefix: &str,
    ) -> bool {
        if !normalized.is_empty() && !normalized.iter().any(|n| n == requested) {
            return false;
        }

        match self.entries.entry(format!("{prefix}{requested}")) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(outcome.map(Into::into));
                true
            }
        }
    }

    /// Add a `NotFound` entry for every normalized id that has no entry yet.
    pub(crate) fn fill_missing(&mut self, normalized: &[String], prefix: &str) {
        for id in normalized {
            let key = format!("{prefix}{id}");
            if !self.entries.contains_key(&key) {
                let error = Error::not_found(key.as_str());
                self.entries.insert(key, Err(error));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ResultEntry> {
        self.entries.get(key)
    }

    /// Take the entry for `key` out of the set.
    pub fn remove(&mut self, key: &str) -> Option<ResultEntry> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, ResultEntry> {
        self.entries.iter()
    }

    /// Number of entries that carry an error.
    pub fn error_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_err()).count()
    }

    /// Display strings of every successfully fetched record.
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .values()
            .filter_map(|entry| entry.as_ref().ok())
            .map(ToString::to_string)
            .collect()
    }
}

impl IntoIterator for ResultSet {
    type Item = (String, ResultEntry);
    type IntoIter = std::collections::hash_map::IntoIter<String, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = (&'a String, &'a ResultEntry);
    type IntoIter = Iter<'a, String, ResultEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capec(id: &str, name: &str) -> Capec {
        Capec {
            id: id.to_string(),
            name: name.to_string(),
            ..Capec::default()
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_insert_uses_prefixed_key() {
        let mut results = ResultSet::new();
        let normalized = ids(&["13"]);

        assert!(results.insert(&normalized, "13", Ok(capec("13", "first")), "CAPEC-"));
        assert!(results.contains_key("CAPEC-13"));
        assert!(!results.contains_key("13"));
    }

    #[test]
    fn test_first_write_wins() {
        let mut results = ResultSet::new();
        let normalized = ids(&["13"]);

        results.insert(&normalized, "13", Ok(capec("13", "first")), "CAPEC-");
        let inserted = results.insert(&normalized, "13", Ok(capec("13", "second")), "CAPEC-");

        assert!(!inserted);
        assert_eq!(results.len(), 1);
        let kept = results.remove("CAPEC-13").unwrap().unwrap().into_capec().unwrap();
        assert_eq!(kept.name, "first");
    }

    #[test]
    fn test_unrequested_ids_are_filtered() {
        let mut results = ResultSet::new();
        let normalized = ids(&["79"]);

        let inserted = results.insert(&normalized, "80", Ok(capec("80", "other")), "CAPEC-");
        assert!(!inserted);
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let mut results = ResultSet::new();
        assert!(results.insert(&[], "anything", Ok(capec("1", "x")), ""));
        assert!(results.contains_key("anything"));
    }

    #[test]
    fn test_fill_missing_adds_not_found() {
        let mut results = ResultSet::new();
        let normalized = ids(&["15", "9999"]);

        results.insert(&normalized, "15", Ok(capec("15", "found")), "CWE-");
        results.fill_missing(&normalized, "CWE-");

        assert_eq!(results.len(), 2);
        assert!(results.get("CWE-15").unwrap().is_ok());
        match results.get("CWE-9999").unwrap() {
            Err(Error::NotFound { key }) => assert_eq!(key, "CWE-9999"),
            other => panic!("expected NotFound, got: {other:?}"),
        }
        assert_eq!(results.error_count(), 1);
    }

    #[test]
    fn test_fill_missing_keeps_recorded_errors() {
        let mut results = ResultSet::new();
        let normalized = ids(&["13"]);

        results.insert::<Capec>(&normalized, "13", Err(Error::Cancelled), "CAPEC-");
        results.fill_missing(&normalized, "CAPEC-");

        assert!(matches!(results.get("CAPEC-13"), Some(Err(Error::Cancelled))));
    }

    #[test]
    fn test_wrong_variant_is_type_mismatch() {
        let record = Record::from(capec("13", "x"));
        match record.into_cve() {
            Err(Error::TypeMismatch { expected, found }) => {
                assert_eq!(expected, "CVE");
                assert_eq!(found, "CAPEC");
            }
            other => panic!("expected TypeMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn test_labels_skip_errors() {
        let mut results = ResultSet::new();
        results.insert(&[], "13", Ok(capec("13", "x")), "CAPEC-");
        results.insert::<Capec>(&[], "14", Err(Error::Cancelled), "CAPEC-");

        assert_eq!(results.labels(), vec!["13".to_string()]);
    }
}
