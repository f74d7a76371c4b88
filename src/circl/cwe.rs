use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::circl::normalize::{Rule, normalize_all};
use crate::circl::nullable::nullable;
use crate::circl::results::ResultSet;
use crate::circl::serviceclient::ServiceClient;
use crate::context::Context;
use crate::error::{Error, Result};

/// CWE ids are matched bare and keyed as `CWE-x`.
const CWE_RULE: Rule = Rule::strip("CWE-");
const CWE_KEY_PREFIX: &str = "CWE-";

/// CWE weakness record as returned by `cve.circl.lu`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cwe {
    #[serde(rename = "Description", deserialize_with = "nullable")]
    pub description: String,
    /// Bare numeric id, e.g. `"79"`.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub status: String,
    #[serde(rename = "weaknessabs", deserialize_with = "nullable")]
    pub weakness_abs: String,
}

impl fmt::Display for Cwe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CWE_KEY_PREFIX, self.id)
    }
}

impl Cwe {
    /// Drop the copy of the opening sentence CIRCL appends to descriptions.
    ///
    /// The description is cut right before the last occurrence of its first
    /// `.`-delimited sentence. Descriptions that never repeat it are kept.
    pub fn fix_description(&mut self) {
        let first_sentence = self.description.split('.').next().unwrap_or_default();
        if first_sentence.is_empty() {
            return;
        }

        if let Some(repeat) = self.description.rfind(first_sentence) {
            if repeat > 0 {
                self.description.truncate(repeat);
            }
        }
    }
}

impl ServiceClient {
    /// Retrieve the full CWE enumeration with descriptions fixed.
    pub async fn get_all_cwes(&self, ctx: &Context) -> Result<Vec<Cwe>> {
        let url = self.circl_url(&self.config().cwe_path, "");
        let mut cwes: Vec<Cwe> = self.fetch_json(ctx, &url, StatusCode::OK, None).await?;

        for cwe in &mut cwes {
            cwe.fix_description();
        }

        Ok(cwes)
    }

    /// Retrieve the CWE entries for `cweids`, keyed as `CWE-x`.
    ///
    /// CIRCL has no per-id CWE endpoint, so the enumeration is fetched once
    /// and filtered. When that request fails, its error is recorded for
    /// every requested id.
    pub async fn get_cwes<S: AsRef<str>>(&self, ctx: &Context, cweids: &[S]) -> Result<ResultSet> {
        let normalized = normalize_all(cweids, CWE_RULE);
        let mut results = ResultSet::new();

        match self.get_all_cwes(ctx).await {
            Ok(cwes) => {
                for cwe in cwes {
                    let id = cwe.id.clone();
                    results.insert(&normalized, &id, Ok(cwe), CWE_KEY_PREFIX);
                }
            }
            Err(e) => {
                log::warn!("CWE enumeration failed: {}", e);
                for id in &normalized {
                    results.insert::<Cwe>(&normalized, id, Err(e.clone()), CWE_KEY_PREFIX);
                }
            }
        }

        results.fill_missing(&normalized, CWE_KEY_PREFIX);

        log::info!(
            "Fetched {} CWE(s), {} failed",
            results.len(),
            results.error_count()
        );

        Ok(results)
    }

    /// Retrieve a single CWE by its bare or `CWE-x` id.
    pub async fn get_cwe(&self, ctx: &Context, cweid: &str) -> Result<Cwe> {
        let normalized = CWE_RULE.apply(cweid.trim());
        if normalized.is_empty() {
            return Err(Error::InvalidInput { kind: "CWE" });
        }

        let key = format!("{}{}", CWE_KEY_PREFIX, normalized);
        let mut results = self.get_cwes(ctx, &[normalized]).await?;
        results
            .remove(&key)
            .ok_or_else(|| Error::not_found(key.as_str()))??
            .into_cwe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cwe_with(description: &str) -> Cwe {
        Cwe {
            id: "79".to_string(),
            description: description.to_string(),
            ..Cwe::default()
        }
    }

    #[test]
    fn test_fix_description_strips_repeat() {
        let mut cwe = cwe_with(
            "The software does not neutralize input. It is then served. The software does not neutralize input. It is then served.",
        );
        cwe.fix_description();
        assert_eq!(
            cwe.description,
            "The software does not neutralize input. It is then served. "
        );
    }

    #[test]
    fn test_fix_description_without_repeat_is_unchanged() {
        let mut cwe = cwe_with("A single sentence. And another one.");
        cwe.fix_description();
        assert_eq!(cwe.description, "A single sentence. And another one.");
    }

    #[test]
    fn test_fix_description_empty() {
        let mut cwe = cwe_with("");
        cwe.fix_description();
        assert_eq!(cwe.description, "");
    }

    #[test]
    fn test_display_is_prefixed() {
        assert_eq!(cwe_with("").to_string(), "CWE-79");
    }

    #[test]
    fn test_decode_circl_cwe() {
        let body = r#"{
            "Description": "Information exposure.",
            "id": "200",
            "name": "Exposure of Sensitive Information to an Unauthorized Actor",
            "status": "Draft",
            "weaknessabs": "Class"
        }"#;
        let cwe: Cwe = serde_json::from_str(body).unwrap();
        assert_eq!(cwe.id, "200");
        assert_eq!(cwe.weakness_abs, "Class");
    }
}
