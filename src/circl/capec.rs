use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::circl::normalize::{Rule, normalize_all};
use crate::circl::nullable::nullable;
use crate::circl::results::ResultSet;
use crate::circl::serviceclient::ServiceClient;
use crate::context::Context;
use crate::error::{Error, Result};

/// CAPEC ids are requested bare and keyed as `CAPEC-x`.
const CAPEC_RULE: Rule = Rule::strip("CAPEC-");
const CAPEC_KEY_PREFIX: &str = "CAPEC-";

/// CAPEC attack pattern as returned by `cve.circl.lu`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capec {
    /// Bare numeric id, e.g. `"13"`.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub prerequisites: String,
    #[serde(rename = "related_weakness", deserialize_with = "nullable")]
    pub related_weaknesses: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub solutions: String,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
}

impl fmt::Display for Capec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl ServiceClient {
    /// Retrieve the CAPEC entries for `capecids`, one request per id.
    ///
    /// Ids may be bare (`13`) or prefixed (`CAPEC-13`); results are keyed
    /// as `CAPEC-13` either way.
    pub async fn get_capecs<S: AsRef<str>>(
        &self,
        ctx: &Context,
        capecids: &[S],
    ) -> Result<ResultSet> {
        let normalized = normalize_all(capecids, CAPEC_RULE);
        let mut results = ResultSet::new();

        for id in &normalized {
            let outcome = self.fetch_capec(ctx, id).await;
            if let Err(e) = &outcome {
                log::warn!("CAPEC lookup failed for {}{}: {}", CAPEC_KEY_PREFIX, id, e);
            }
            results.insert(&normalized, id, outcome, CAPEC_KEY_PREFIX);
        }

        results.fill_missing(&normalized, CAPEC_KEY_PREFIX);

        log::info!(
            "Fetched {} CAPEC(s), {} failed",
            results.len(),
            results.error_count()
        );

        Ok(results)
    }

    /// Retrieve a single CAPEC by its bare or `CAPEC-x` id.
    pub async fn get_capec(&self, ctx: &Context, capecid: &str) -> Result<Capec> {
        let normalized = CAPEC_RULE.apply(capecid.trim());
        if normalized.is_empty() {
            return Err(Error::InvalidInput { kind: "CAPEC" });
        }

        let key = format!("{}{}", CAPEC_KEY_PREFIX, normalized);
        let mut results = self.get_capecs(ctx, &[normalized]).await?;
        results
            .remove(&key)
            .ok_or_else(|| Error::not_found(key.as_str()))??
            .into_capec()
    }

    async fn fetch_capec(&self, ctx: &Context, id: &str) -> Result<Capec> {
        let url = self.circl_url(&self.config().capec_path, id);
        let response: Option<Capec> = self.fetch_json(ctx, &url, StatusCode::OK, None).await?;

        match response {
            Some(capec) if capec.id == id => Ok(capec),
            _ => Err(Error::not_found(format!("{CAPEC_KEY_PREFIX}{id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_circl_capec() {
        let body = r#"{
            "id": "13",
            "name": "Subverting Environment Variable Values",
            "prerequisites": "An environment variable is accessible to the user.",
            "related_weakness": ["353", "285", "302", "74", "15", "73", "20", "200"],
            "solutions": "Protect environment variables against unauthorized read and write access.",
            "summary": "The attacker directly or indirectly modifies environment variables."
        }"#;

        let capec: Capec = serde_json::from_str(body).unwrap();
        assert_eq!(capec.name, "Subverting Environment Variable Values");
        assert_eq!(capec.related_weaknesses.len(), 8);
        assert_eq!(capec.to_string(), "13");
    }

    #[test]
    fn test_null_fields_decode_to_defaults() {
        let body = r#"{
            "id": "13",
            "name": "Subverting Environment Variable Values",
            "prerequisites": null,
            "related_weakness": null,
            "solutions": null
        }"#;

        let capec: Capec = serde_json::from_str(body).unwrap();
        assert_eq!(capec.id, "13");
        assert_eq!(capec.solutions, "");
        assert_eq!(capec.prerequisites, "");
        assert!(capec.related_weaknesses.is_empty());
    }
}
