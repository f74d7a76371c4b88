use std::fmt;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::circl::normalize::{Rule, normalize_all};
use crate::circl::nullable::nullable;
use crate::circl::results::ResultSet;
use crate::circl::serviceclient::ServiceClient;
use crate::circl::timestamp::Timestamp;
use crate::context::Context;
use crate::error::{Error, Result};

/// CVE ids are looked up and keyed in `CVE-x` form.
const CVE_RULE: Rule = Rule::prefix("CVE-");
const CVE_KEY_PREFIX: &str = "";

/// Access vector scoring for a CVE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CveAccess {
    #[serde(deserialize_with = "nullable")]
    pub authentication: String,
    #[serde(deserialize_with = "nullable")]
    pub complexity: String,
    #[serde(deserialize_with = "nullable")]
    pub vector: String,
}

/// CAPEC summary embedded in a CVE response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CveCapec {
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub prerequisites: String,
    #[serde(deserialize_with = "nullable")]
    pub related_weakness: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub solutions: String,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
}

/// Confidentiality, integrity and availability impact of a CVE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CveImpact {
    #[serde(deserialize_with = "nullable")]
    pub availability: String,
    #[serde(deserialize_with = "nullable")]
    pub confidentiality: String,
    #[serde(deserialize_with = "nullable")]
    pub integrity: String,
}

/// Reference links grouped by source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CveRefMap {
    #[serde(deserialize_with = "nullable")]
    pub bid: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub confirm: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub misc: Vec<String>,
}

/// A product configuration affected by a CVE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerableConfiguration {
    /// CPE URI of the product.
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    pub title: Option<String>,
}

/// CVE record as returned by `cve.circl.lu`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cve {
    #[serde(rename = "Modified")]
    pub modified: Option<Timestamp>,
    #[serde(rename = "Published")]
    pub published: Option<Timestamp>,
    #[serde(deserialize_with = "nullable")]
    pub access: CveAccess,
    #[serde(deserialize_with = "nullable")]
    pub assigner: String,
    #[serde(deserialize_with = "nullable")]
    pub capec: Vec<CveCapec>,
    pub cvss: Option<Decimal>,
    #[serde(rename = "cvss-time")]
    pub cvss_time: Option<Timestamp>,
    #[serde(rename = "cvss-vector", deserialize_with = "nullable")]
    pub cvss_vector: String,
    #[serde(deserialize_with = "nullable")]
    pub cwe: String,
    #[serde(deserialize_with = "nullable")]
    pub id: String,
    #[serde(deserialize_with = "nullable")]
    pub impact: CveImpact,
    #[serde(deserialize_with = "nullable")]
    pub references: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub refmap: CveRefMap,
    #[serde(deserialize_with = "nullable")]
    pub summary: String,
    #[serde(deserialize_with = "nullable")]
    pub vulnerable_configuration: Vec<VulnerableConfiguration>,
    #[serde(deserialize_with = "nullable")]
    pub vulnerable_configuration_cpe_2_2: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub vulnerable_product: Vec<String>,
}

impl fmt::Display for Cve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl ServiceClient {
    /// Retrieve the CVE entries for `cveids`, one request per id.
    ///
    /// Ids may be bare (`2018-15919`) or prefixed (`CVE-2018-15919`). Ids
    /// that cannot be fetched get an error entry instead of failing the
    /// batch.
    pub async fn get_cves<S: AsRef<str>>(&self, ctx: &Context, cveids: &[S]) -> Result<ResultSet> {
        let normalized = normalize_all(cveids, CVE_RULE);
        let mut results = ResultSet::new();

        for id in &normalized {
            let outcome = self.fetch_cve(ctx, id).await;
            if let Err(e) = &outcome {
                log::warn!("CVE lookup failed for {}: {}", id, e);
            }
            results.insert(&normalized, id, outcome, CVE_KEY_PREFIX);
        }

        results.fill_missing(&normalized, CVE_KEY_PREFIX);

        log::info!(
            "Fetched {} CVE(s), {} failed",
            results.len(),
            results.error_count()
        );

        Ok(results)
    }

    /// Retrieve a single CVE by its bare or `CVE-x` id.
    pub async fn get_cve(&self, ctx: &Context, cveid: &str) -> Result<Cve> {
        if cveid.trim().is_empty() {
            return Err(Error::InvalidInput { kind: "CVE" });
        }

        let key = format!("{}{}", CVE_KEY_PREFIX, CVE_RULE.apply(cveid));
        let mut results = self.get_cves(ctx, &[cveid]).await?;
        results
            .remove(&key)
            .ok_or_else(|| Error::not_found(key.as_str()))??
            .into_cve()
    }

    async fn fetch_cve(&self, ctx: &Context, id: &str) -> Result<Cve> {
        let url = self.circl_url(&self.config().cve_path, id);
        // CIRCL answers unknown ids with a literal `null`.
        let response: Option<Cve> = self.fetch_json(ctx, &url, StatusCode::OK, None).await?;

        match response {
            Some(cve) if cve.id == id => Ok(cve),
            _ => Err(Error::not_found(format!("{CVE_KEY_PREFIX}{id}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_circl_cve() {
        let body = r#"{
            "Modified": "2019-10-03T00:15:00",
            "Published": "2018-08-28T08:29:00",
            "access": {"authentication": "NONE", "complexity": "MEDIUM", "vector": "NETWORK"},
            "assigner": "cve@mitre.org",
            "capec": [],
            "cvss": 4.3,
            "cvss-time": "2019-10-03T00:15:00",
            "cvss-vector": "AV:N/AC:M/Au:N/C:P/I:N/A:N",
            "cwe": "CWE-200",
            "id": "CVE-2018-15919",
            "impact": {"availability": "NONE", "confidentiality": "PARTIAL", "integrity": "NONE"},
            "references": ["http://seclists.org/oss-sec/2018/q3/180"],
            "summary": "Remotely observable behaviour in auth-gss2.c in OpenSSH.",
            "vulnerable_configuration": [{"id": "cpe:2.3:a:openbsd:openssh:7.8:*:*:*:*:*:*:*", "title": "OpenBSD OpenSSH 7.8"}],
            "vulnerable_product": ["cpe:2.3:a:openbsd:openssh:7.8:*:*:*:*:*:*:*"]
        }"#;

        let cve: Cve = serde_json::from_str(body).unwrap();
        assert_eq!(cve.id, "CVE-2018-15919");
        assert_eq!(cve.cvss, Some(Decimal::new(43, 1)));
        assert_eq!(cve.cwe, "CWE-200");
        assert_eq!(cve.access.vector, "NETWORK");
        assert_eq!(cve.vulnerable_configuration[0].title.as_deref(), Some("OpenBSD OpenSSH 7.8"));
        assert!(cve.refmap.bid.is_empty());
        assert_eq!(cve.published.unwrap().to_string(), "2018-08-28T08:29:00");
        assert_eq!(cve.to_string(), "CVE-2018-15919");
    }

    #[test]
    fn test_bad_timestamp_fails_decode() {
        let err = serde_json::from_str::<Cve>(r#"{"id": "CVE-1", "Modified": "last week"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_null_fields_decode_to_defaults() {
        let body = r#"{
            "id": "CVE-2018-15919",
            "cvss": null,
            "cvss-vector": null,
            "cwe": null,
            "access": null,
            "references": null,
            "refmap": {"bid": null, "confirm": ["https://example.org"], "misc": null},
            "vulnerable_configuration": [{"id": null, "title": null}]
        }"#;

        let cve: Cve = serde_json::from_str(body).unwrap();
        assert_eq!(cve.id, "CVE-2018-15919");
        assert!(cve.cvss.is_none());
        assert_eq!(cve.cvss_vector, "");
        assert_eq!(cve.cwe, "");
        assert_eq!(cve.access, CveAccess::default());
        assert!(cve.references.is_empty());
        assert_eq!(cve.refmap.confirm, vec!["https://example.org"]);
        assert_eq!(cve.vulnerable_configuration[0].id, "");
    }

    #[test]
    fn test_null_body_decodes_to_none() {
        let response: Option<Cve> = serde_json::from_str("null").unwrap();
        assert!(response.is_none());
    }
}
