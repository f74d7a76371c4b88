use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::circl::normalize::{Rule, normalize_all};
use crate::circl::nullable::nullable;
use crate::circl::results::ResultSet;
use crate::circl::serviceclient::ServiceClient;
use crate::circl::timestamp::Timestamp;
use crate::context::Context;
use crate::error::{Error, Result};

/// CPE URIs are sent and keyed as given.
const CPE_RULE: Rule = Rule::identity();
const CPE_KEY_PREFIX: &str = "";

/// Names of the components captured by [`extract_cpe`], in URI order.
pub const CPE_COMPONENTS: [&str; 13] = [
    "cpe_name",
    "cpe_version",
    "part",
    "vendor",
    "product",
    "version",
    "update",
    "edition",
    "lang",
    "sw_edition",
    "target_sw",
    "target_hw",
    "other",
];

// One optional `:value` component of a CPE 2.2/2.3 URI.
const AV_STRING: &str = r##"(?::([?*]?(?:(?:[a-z0-9\-._]|(?:\\[\\?*!"#$%&'()+,/:;<=>@\[\]^`{|}~])|[%~])*[?*\-]?)))?"##;
const LANG: &str = r"(?::((?:[a-z]{2,3}(?:-(?:[a-z]{2}|[0-9]{3}))?)|[*\-]))?";

static CPE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = [
        r"(?i)^(cpe)",
        r"(?::(2[.]3))?",
        r":[/]?([aoh*\-])",
        AV_STRING, // vendor
        AV_STRING, // product
        AV_STRING, // version
        AV_STRING, // update
        AV_STRING, // edition
        LANG,
        AV_STRING, // sw_edition
        AV_STRING, // target_sw
        AV_STRING, // target_hw
        AV_STRING, // other
        "$",
    ]
    .concat();
    Regex::new(&pattern).expect("valid CPE regex")
});

/// Localized title of a CPE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpeTitle {
    #[serde(deserialize_with = "nullable")]
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub lang: String,
}

/// Reference link attached to a CPE.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpeRef {
    #[serde(rename = "ref", deserialize_with = "nullable")]
    pub reference: String,
    #[serde(rename = "type", deserialize_with = "nullable")]
    pub ref_type: String,
}

/// CPE dictionary entry as returned by `services.nvd.nist.gov`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cpe {
    #[serde(deserialize_with = "nullable")]
    pub deprecated: bool,
    #[serde(rename = "cpe22Uri", deserialize_with = "nullable")]
    pub cpe22_uri: String,
    #[serde(rename = "cpe23Uri", deserialize_with = "nullable")]
    pub cpe23_uri: String,
    pub last_modified_date: Option<Timestamp>,
    #[serde(deserialize_with = "nullable")]
    pub titles: Vec<CpeTitle>,
    #[serde(deserialize_with = "nullable")]
    pub refs: Vec<CpeRef>,
    #[serde(deserialize_with = "nullable")]
    pub deprecated_by: Vec<String>,
    /// CVE ids affecting this CPE, present when `addOns=cves` is requested.
    #[serde(deserialize_with = "nullable")]
    pub vulnerabilities: Vec<String>,
}

impl fmt::Display for Cpe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cpe23_uri)
    }
}

/// Envelope of the NVD CPE match endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NvdResponse {
    pub results_per_page: u32,
    pub start_index: u32,
    pub total_results: u32,
    #[serde(deserialize_with = "nullable")]
    pub result: NvdCpeResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NvdCpeResult {
    #[serde(deserialize_with = "nullable")]
    pub data_type: String,
    #[serde(deserialize_with = "nullable")]
    pub feed_version: String,
    pub cpe_count: u32,
    #[serde(deserialize_with = "nullable")]
    pub feed_timestamp: String,
    #[serde(deserialize_with = "nullable")]
    pub cpes: Vec<Cpe>,
}

impl ServiceClient {
    /// Retrieve the best NVD match for each of `cpeuris`.
    ///
    /// Only the first match is requested and kept. URIs with no match get a
    /// `NotFound` entry.
    pub async fn get_cpes<S: AsRef<str>>(&self, ctx: &Context, cpeuris: &[S]) -> Result<ResultSet> {
        let normalized = normalize_all(cpeuris, CPE_RULE);
        let mut results = ResultSet::new();

        for uri in &normalized {
            let outcome = self.fetch_cpe(ctx, uri).await;
            if let Err(e) = &outcome {
                log::warn!("CPE lookup failed for {}: {}", uri, e);
            }
            // Every URI is looked up verbatim, so no filter applies.
            results.insert(&[], uri, outcome, CPE_KEY_PREFIX);
        }

        results.fill_missing(&normalized, CPE_KEY_PREFIX);

        log::info!(
            "Fetched {} CPE(s), {} failed",
            results.len(),
            results.error_count()
        );

        Ok(results)
    }

    /// Retrieve any NVD information for a single CPE URI.
    pub async fn get_cpe(&self, ctx: &Context, cpeuri: &str) -> Result<Cpe> {
        if cpeuri.trim().is_empty() {
            return Err(Error::InvalidInput { kind: "CPE" });
        }

        let key = format!("{}{}", CPE_KEY_PREFIX, CPE_RULE.apply(cpeuri));
        let mut results = self.get_cpes(ctx, &[cpeuri]).await?;
        results
            .remove(&key)
            .ok_or_else(|| Error::not_found(key.as_str()))??
            .into_cpe()
    }

    async fn fetch_cpe(&self, ctx: &Context, uri: &str) -> Result<Cpe> {
        let url = self.nvd_url(&self.config().cpe_path);
        let params = [
            ("addOns", "cves"),
            ("cpeMatchString", uri),
            ("resultsPerPage", "1"),
        ];

        let response: NvdResponse = self
            .fetch_json(ctx, &url, StatusCode::OK, Some(&params[..]))
            .await?;

        response
            .result
            .cpes
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("{CPE_KEY_PREFIX}{uri}")))
    }
}

/// Split a CPE 2.2 or 2.3 URI into its named components.
///
/// The whole input must be a CPE URI. Components absent from the URI map
/// to an empty string.
pub fn extract_cpe(cpeuri: &str) -> Result<HashMap<String, String>> {
    let captures = CPE_REGEX.captures(cpeuri).ok_or_else(|| Error::InvalidCpe {
        uri: cpeuri.to_string(),
    })?;

    Ok(CPE_COMPONENTS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = captures.get(i + 1).map_or("", |m| m.as_str());
            (name.to_string(), value.to_string())
        })
        .collect())
}
