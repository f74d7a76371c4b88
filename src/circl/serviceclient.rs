use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::LogLevel;
use crate::config::ClientConfig;
use crate::context::Context;
use crate::error::{Error, Result};

/// HTTP client for the CIRCL CVE Search and NVD CPE APIs.
///
/// Domain lookups (`get_cve`, `get_cwes`, ...) live next to their record
/// types; this type owns the connection and the request plumbing.
pub struct ServiceClient {
    client: Client,
    config: ClientConfig,
}

impl ServiceClient {
    /// Create a client with its own connection pool.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a client that reuses an existing `reqwest::Client`.
    pub fn with_client(client: Client, mut config: ClientConfig) -> Self {
        config.circl_base_url = config.circl_base_url.trim_end_matches('/').to_string();
        config.nvd_base_url = config.nvd_base_url.trim_end_matches('/').to_string();
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn log_level(&self) -> LogLevel {
        self.config.log_level
    }

    /// CIRCL URL for `path`, optionally followed by a percent-encoded
    /// identifier.
    pub(crate) fn circl_url(&self, path: &str, id: &str) -> String {
        format!(
            "{}{}{}",
            self.config.circl_base_url,
            path,
            urlencoding::encode(id)
        )
    }

    pub(crate) fn nvd_url(&self, path: &str) -> String {
        format!("{}{}", self.config.nvd_base_url, path)
    }

    /// GET `path` and return the response body.
    ///
    /// Fails with `UnexpectedStatus` when the status differs from
    /// `expected`, and with `Cancelled` when `ctx` ends first.
    pub async fn fetch(
        &self,
        ctx: &Context,
        path: &str,
        expected: StatusCode,
        params: Option<&[(&str, &str)]>,
    ) -> Result<String> {
        let url = build_url(path, params);

        if matches!(self.log_level(), LogLevel::Debug) {
            log::debug!("GET {}", url);
        }

        ctx.run(self.get(&url, expected)).await
    }

    async fn get(&self, url: &str, expected: StatusCode) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, self.config.user_agent.as_str())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();

        if matches!(self.log_level(), LogLevel::Debug) {
            log::debug!("{} -> {}", url, status);
        }

        if status != expected {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }

    /// GET `path` and decode the JSON body into `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        path: &str,
        expected: StatusCode,
        params: Option<&[(&str, &str)]>,
    ) -> Result<T> {
        let body = self.fetch(ctx, path, expected, params).await?;
        decode_json(&body)
    }
}

/// Append URL-encoded query parameters; `None` leaves `path` untouched.
pub(crate) fn build_url(path: &str, params: Option<&[(&str, &str)]>) -> String {
    let Some(params) = params else {
        return path.to_string();
    };

    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let mut url = path.to_string();
    url.push('?');
    url.push_str(&query);
    url
}

/// Decode a response body. Unknown fields are ignored.
pub(crate) fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_without_params() {
        assert_eq!(
            build_url("https://cve.circl.lu/api/cwe", None),
            "https://cve.circl.lu/api/cwe"
        );
    }

    #[test]
    fn test_build_url_encodes_params() {
        let url = build_url(
            "https://nvd.example/cpes/1.0",
            Some(&[("addOns", "cves"), ("cpeMatchString", "cpe:/a:openbsd:openssh:7.5")][..]),
        );
        assert_eq!(
            url,
            "https://nvd.example/cpes/1.0?addOns=cves&cpeMatchString=cpe%3A%2Fa%3Aopenbsd%3Aopenssh%3A7.5"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ServiceClient::new(ClientConfig::with_base_url("http://localhost:1234/"));
        assert_eq!(client.circl_url("/cve/", "CVE-1"), "http://localhost:1234/cve/CVE-1");
        assert_eq!(client.nvd_url("/cpes/1.0"), "http://localhost:1234/cpes/1.0");
    }

    #[test]
    fn test_circl_url_encodes_id() {
        let client = ServiceClient::new(ClientConfig::with_base_url("http://localhost:1234"));
        assert_eq!(
            client.circl_url("/cve/", "CVE-1/../x?y#z"),
            "http://localhost:1234/cve/CVE-1%2F..%2Fx%3Fy%23z"
        );
        assert_eq!(client.circl_url("/cwe", ""), "http://localhost:1234/cwe");
    }

    #[derive(Debug, serde::Deserialize)]
    struct Shape {
        id: String,
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let shape: Shape = decode_json(r#"{"id": "13", "extra": [1, 2]}"#).unwrap();
        assert_eq!(shape.id, "13");
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let err = decode_json::<Shape>(r#"{"id": 13}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
