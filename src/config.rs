use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::LogLevel;
use crate::error::{Error, Result};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "CIRCL_CLIENT_CONFIG";

const CONFIG_DIR_NAME: &str = "circl-cve-client";
const CONFIG_FILE_NAME: &str = "config.json";

/// Endpoints and request settings used by [`ServiceClient`](crate::ServiceClient).
///
/// Every field has a default pointing at the public services, so a
/// configuration file only needs to name the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the CIRCL CVE Search API.
    pub circl_base_url: String,
    /// Base URL of the NVD REST API.
    pub nvd_base_url: String,
    /// CVE lookup path, joined with the CVE id.
    pub cve_path: String,
    /// CWE enumeration path.
    pub cwe_path: String,
    /// CAPEC lookup path, joined with the bare CAPEC number.
    pub capec_path: String,
    /// NVD CPE match endpoint.
    pub cpe_path: String,
    /// Value of the `User-Agent` header. CIRCL rejects requests without the
    /// header, so it is always sent, even when empty.
    pub user_agent: String,
    pub log_level: LogLevel,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            circl_base_url: "https://cve.circl.lu/api".to_string(),
            nvd_base_url: "https://services.nvd.nist.gov/rest/json".to_string(),
            cve_path: "/cve/".to_string(),
            cwe_path: "/cwe".to_string(),
            capec_path: "/capec/".to_string(),
            cpe_path: "/cpes/1.0".to_string(),
            user_agent: String::new(),
            log_level: LogLevel::default(),
        }
    }
}

impl ClientConfig {
    /// Point both services at the same base URL, e.g. a mock server.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            circl_base_url: base_url.to_string(),
            nvd_base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Load the configuration named by `CIRCL_CLIENT_CONFIG`, or the user
    /// config file, falling back to defaults when neither exists.
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            details: format!("failed to read file: {e}"),
        })?;
        serde_json::from_str(&contents).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            details: format!("invalid JSON: {e}"),
        })
    }
}

/// `<config dir>/circl-cve-client/config.json`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push(CONFIG_DIR_NAME);
    path.push(CONFIG_FILE_NAME);
    Some(path)
}
