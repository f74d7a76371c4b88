/// CIRCL and NVD record types and the service client that fetches them.
pub mod circl;
/// Client configuration loading.
pub mod config;
/// Cancellation and deadline propagation for requests.
pub mod context;
/// Error type shared by every operation.
pub mod error;

pub use circl::results::{Record, ResultEntry, ResultSet};
pub use circl::serviceclient::ServiceClient;
pub use config::ClientConfig;
pub use context::{CancelHandle, Context};
pub use error::{Error, Result};

/// Logging verbosity for client operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Log every request URL and response status.
    Debug,
    /// Log batch summaries only.
    Information,
}

impl Default for LogLevel {
    /// Defaults to `Information` logging.
    fn default() -> Self {
        LogLevel::Information
    }
}
