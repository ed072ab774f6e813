//! HPC Job Client
//!
//! A client-side handle to jobs managed by a remote compute gateway.
//!
//! The gateway owns every job; this crate creates, configures, submits and
//! observes them over HTTP. Completion is discovered by polling the job's
//! event stream, and a finished job's result folder can be pulled down through
//! the gateway's managed-transfer endpoints.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hpcjob_client::{EventFilter, GatewayClient, JobBuilder};
//! use hpcjob_core::domain::job::JobConfiguration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = Arc::new(GatewayClient::new("https://gateway.example.org"));
//!
//!     let mut job = JobBuilder::new(gateway)
//!         .maintainer("community_contribution")
//!         .auth_token("hub-token")
//!         .create()
//!         .await?;
//!
//!     job.configure(JobConfiguration::new().param("input", "data.csv"))
//!         .await?;
//!     job.submit().await?;
//!
//!     let outcome = job.follow_events(EventFilter::Basic).await?;
//!     println!("job {} failed: {}", job.id(), outcome.is_failed());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
mod folders;
mod gateway;
pub mod job;
mod jobs;
pub mod poll;
pub mod render;
pub mod transfer;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use gateway::Gateway;
pub use job::{EventFilter, Job, JobBuilder, PollSettings};
pub use poll::{PollOptions, poll_until_terminal};
pub use render::{NullRenderer, Renderer, TerminalRenderer};
pub use transfer::{TransferMonitor, TransferRequest, WaitMode};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the compute gateway API
///
/// Methods are grouped by resource:
/// - Job lifecycle (create, get, submit, update, result listing)
/// - Folder transfers (managed-transfer init and status)
#[derive(Debug, Clone)]
pub struct GatewayClient {
    /// Base URL of the gateway (e.g., "https://gateway.example.org")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the gateway API
    ///
    /// # Example
    /// ```
    /// use hpcjob_client::GatewayClient;
    ///
    /// let client = GatewayClient::new("http://localhost:3030");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a new gateway client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use hpcjob_client::GatewayClient;
    /// use reqwest::{Client, Url};
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = GatewayClient::with_client("http://localhost:3030", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the gateway
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL under the base URL, escaping each segment
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::Configuration(format!("invalid gateway URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Configuration(format!(
                    "gateway URL {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-2xx responses become [`ClientError::ApiError`] carrying the
    /// gateway's message.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::from_body(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GatewayClient::new("http://localhost:3030");
        assert_eq!(client.base_url(), "http://localhost:3030");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GatewayClient::new("http://localhost:3030/");
        assert_eq!(client.base_url(), "http://localhost:3030");
    }

    #[test]
    fn test_endpoint_escapes_each_segment() {
        let client = GatewayClient::new("http://localhost:3030");
        let url = client
            .endpoint(&["folder", "/scratch/out", "download", "globus-init"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3030/folder/%2Fscratch%2Fout/download/globus-init"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = GatewayClient::new("https://gateway.example.org/api/");
        let url = client.endpoint(&["job", "j1", "submit"]).unwrap();
        assert_eq!(url.as_str(), "https://gateway.example.org/api/job/j1/submit");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let client = GatewayClient::new("not a url");
        let err = client.endpoint(&["job"]).unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let client = GatewayClient::with_client("http://localhost:3030", http_client);
        assert_eq!(client.base_url(), "http://localhost:3030");
    }
}
