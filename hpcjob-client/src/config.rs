//! Client configuration
//!
//! Gateway location and the timing of every polling loop the client runs.

use std::time::Duration;

use crate::GatewayClient;
use crate::job::PollSettings;

/// Client configuration
///
/// Intervals are configurable so notebooks, scripts and tests can trade
/// freshness for request volume.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway base URL (e.g., "https://gateway.example.org")
    pub gateway_url: String,

    /// How often event followers refetch the job
    pub event_refresh_interval: Duration,

    /// How often log followers refetch the job
    pub log_refresh_interval: Duration,

    /// How often a running result transfer is polled
    pub transfer_poll_interval: Duration,

    /// Deadline for any single polling loop; `None` waits indefinitely
    pub poll_timeout: Option<Duration>,

    /// Per-request HTTP timeout
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new configuration with defaults
    pub fn new(gateway_url: String) -> Self {
        Self {
            gateway_url,
            event_refresh_interval: Duration::from_secs(10),
            log_refresh_interval: Duration::from_secs(15),
            transfer_poll_interval: Duration::from_secs(5),
            poll_timeout: None,
            request_timeout: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HPCJOB_GATEWAY_URL (required)
    /// - HPCJOB_EVENT_REFRESH_SECS (optional, default: 10)
    /// - HPCJOB_LOG_REFRESH_SECS (optional, default: 15)
    /// - HPCJOB_TRANSFER_POLL_SECS (optional, default: 5)
    /// - HPCJOB_POLL_TIMEOUT_SECS (optional, default: none)
    /// - HPCJOB_REQUEST_TIMEOUT_SECS (optional, default: none)
    pub fn from_env() -> anyhow::Result<Self> {
        let gateway_url = std::env::var("HPCJOB_GATEWAY_URL")
            .map_err(|_| anyhow::anyhow!("HPCJOB_GATEWAY_URL environment variable not set"))?;

        let defaults = Self::new(gateway_url);

        let config = Self {
            event_refresh_interval: secs_from_env("HPCJOB_EVENT_REFRESH_SECS")
                .unwrap_or(defaults.event_refresh_interval),
            log_refresh_interval: secs_from_env("HPCJOB_LOG_REFRESH_SECS")
                .unwrap_or(defaults.log_refresh_interval),
            transfer_poll_interval: secs_from_env("HPCJOB_TRANSFER_POLL_SECS")
                .unwrap_or(defaults.transfer_poll_interval),
            poll_timeout: secs_from_env("HPCJOB_POLL_TIMEOUT_SECS"),
            request_timeout: secs_from_env("HPCJOB_REQUEST_TIMEOUT_SECS"),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Sets a deadline for polling loops
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gateway_url.is_empty() {
            anyhow::bail!("gateway_url cannot be empty");
        }

        if !self.gateway_url.starts_with("http://") && !self.gateway_url.starts_with("https://") {
            anyhow::bail!("gateway_url must start with http:// or https://");
        }

        if self.event_refresh_interval.is_zero() {
            anyhow::bail!("event_refresh_interval must be greater than 0");
        }

        if self.log_refresh_interval.is_zero() {
            anyhow::bail!("log_refresh_interval must be greater than 0");
        }

        if self.transfer_poll_interval.is_zero() {
            anyhow::bail!("transfer_poll_interval must be greater than 0");
        }

        Ok(())
    }

    /// Builds the HTTP gateway client this configuration describes
    pub fn build_gateway(&self) -> anyhow::Result<GatewayClient> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(GatewayClient::with_client(
            self.gateway_url.clone(),
            http_client,
        ))
    }

    /// Polling intervals for job handles
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            event_refresh_interval: self.event_refresh_interval,
            log_refresh_interval: self.log_refresh_interval,
            transfer_poll_interval: self.transfer_poll_interval,
            timeout: self.poll_timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3030".to_string())
    }
}

fn secs_from_env(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
