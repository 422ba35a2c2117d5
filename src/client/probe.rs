//! Probe HTTP client
//!
//! Issues GET requests against the simulated endpoint service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::types::CallStatus;
use crate::config::TargetConfig;
use crate::plans::Endpoint;

/// Upper bound on a single call, so a hung service surfaces as a transport error
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when calling the service
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type for probe client operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Seam between workers and the transport they call through
///
/// A call never fails from the worker's point of view: every error is folded
/// into [`CallStatus::Transport`].
#[async_trait]
pub trait Probe: Send + Sync {
    /// Issue one call against the endpoint
    async fn call(&self, endpoint: Endpoint) -> CallStatus;
}

/// Client for the simulated endpoint service
///
/// # Example
/// ```no_run
/// use synthtraffic::client::ProbeClient;
/// use synthtraffic::plans::Endpoint;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ProbeClient::new("http://localhost:8080")?;
/// let (status, body) = client.get(Endpoint::Health).await?;
/// println!("{status}: {body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProbeClient {
    /// Base URL of the service (e.g., http://localhost:8080)
    base_url: Url,
    /// HTTP client for making requests
    client: Client,
}

impl ProbeClient {
    /// Create a new client for the given base URL
    pub fn new(base_url: &str) -> ProbeResult<Self> {
        Self::from_url(Url::parse(base_url)?)
    }

    /// Create a client targeting a resolved configuration
    pub fn for_target(target: &TargetConfig) -> ProbeResult<Self> {
        Self::from_url(target.base_url().clone())
    }

    fn from_url(base_url: Url) -> ProbeResult<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { base_url, client })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of an endpoint
    pub fn endpoint_url(&self, endpoint: Endpoint) -> ProbeResult<Url> {
        Ok(self.base_url.join(endpoint.path())?)
    }

    /// GET an endpoint, returning its status and body whatever the status is
    ///
    /// Once a status line has arrived the call counts as answered; a body
    /// that fails to read is replaced by an empty one.
    pub async fn get(&self, endpoint: Endpoint) -> ProbeResult<(StatusCode, String)> {
        let url = self.endpoint_url(endpoint)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_else(|e| {
            warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                error = %e,
                "Failed to read response body"
            );
            String::new()
        });
        Ok((status, body))
    }
}

#[async_trait]
impl Probe for ProbeClient {
    async fn call(&self, endpoint: Endpoint) -> CallStatus {
        match self.get(endpoint).await {
            Ok((status, body)) => CallStatus::Response {
                status: status.as_u16(),
                body,
            },
            Err(e) => CallStatus::transport(e.to_string()),
        }
    }
}
