use crate::domain::Reading;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Collector returned status {status}")]
    Http { status: StatusCode },
    #[error("Request timeout")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// HTTP client for the remote collector's ingest endpoints.
///
/// Its public contract is total: `post_single` and `post_batch` always
/// return a boolean, never an error. Internally every request resolves to
/// an explicit `Result` so failures carry a diagnostic into the log line.
/// No retry happens here; unsent readings stay queued upstream.
#[derive(Debug, Clone)]
pub struct IngestClient {
    client: Client,
    ingest_url: Url,
    batch_url: Url,
    api_key: String,
}

impl IngestClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        let base = base_url.trim_end_matches('/');
        let ingest_url = format!("{base}/api/ingest")
            .parse::<Url>()
            .map_err(|e| DeliveryError::InvalidConfiguration(format!("Invalid base URL: {e}")))?;
        let batch_url = format!("{base}/api/ingest/batch")
            .parse::<Url>()
            .map_err(|e| DeliveryError::InvalidConfiguration(format!("Invalid base URL: {e}")))?;

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("enviro-forwarder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DeliveryError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            ingest_url,
            batch_url,
            api_key: api_key.to_string(),
        })
    }

    /// Submits exactly one reading to the single-item endpoint.
    pub async fn post_single(&self, reading: &Reading) -> bool {
        let result = self.post_json(&self.ingest_url, reading).await;
        self.outcome(result, 1)
    }

    /// Submits a sequence of readings to the batch endpoint as one request
    /// body, in queue order.
    pub async fn post_batch(&self, readings: &[Reading]) -> bool {
        let result = self.post_json(&self.batch_url, &readings).await;
        self.outcome(result, readings.len())
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &Url,
        payload: &T,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url.clone())
            .header("X-API-Key", &self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Network(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Http { status })
        }
    }

    fn outcome(&self, result: Result<(), DeliveryError>, count: usize) -> bool {
        match result {
            Ok(()) => {
                debug!(count, "Delivered readings to collector");
                true
            }
            Err(DeliveryError::Http { status }) => {
                warn!(%status, "Collector returned non-2xx status");
                false
            }
            Err(DeliveryError::Timeout) => {
                warn!("Collector request timed out");
                false
            }
            Err(e) => {
                warn!("Collector request failed: {e}");
                false
            }
        }
    }
}
