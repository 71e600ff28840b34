use super::client::{DeliveryError, IngestClient};
use super::ReadingSink;
use crate::domain::Reading;
use std::time::Duration;

/// Queue-less transmitter variant: one reading in, one request out.
///
/// No durability and no batching; a failed delivery simply loses the
/// reading. Useful where the collector is on the same network segment and
/// the disk should stay quiet.
#[derive(Debug, Clone)]
pub struct DirectSender {
    client: IngestClient,
}

impl DirectSender {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, DeliveryError> {
        if base_url.is_empty() {
            return Err(DeliveryError::InvalidConfiguration(
                "Backend base URL is required".to_string(),
            ));
        }
        if api_key.is_empty() {
            return Err(DeliveryError::InvalidConfiguration(
                "Ingest API key is required".to_string(),
            ));
        }
        let client = IngestClient::new(base_url, api_key, timeout)?;
        Ok(Self { client })
    }

    pub async fn send(&self, reading: &Reading) -> bool {
        self.client.post_single(reading).await
    }
}

impl ReadingSink for DirectSender {
    async fn submit(&mut self, reading: Reading) -> bool {
        self.send(&reading).await
    }
}
