use super::client::{DeliveryError, IngestClient};
use super::ReadingSink;
use crate::domain::Reading;
use crate::queue::{PendingQueue, QueueStore};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct TransmitterConfig {
    pub base_url: String,
    pub api_key: String,
    pub queue_file: PathBuf,
    pub batch_size: usize,
    pub timeout: Duration,
    pub max_pending: usize,
}

impl Default for TransmitterConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            queue_file: PathBuf::from("pending_readings.json"),
            batch_size: 100,
            timeout: Duration::from_secs(5),
            max_pending: 5000,
        }
    }
}

/// Durable outbound delivery queue: best-effort, crash-safe, at-least-once
/// delivery of readings to the remote collector.
///
/// The transmitter exclusively owns the pending queue and its on-disk file.
/// `send`/`flush` never raise; every network or storage fault degrades to a
/// boolean outcome plus a log line, and undelivered readings stay queued
/// for the next cycle. The queue is the retry mechanism, not the caller.
#[derive(Debug)]
pub struct BackendTransmitter {
    client: IngestClient,
    store: QueueStore,
    queue: PendingQueue,
    batch_size: usize,
}

impl BackendTransmitter {
    pub fn new(config: TransmitterConfig) -> Result<Self, DeliveryError> {
        if config.base_url.is_empty() {
            return Err(DeliveryError::InvalidConfiguration(
                "Backend base URL is required".to_string(),
            ));
        }
        if config.api_key.is_empty() {
            return Err(DeliveryError::InvalidConfiguration(
                "Ingest API key is required".to_string(),
            ));
        }

        let client = IngestClient::new(&config.base_url, &config.api_key, config.timeout)?;
        let store = QueueStore::new(config.queue_file);
        let queue = PendingQueue::from_entries(store.load(), config.max_pending);

        if !queue.is_empty() {
            info!(
                pending = queue.len(),
                "Recovered undelivered readings from previous run"
            );
        }

        Ok(Self {
            client,
            store,
            queue,
            batch_size: config.batch_size.max(1),
        })
    }

    /// Accepts a new reading: append, shed overflow, persist, then attempt
    /// a flush. Returns `true` iff the queue ended up fully delivered.
    pub async fn send(&mut self, reading: Reading) -> bool {
        self.queue.push(reading);

        let dropped = self.queue.enforce_limit();
        if dropped > 0 {
            warn!(dropped, "Pending queue exceeded limit; dropping oldest readings");
        }

        self.persist_queue();
        self.flush().await
    }

    /// Attempts to deliver everything currently queued, oldest first.
    ///
    /// A single entry goes to the single-item endpoint; two or more are
    /// partitioned into chunks of at most `batch_size` and submitted in
    /// order, stopping at the first failed chunk. The delivered prefix is
    /// removed and the remainder waits for the next flush.
    pub async fn flush(&mut self) -> bool {
        if self.queue.is_empty() {
            return true;
        }

        if self.queue.len() == 1 {
            if !self.client.post_single(&self.queue.entries()[0]).await {
                return false;
            }
            self.queue.clear();
            self.persist_queue();
            return true;
        }

        let mut sent = 0;
        for chunk in self.queue.entries().chunks(self.batch_size) {
            if !self.client.post_batch(chunk).await {
                break;
            }
            sent += chunk.len();
        }

        if sent > 0 {
            self.queue.remove_delivered(sent);
            self.persist_queue();
        }

        self.queue.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    // Persistence failure is non-fatal: the in-memory queue stays
    // authoritative for this process's lifetime.
    fn persist_queue(&self) {
        if let Err(e) = self.store.persist(self.queue.entries()) {
            warn!("Failed to persist pending queue: {e}");
        }
    }
}

impl ReadingSink for BackendTransmitter {
    async fn submit(&mut self, reading: Reading) -> bool {
        self.send(reading).await
    }
}
