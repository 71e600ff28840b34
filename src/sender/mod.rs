pub mod client;
pub mod direct;
pub mod transmitter;

pub use client::{DeliveryError, IngestClient};
pub use direct::DirectSender;
pub use transmitter::{BackendTransmitter, TransmitterConfig};

use crate::domain::Reading;

/// The shared "deliver one reading" capability.
///
/// `BackendTransmitter` implements it with a durable queue behind it;
/// `DirectSender` is the queue-less single-shot variant. Both resolve to a
/// boolean outcome and never raise past this seam.
pub trait ReadingSink {
    fn submit(&mut self, reading: Reading) -> impl std::future::Future<Output = bool> + Send;
}
