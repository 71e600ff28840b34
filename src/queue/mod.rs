pub mod pending;
pub mod store;

pub use pending::PendingQueue;
pub use store::{QueueStore, StoreError};
