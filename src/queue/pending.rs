use crate::domain::Reading;

/// FIFO queue of undelivered readings, oldest first.
///
/// Capacity is bounded by `max_pending`; overflow is shed from the front
/// (oldest first) so sustained network outages cost the stalest samples,
/// never the freshest. This trim is the only data-loss path in normal
/// operation.
#[derive(Debug)]
pub struct PendingQueue {
    entries: Vec<Reading>,
    max_pending: usize,
}

impl PendingQueue {
    pub fn new(max_pending: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_pending: max_pending.max(1),
        }
    }

    /// Rebuilds a queue from previously persisted entries.
    pub fn from_entries(entries: Vec<Reading>, max_pending: usize) -> Self {
        Self {
            entries,
            max_pending: max_pending.max(1),
        }
    }

    pub fn push(&mut self, reading: Reading) {
        self.entries.push(reading);
    }

    /// Drops oldest entries until the queue fits `max_pending` again.
    /// Returns the number of readings shed.
    pub fn enforce_limit(&mut self) -> usize {
        if self.entries.len() <= self.max_pending {
            return 0;
        }
        let drop_count = self.entries.len() - self.max_pending;
        self.entries.drain(..drop_count);
        drop_count
    }

    /// Removes the delivered prefix after a (partially) successful flush.
    pub fn remove_delivered(&mut self, sent: usize) {
        let sent = sent.min(self.entries.len());
        self.entries.drain(..sent);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    /// Undelivered readings in enqueue order.
    pub fn entries(&self) -> &[Reading] {
        &self.entries
    }
}
