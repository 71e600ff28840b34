use crate::domain::Reading;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Crash-safe storage for the pending queue: one JSON array of readings,
/// always replaced atomically so a reader observes either the previous or
/// the new content, never a truncated mix.
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted queue. A missing, unreadable or malformed file
    /// is treated as a fresh start, never a fatal error.
    pub fn load(&self) -> Vec<Reading> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), "Failed to read queue file; starting empty: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Vec<Reading>>(&bytes) {
            Ok(entries) => {
                debug!(
                    path = %self.path.display(),
                    count = entries.len(),
                    "Loaded pending readings from disk"
                );
                entries
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Queue file is not a reading array; starting empty: {e}");
                Vec::new()
            }
        }
    }

    /// Atomically replaces the queue file with the given entries: write to
    /// a temp file in the target directory, fsync, rename over the target.
    /// On failure the previous file is untouched and the temp file is
    /// cleaned up on drop.
    pub fn persist(&self, entries: &[Reading]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::with_prefix_in(".pending_readings_", dir)?;
        serde_json::to_writer(&mut temp, entries)?;
        temp.flush()?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            path = %self.path.display(),
            count = entries.len(),
            "Persisted pending readings"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(n: u64) -> Reading {
        [("seq", n)].into_iter().collect()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = QueueStore::new(dir.path().join("pending_readings.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn persist_creates_missing_parent_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = QueueStore::new(dir.path().join("state/queue/pending_readings.json"));

        store.persist(&[reading(1)]).unwrap();
        assert_eq!(store.load(), vec![reading(1)]);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pending_readings.json");
        fs::write(&path, b"{\"not\": \"an array\"").unwrap();

        let store = QueueStore::new(&path);
        assert!(store.load().is_empty());
    }
}
