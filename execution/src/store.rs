//! History persistence collaborator.

use std::sync::{Arc, Mutex};

use shadowflight_types::HistoryEntry;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("history store i/o failed: {0}")]
    Io(String),
    #[error("history encoding failed: {0}")]
    Encoding(String),
}

/// Loads and saves the detailed history, newest-first.
///
/// Every save replaces the whole stored sequence.
pub trait HistoryStore {
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError>;
    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError>;
}

/// Store that keeps the last saved sequence in memory.
///
/// Clones share the same contents, so a test can hold one handle while the
/// game owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            saves: Arc::default(),
        }
    }

    /// Snapshot of the stored sequence.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves.lock().map(|saves| *saves).unwrap_or(0)
    }
}

impl HistoryStore for MemoryStore {
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|err| StoreError::Io(err.to_string()))
    }

    fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), StoreError> {
        let mut stored = self
            .entries
            .lock()
            .map_err(|err| StoreError::Io(err.to_string()))?;
        *stored = entries.to_vec();
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }
}

/// Store that discards everything; nothing persists between runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStore;

impl HistoryStore for NullStore {
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(Vec::new())
    }

    fn save(&mut self, _entries: &[HistoryEntry]) -> Result<(), StoreError> {
        Ok(())
    }
}
