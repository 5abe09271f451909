use crate::error::StorageError;
use crate::records::ContractionRecord;
use std::sync::Mutex;

/// Outcome of loading persisted history
///
/// Decode failures are not errors for the caller: they collapse to an empty
/// history, but the reason is kept so the boundary can log it.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// History decoded successfully
    Loaded(Vec<ContractionRecord>),
    /// Nothing has been persisted yet
    Missing,
    /// Persisted state was unreadable or malformed
    Fallback { reason: String },
}

impl LoadOutcome {
    /// Collapse the outcome to the records to start from
    pub fn into_records(self) -> Vec<ContractionRecord> {
        match self {
            LoadOutcome::Loaded(records) => records,
            LoadOutcome::Missing | LoadOutcome::Fallback { .. } => Vec::new(),
        }
    }
}

/// Key-value style persistence for the contraction history
#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore {
    /// Load the persisted history
    fn load(&self) -> LoadOutcome;

    /// Replace the persisted history with `records`
    fn save(&self, records: &[ContractionRecord]) -> Result<(), StorageError>;
}

/// History store kept in process memory
///
/// Used for dry runs and tests; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Option<Vec<ContractionRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `records`
    pub fn with_records(records: Vec<ContractionRecord>) -> Self {
        Self {
            records: Mutex::new(Some(records)),
        }
    }

    /// Records from the most recent save, if any
    pub fn snapshot(&self) -> Option<Vec<ContractionRecord>> {
        self.records.lock().ok().and_then(|guard| guard.clone())
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> LoadOutcome {
        match self.snapshot() {
            Some(records) => LoadOutcome::Loaded(records),
            None => LoadOutcome::Missing,
        }
    }

    fn save(&self, records: &[ContractionRecord]) -> Result<(), StorageError> {
        if let Ok(mut guard) = self.records.lock() {
            *guard = Some(records.to_vec());
        }
        Ok(())
    }
}
