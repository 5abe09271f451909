//! File-backed history store
//!
//! Persists the history as a single JSON array. Reads never fail: anything
//! that does not decode into a list of records is reported as a fallback and
//! treated as an empty history.

use crate::error::StorageError;
use crate::records::ContractionRecord;
use crate::storage::{HistoryStore, LoadOutcome};
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// History store backed by a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the given file path
    ///
    /// The file and its parent directories are created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode raw file contents into records
    fn decode(raw: &str) -> LoadOutcome {
        if raw.trim().is_empty() {
            return LoadOutcome::Missing;
        }
        match serde_json::from_str::<Vec<ContractionRecord>>(raw) {
            Ok(records) => LoadOutcome::Loaded(records),
            Err(e) => LoadOutcome::Fallback {
                reason: format!("history parse failed: {}", e),
            },
        }
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> LoadOutcome {
        let outcome = match fs::read_to_string(&self.path) {
            Ok(raw) => Self::decode(&raw),
            Err(e) if e.kind() == ErrorKind::NotFound => LoadOutcome::Missing,
            Err(e) => LoadOutcome::Fallback {
                reason: format!("history read failed: {}", e),
            },
        };

        match &outcome {
            LoadOutcome::Loaded(records) => debug!(
                "Loaded {} records from {}",
                records.len(),
                self.path.display()
            ),
            LoadOutcome::Missing => debug!("No history at {}", self.path.display()),
            LoadOutcome::Fallback { reason } => debug!(
                "Unusable history at {}: {}",
                self.path.display(),
                reason
            ),
        }

        outcome
    }

    fn save(&self, records: &[ContractionRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(records)?;

        // Write a sibling file first so a crash never leaves a truncated history.
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        fs::write(&tmp_path, json)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
