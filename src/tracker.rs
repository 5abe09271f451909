//! Contraction tracker
//!
//! Couples the in-memory ContractionLog with a HistoryStore. Every mutation
//! requests persistence of the full history; save failures are logged and
//! never surface to the caller.

use crate::alerts::Alert;
use crate::history::ContractionLog;
use crate::records::{ContractionRecord, EpochMillis};
use crate::storage::{HistoryStore, LoadOutcome};
use log::{error, info, warn};

/// Owner of the contraction history and its persistence
pub struct ContractionTracker {
    log: ContractionLog,
    store: Box<dyn HistoryStore>,
}

impl ContractionTracker {
    /// Open a tracker, loading whatever history the store holds
    ///
    /// Malformed persisted state starts an empty history.
    pub fn open(store: Box<dyn HistoryStore>) -> Self {
        let records = match store.load() {
            LoadOutcome::Loaded(records) => {
                info!("Loaded {} contractions", records.len());
                records
            }
            LoadOutcome::Missing => {
                info!("No saved history, starting empty");
                Vec::new()
            }
            LoadOutcome::Fallback { reason } => {
                warn!("Saved history unusable, starting empty: {}", reason);
                Vec::new()
            }
        };

        Self {
            log: ContractionLog::from_records(records),
            store,
        }
    }

    /// Record a completed timing and persist the updated history
    pub fn record(&mut self, start: EpochMillis, end: EpochMillis) -> ContractionRecord {
        let record = self.log.record(start, end).clone();
        self.persist();
        record
    }

    /// Clear the history and persist the empty list
    pub fn clear(&mut self) {
        self.log.clear();
        self.persist();
    }

    pub fn log(&self) -> &ContractionLog {
        &self.log
    }

    /// Evaluate alerts as of `now`
    pub fn alert(&self, now: EpochMillis) -> Alert {
        self.log.evaluate_alerts(now)
    }

    /// Pretty-printed JSON snapshot of the history
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.log.export_json()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(self.log.records()) {
            error!("Failed to save history: {}", e);
        }
    }
}
