//! Ordered contraction history
//!
//! This module provides the ContractionLog, the single owner of the recorded
//! contractions. It is append-only apart from an explicit full clear.

use crate::alerts::{Alert, AlertEngine};
use crate::records::{last_valid_interval, ContractionRecord, ContractionType, EpochMillis};
use log::{debug, info};

/// In-memory contraction history in recording order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractionLog {
    records: Vec<ContractionRecord>,
    engine: AlertEngine,
}

impl ContractionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log from previously persisted records
    ///
    /// # Arguments
    ///
    /// * `records` - Records in their original recording order
    pub fn from_records(records: Vec<ContractionRecord>) -> Self {
        Self {
            records,
            engine: AlertEngine::new(),
        }
    }

    /// Record a completed timing and return the stored record
    ///
    /// # Arguments
    ///
    /// * `start` - When timing began (epoch milliseconds)
    /// * `end` - When timing stopped (epoch milliseconds)
    pub fn record(&mut self, start: EpochMillis, end: EpochMillis) -> &ContractionRecord {
        let record = ContractionRecord::new(start, end);
        debug!(
            "Recorded {} contraction of {}s",
            record.kind().label().to_lowercase(),
            record.duration_sec()
        );
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Remove every record
    pub fn clear(&mut self) {
        info!("Clearing {} recorded contractions", self.records.len());
        self.records.clear();
    }

    /// All records in recording order
    pub fn records(&self) -> &[ContractionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of valid contractions
    pub fn valid_count(&self) -> usize {
        self.count_of(ContractionType::Valid)
    }

    /// Number of prodromal contractions
    pub fn prodromal_count(&self) -> usize {
        self.count_of(ContractionType::Prodromal)
    }

    fn count_of(&self, kind: ContractionType) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }

    /// Start-to-start interval in minutes between the two latest valid contractions
    pub fn last_valid_interval(&self) -> Option<f64> {
        last_valid_interval(&self.records)
    }

    /// Evaluate the alert heuristics as of `now`
    pub fn evaluate_alerts(&self, now: EpochMillis) -> Alert {
        self.engine.evaluate(&self.records, now)
    }

    /// Serialize the full history as pretty-printed JSON
    ///
    /// The output decodes back to exactly the current records.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.records)
    }
}
