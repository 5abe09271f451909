//! Core record types for the contraction log
//!
//! This module defines the fundamental data structures used throughout the
//! application: a completed contraction measurement, its classification and
//! the severity attached to alerts.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Timestamp type: milliseconds since the Unix epoch
pub type EpochMillis = i64;

/// Minimum duration in seconds for a contraction to count as valid
pub const VALID_THRESHOLD_SECS: u64 = 60;

/// Milliseconds in one minute, used for interval arithmetic
pub const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> EpochMillis {
    Utc::now().timestamp_millis()
}

/// Classification of a completed contraction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContractionType {
    /// Lasted at least one minute; counts towards interval and alert math
    Valid,
    /// Shorter than one minute; recorded but ignored by the alert heuristics
    Prodromal,
}

impl ContractionType {
    /// Classify a duration given in whole seconds
    pub fn classify(duration_sec: u64) -> Self {
        if duration_sec >= VALID_THRESHOLD_SECS {
            ContractionType::Valid
        } else {
            ContractionType::Prodromal
        }
    }

    /// Label used in history tables
    pub fn label(&self) -> &'static str {
        match self {
            ContractionType::Valid => "Valid",
            ContractionType::Prodromal => "Prodromal",
        }
    }
}

/// Severity level attached to an alert, used by the display for styling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No actionable pattern yet
    Ok,
    /// Pattern worth watching
    Warn,
    /// Pattern that warrants heading to care
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warn => "warn",
            Severity::Danger => "danger",
        }
    }
}

/// One completed timing measurement
///
/// Records are immutable: the duration and classification are derived from
/// the timestamps on construction and cannot be set independently. Decoding
/// from JSON goes through the same derivation, so a stored `type` that
/// disagrees with its duration is corrected on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "StoredRecord")]
pub struct ContractionRecord {
    start: EpochMillis,
    end: EpochMillis,
    #[serde(rename = "durationSec")]
    duration_sec: u64,
    #[serde(rename = "type")]
    kind: ContractionType,
}

/// Wire shape of a record as persisted or exported
///
/// The stored `type` key is ignored and re-derived from the duration.
#[derive(Deserialize)]
struct StoredRecord {
    start: EpochMillis,
    end: EpochMillis,
    #[serde(rename = "durationSec")]
    duration_sec: u64,
}

impl From<StoredRecord> for ContractionRecord {
    fn from(stored: StoredRecord) -> Self {
        Self {
            start: stored.start,
            end: stored.end,
            duration_sec: stored.duration_sec,
            kind: ContractionType::classify(stored.duration_sec),
        }
    }
}

impl ContractionRecord {
    /// Build a record from the start and end of a timing
    ///
    /// # Arguments
    ///
    /// * `start` - When timing began (epoch milliseconds)
    /// * `end` - When timing stopped (epoch milliseconds)
    ///
    /// An `end` earlier than `start` is accepted and yields a zero duration,
    /// which classifies as prodromal.
    pub fn new(start: EpochMillis, end: EpochMillis) -> Self {
        let duration_sec = rounded_seconds(end.saturating_sub(start));
        Self {
            start,
            end,
            duration_sec,
            kind: ContractionType::classify(duration_sec),
        }
    }

    pub fn start(&self) -> EpochMillis {
        self.start
    }

    pub fn end(&self) -> EpochMillis {
        self.end
    }

    pub fn duration_sec(&self) -> u64 {
        self.duration_sec
    }

    pub fn kind(&self) -> ContractionType {
        self.kind
    }

    pub fn is_valid(&self) -> bool {
        self.kind == ContractionType::Valid
    }
}

/// Round an elapsed millisecond span to whole seconds, halves rounding up
fn rounded_seconds(elapsed_ms: i64) -> u64 {
    if elapsed_ms <= 0 {
        return 0;
    }
    (elapsed_ms.saturating_add(500) / 1000) as u64
}

/// Start-to-start interval in minutes between two records
pub fn interval_minutes(earlier: &ContractionRecord, later: &ContractionRecord) -> f64 {
    later.start.saturating_sub(earlier.start) as f64 / MILLIS_PER_MINUTE
}

/// Interval between the two most recent valid records of a slice
///
/// Prodromal records between them are ignored. Returns `None` when fewer
/// than two valid records are present.
pub fn last_valid_interval(records: &[ContractionRecord]) -> Option<f64> {
    let mut valid = records.iter().rev().filter(|r| r.is_valid());
    let last = valid.next()?;
    let second_last = valid.next()?;
    Some(interval_minutes(second_last, last))
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn prop_classification_matches_threshold(duration: u64) -> bool {
        let expected = if duration >= VALID_THRESHOLD_SECS {
            ContractionType::Valid
        } else {
            ContractionType::Prodromal
        };
        ContractionType::classify(duration) == expected
    }

    #[quickcheck]
    fn prop_record_type_follows_duration(start: u32, elapsed: u32) -> bool {
        let start = start as i64;
        let record = ContractionRecord::new(start, start + elapsed as i64);
        record.kind() == ContractionType::classify(record.duration_sec())
            && record.duration_sec() == ((elapsed as u64) + 500) / 1000
    }

    #[quickcheck]
    fn prop_decoded_record_matches_original(start: u32, elapsed: u32) -> bool {
        let start = start as i64;
        let record = ContractionRecord::new(start, start + elapsed as i64);
        let json = serde_json::to_string(&record).unwrap();
        serde_json::from_str::<ContractionRecord>(&json).unwrap() == record
    }
}
