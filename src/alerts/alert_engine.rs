use crate::records::{interval_minutes, ContractionRecord, EpochMillis, Severity};
use log::debug;

/// Total valid contractions that raise a danger alert on their own
pub const TOTAL_VALID_DANGER: usize = 10;

/// Valid contractions required inside the trailing window for the 3-1-1 check
pub const WINDOW_VALID_MIN: usize = 15;

/// Trailing window length for the 3-1-1 check
pub const WINDOW_MILLIS: i64 = 60 * 60 * 1000;

/// Accepted median interval range for the 3-1-1 rule, in minutes
pub const MEDIAN_MIN_MINUTES: f64 = 2.5;
pub const MEDIAN_MAX_MINUTES: f64 = 3.5;

/// Total valid contractions that raise a watch warning
pub const WATCH_VALID_MIN: usize = 5;

pub const MSG_TEN_VALID: &str = "10 valid contractions reached";
pub const MSG_THREE_ONE_ONE: &str =
    "3-1-1 rule satisfied — contractions ~3 min apart, ≥1 min each, sustained ~1 hour";
pub const MSG_RHYTHM_INCREASING: &str = "rhythm increasing, monitor further";
pub const MSG_WATCH_PATTERN: &str = "5+ valid contractions recorded, watch for ~3/3 pattern over 1h";
pub const MSG_AWAITING: &str = "awaiting consistent pattern";

/// Result of an alert evaluation: one message and its severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub severity: Severity,
}

impl Alert {
    fn new(message: &str, severity: Severity) -> Self {
        Self {
            message: message.to_string(),
            severity,
        }
    }

    /// Alert shown while no pattern has been detected
    pub fn awaiting() -> Self {
        Self::new(MSG_AWAITING, Severity::Ok)
    }
}

/// Engine for evaluating the alert heuristics over a contraction history
///
/// Evaluation is stateless: every call recomputes the alert from the full
/// history, so there is no escalation memory between calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlertEngine;

impl AlertEngine {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate the alert heuristics against `records` as of `now`
    ///
    /// # Arguments
    ///
    /// * `records` - Full history in recording order
    /// * `now` - Reference instant (epoch milliseconds) for the trailing window
    ///
    /// # Returns
    ///
    /// Exactly one alert. Later checks overwrite earlier ones: a satisfied
    /// 3-1-1 rule replaces the ten-contraction message.
    pub fn evaluate(&self, records: &[ContractionRecord], now: EpochMillis) -> Alert {
        let valid: Vec<&ContractionRecord> = records.iter().filter(|r| r.is_valid()).collect();
        let mut alert: Option<Alert> = None;

        if valid.len() >= TOTAL_VALID_DANGER {
            alert = Some(Alert::new(MSG_TEN_VALID, Severity::Danger));
        }

        let window: Vec<&ContractionRecord> = valid
            .iter()
            .copied()
            .filter(|r| now.saturating_sub(r.end()) <= WINDOW_MILLIS)
            .collect();

        if window.len() >= WINDOW_VALID_MIN {
            let intervals = window_intervals(&window);
            if let Some(median) = upper_median(&intervals) {
                debug!(
                    "3-1-1 window: {} valid, median interval {:.2} min",
                    window.len(),
                    median
                );
                if (MEDIAN_MIN_MINUTES..=MEDIAN_MAX_MINUTES).contains(&median) {
                    alert = Some(Alert::new(MSG_THREE_ONE_ONE, Severity::Danger));
                } else if alert.is_none() && valid.len() >= WATCH_VALID_MIN {
                    alert = Some(Alert::new(MSG_RHYTHM_INCREASING, Severity::Warn));
                }
            }
        } else if alert.is_none() && valid.len() >= WATCH_VALID_MIN {
            alert = Some(Alert::new(MSG_WATCH_PATTERN, Severity::Warn));
        }

        alert.unwrap_or_else(Alert::awaiting)
    }
}

/// Start-to-start intervals in minutes between consecutive records
fn window_intervals(window: &[&ContractionRecord]) -> Vec<f64> {
    window
        .windows(2)
        .map(|pair| interval_minutes(pair[0], pair[1]))
        .collect()
}

/// Element at index `len / 2` of the ascending sort
///
/// For even lengths this is the upper of the two middle values, not their
/// average. Returns `None` for an empty slice.
pub fn upper_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(sorted[sorted.len() / 2])
}
