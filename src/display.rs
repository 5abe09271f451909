//! Text projection of the contraction history for the terminal
//!
//! Everything here is read-only over the log: counts, formatted clock values,
//! the alert line and one row per recorded contraction.

use crate::alerts::Alert;
use crate::history::ContractionLog;
use crate::records::{last_valid_interval, ContractionRecord, ContractionType, EpochMillis};
use chrono::{Local, TimeZone};
use std::fmt;

/// Placeholder shown when no interval is available
pub const NO_INTERVAL: &str = "—";

/// Format whole seconds as `MM:SS`
///
/// Minutes are not wrapped, so 75 minutes renders as `75:00`.
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Format an interval in minutes with one decimal, or the absence marker
pub fn format_interval(minutes: Option<f64>) -> String {
    match minutes {
        Some(m) => format!("{:.1} min", m),
        None => NO_INTERVAL.to_string(),
    }
}

/// Format an epoch-millisecond timestamp as local wall-clock time
pub fn format_time(at: EpochMillis) -> String {
    match Local.timestamp_millis_opt(at).single() {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

/// One rendered line of the history table
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// 1-based position in recording order
    pub index: usize,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub kind: ContractionType,
    /// Interval to the previous valid contraction, minutes
    pub interval: Option<f64>,
}

/// Build the history table
///
/// The interval on each row is computed from the valid contractions up to
/// and including that row, so it only appears on valid rows that have a
/// valid predecessor.
pub fn rows(records: &[ContractionRecord]) -> Vec<HistoryRow> {
    records
        .iter()
        .enumerate()
        .map(|(idx, record)| HistoryRow {
            index: idx + 1,
            start: format_time(record.start()),
            end: format_time(record.end()),
            duration: format_clock(record.duration_sec()),
            kind: record.kind(),
            interval: if record.is_valid() {
                last_valid_interval(&records[..=idx])
            } else {
                None
            },
        })
        .collect()
}

impl fmt::Display for HistoryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>3}  {}  {}  {}  {:<9}  {}",
            self.index,
            self.start,
            self.end,
            self.duration,
            self.kind.label(),
            format_interval(self.interval)
        )
    }
}

/// Header line matching the `HistoryRow` layout
pub const TABLE_HEADER: &str = "  #  Start     End       Dur    Type       Interval";

/// Summary figures shown above the history
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub valid_count: usize,
    pub prodromal_count: usize,
    pub last_interval: Option<f64>,
    pub alert: Alert,
}

impl Summary {
    /// Project the log as of `now`
    pub fn of(log: &ContractionLog, now: EpochMillis) -> Self {
        Self {
            valid_count: log.valid_count(),
            prodromal_count: log.prodromal_count(),
            last_interval: log.last_valid_interval(),
            alert: log.evaluate_alerts(now),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Valid:         {}", self.valid_count)?;
        writeln!(f, "Prodromal:     {}", self.prodromal_count)?;
        writeln!(f, "Last interval: {}", format_interval(self.last_interval))?;
        write!(
            f,
            "Status [{}]: {}",
            self.alert.severity.as_str(),
            self.alert.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Severity;

    const MINUTE: i64 = 60_000;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(75 * 60), "75:00");
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(None), "—");
        assert_eq!(format_interval(Some(3.0)), "3.0 min");
        assert_eq!(format_interval(Some(2.96)), "3.0 min");
        assert_eq!(format_interval(Some(0.0)), "0.0 min");
    }

    #[test]
    fn test_rows_interval_per_row() {
        let records = vec![
            ContractionRecord::new(0, 70_000),
            ContractionRecord::new(2 * MINUTE, 2 * MINUTE + 20_000),
            ContractionRecord::new(5 * MINUTE, 5 * MINUTE + 65_000),
            ContractionRecord::new(8 * MINUTE, 8 * MINUTE + 90_000),
        ];
        let table = rows(&records);

        assert_eq!(table.len(), 4);
        assert_eq!(table[0].index, 1);
        assert_eq!(table[0].interval, None);
        assert_eq!(table[1].kind, ContractionType::Prodromal);
        assert_eq!(table[1].interval, None);
        assert_eq!(table[2].interval, Some(5.0));
        assert_eq!(table[3].interval, Some(3.0));
        assert_eq!(table[3].duration, "01:30");
    }

    #[test]
    fn test_row_display_contains_fields() {
        let records = vec![
            ContractionRecord::new(0, 70_000),
            ContractionRecord::new(3 * MINUTE, 3 * MINUTE + 70_000),
        ];
        let line = rows(&records)[1].to_string();
        assert!(line.contains("01:10"));
        assert!(line.contains("Valid"));
        assert!(line.ends_with("3.0 min"));
    }

    #[test]
    fn test_summary_of_empty_log() {
        let summary = Summary::of(&ContractionLog::new(), 0);
        assert_eq!(summary.valid_count, 0);
        assert_eq!(summary.prodromal_count, 0);
        assert_eq!(summary.last_interval, None);
        assert_eq!(summary.alert.severity, Severity::Ok);

        let text = summary.to_string();
        assert!(text.contains("Last interval: —"));
        assert!(text.contains("[ok]"));
    }

    #[test]
    fn test_summary_counts() {
        let mut log = ContractionLog::new();
        log.record(0, 70_000);
        log.record(MINUTE, MINUTE + 10_000);
        log.record(4 * MINUTE, 4 * MINUTE + 61_000);

        let summary = Summary::of(&log, 5 * MINUTE);
        assert_eq!(summary.valid_count, 2);
        assert_eq!(summary.prodromal_count, 1);
        assert_eq!(summary.last_interval, Some(4.0));
    }
}
