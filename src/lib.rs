/// Error types for storage, timing and configuration
pub mod error;

/// Contraction records and classification
pub mod records;

/// Owned contraction history
pub mod history;

/// Alert heuristics
pub mod alerts;

/// History persistence
pub mod storage;

/// History plus persistence
pub mod tracker;

/// Stopwatch and redraw ticker
pub mod timer;

/// Terminal projection of the history
pub mod display;

/// Configuration management
pub mod config;

// Re-export commonly used types
pub use error::{ConfigError, StorageError, TimerError};
pub use records::{ContractionRecord, ContractionType, Severity};
pub use tracker::ContractionTracker;
