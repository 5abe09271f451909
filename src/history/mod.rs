/// Owned contraction history
pub mod contraction_log;

pub use contraction_log::ContractionLog;
