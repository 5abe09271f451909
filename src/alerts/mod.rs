/// Alert heuristics over the contraction history
pub mod alert_engine;

pub use alert_engine::{upper_median, Alert, AlertEngine};
