/// Persistence of the contraction history
pub mod json_store;
pub mod store;

pub use json_store::JsonFileStore;
pub use store::{HistoryStore, LoadOutcome, MemoryStore};

#[cfg(test)]
pub use store::MockHistoryStore;
