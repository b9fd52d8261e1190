pub mod pacing;
pub mod processor;

pub use pacing::Pacer;
pub use processor::{BatchOutcome, BatchProcessor, BatchRun, ItemError};
