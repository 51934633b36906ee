//! Remote batch processing and the full-sync cycle that drives it.

pub mod orchestrator;
pub mod processor;

pub use orchestrator::{SyncOrchestrator, SyncReport};
pub use processor::process_batch;
