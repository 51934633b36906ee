//! Test doubles and deterministic fixtures shared across the sync engine's
//! crates: in-memory stand-ins for the projection store and processed-event
//! registry, plus re-exports of `sync-core`'s injectable clock/id traits
//! for constructing reproducible test scenarios.

pub mod in_memory;

pub use in_memory::{InMemoryProcessedEvents, InMemoryProjectionStore};
pub use sync_core::{FixedClock, SequenceClock};
