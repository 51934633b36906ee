//! Core types and traits for the expense multi-device sync engine.
//!
//! This crate defines the data model shared by every other crate in the
//! workspace (`sync-store`, `sync-service`, `sync-file`, `sync-engine`): the
//! expense [`payload::Payload`], the immutable [`event::Event`] log entry,
//! the id newtypes, the injectable [`clock::Clock`]/[`clock::IdGenerator`]
//! traits, and the error taxonomy. It has no I/O of its own.

pub mod clock;
pub mod error;
pub mod event;
pub mod ids;
pub mod payload;

pub use clock::{Clock, FixedClock, IdGenerator, SequenceClock, SystemClock, UuidGenerator};
pub use error::{CoreError, ProjectionError, StoreError, SyncError, SyncFileError};
pub use event::{Event, EventType};
pub use ids::{EventId, ExpenseId};
pub use payload::Payload;
