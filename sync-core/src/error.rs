//! Error taxonomy shared across the sync engine.
//!
//! Each layer gets its own scoped error enum; the orchestrator composes
//! them upward into [`SyncError`]. `NotFound` is deliberately absent from
//! these enums since a missing id is a non-error outcome (`update`/`delete`
//! return `Option`/`bool`, never `Err(NotFound)`).

use thiserror::Error;

/// Errors from the smallest domain types (`EventType` parsing, etc).
#[derive(Debug, Error)]
pub enum CoreError {
    /// An event's `eventType` column held a string outside {CREATED, UPDATED, DELETED}.
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
}

/// Errors from the local stores (projection store, event store,
/// processed-event registry) and the transactional recorder over them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database driver reported a failure. The transaction
    /// this occurred in has already rolled back by the time this is
    /// returned.
    #[error("store failure: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored event row held data that failed to parse back into an
    /// [`crate::event::Event`] (should not occur for rows this crate wrote).
    #[error("corrupt event row: {0}")]
    CorruptRow(String),
}

/// Errors from the sync file manager.
#[derive(Debug, Error)]
pub enum SyncFileError {
    /// Reading or writing the sync file failed at the filesystem level.
    #[error("sync file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sync file's bytes did not parse as the documented JSON schema.
    #[error("malformed sync file: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Checksum computation failed (wraps the I/O error that caused it).
    #[error("checksum failure: {0}")]
    Checksum(String),
}

/// Errors from projecting one event, wrapping whatever the store reported
/// so batch processing can log-and-continue without widening its own
/// error type.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The transactional store operation failed; the event was not applied.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Top-level error surfaced from a full sync cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Reading, writing, or hashing the shared sync file failed.
    #[error(transparent)]
    SyncFile(#[from] SyncFileError),

    /// A local store operation failed outside the per-event projection loop
    /// (e.g. collecting uncommitted events).
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_error_wraps_store_error_message() {
        let store_err = StoreError::CorruptRow("bad payload".to_string());
        let err: ProjectionError = store_err.into();
        assert!(err.to_string().contains("bad payload"));
    }
}
