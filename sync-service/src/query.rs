//! Query Service — read-only access to the current projection.
//!
//! Never exposes events, only projections.

use futures::Stream;
use sqlx::SqlitePool;

use sync_core::{ExpenseId, Payload, StoreError};
use sync_store::projection_store;

/// Read-only facade over the projection store.
pub struct QueryService {
    pool: SqlitePool,
}

impl QueryService {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Active (non-deleted) expenses, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    #[tracing::instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<Payload>, StoreError> {
        projection_store::list_active(&self.pool).await
    }

    /// A single expense, `None` if absent or tombstoned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    #[tracing::instrument(skip(self))]
    pub async fn find_active(&self, id: ExpenseId) -> Result<Option<Payload>, StoreError> {
        let row = projection_store::find_by_id(&self.pool, id).await?;
        Ok(row.filter(|p| !p.is_deleted()))
    }
}

/// Lazily-yielded variant of [`QueryService::list_active`] for callers who
/// want a stream rather than a materialized list. Thin wrapper; the
/// underlying query still runs eagerly inside `sqlx` rather than pretending
/// SQLite gives genuine incremental streaming for a table this size.
pub fn stream_active(pool: &SqlitePool) -> impl Stream<Item = Result<Payload, StoreError>> + '_ {
    async_stream::try_stream! {
        for payload in projection_store::list_active(pool).await? {
            yield payload;
        }
    }
}
