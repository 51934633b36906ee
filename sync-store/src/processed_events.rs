//! Processed-Event Registry — de-duplicates remote events this replica
//! has already applied, independent of the projection store's own
//! monotonicity (an event can be seen twice, e.g. after a sync file is
//! re-read, without being re-projected).

use sqlx::{Sqlite, SqlitePool};

use sync_core::{EventId, StoreError};

/// Whether `event_id` has already been recorded as processed.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn has<'e, E>(executor: E, event_id: EventId) -> Result<bool, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM processed_events WHERE event_id = ?1")
        .bind(event_id.to_string())
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

/// Record `event_id` as processed. Idempotent: recording an already-present
/// id is a no-op, not an error.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn mark<'e, E>(executor: E, event_id: EventId) -> Result<(), StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT OR IGNORE INTO processed_events (event_id) VALUES (?1)")
        .bind(event_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

/// All processed ids, for diagnostics and tests. Not used on any hot path.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn all(pool: &SqlitePool) -> Result<Vec<EventId>, StoreError> {
    use std::str::FromStr;

    let rows: Vec<(String,)> = sqlx::query_as("SELECT event_id FROM processed_events")
        .fetch_all(pool)
        .await?;

    rows.into_iter()
        .map(|(id,)| {
            EventId::from_str(&id).map_err(|e| StoreError::CorruptRow(format!("bad event_id: {e}")))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::bootstrap;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        bootstrap(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn unseen_id_is_not_processed() {
        let pool = memory_pool().await;
        assert!(!has(&pool, EventId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn mark_then_has_is_true() {
        let pool = memory_pool().await;
        let id = EventId::new();
        mark(&pool, id).await.unwrap();
        assert!(has(&pool, id).await.unwrap());
    }

    #[tokio::test]
    async fn mark_is_idempotent() {
        let pool = memory_pool().await;
        let id = EventId::new();
        mark(&pool, id).await.unwrap();
        mark(&pool, id).await.unwrap();
        assert_eq!(all(&pool).await.unwrap().len(), 1);
    }
}
