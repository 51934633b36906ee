//! Event Store — the append-only local event log.

use futures::Stream;
use sqlx::{Sqlite, SqlitePool};

use sync_core::{Event, EventId, EventType, StoreError};

use crate::row::EventRow;

/// Append an immutable event row.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the insert fails — in particular on a
/// duplicate `event_id`, which should not occur for correctly-minted events.
pub async fn append<'e, E>(executor: E, event: &Event) -> Result<(), StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let payload_json = serde_json::to_string(&event.payload)
        .map_err(|e| StoreError::CorruptRow(format!("failed to serialize payload: {e}")))?;

    sqlx::query(
        "INSERT INTO events (event_id, timestamp, event_type, expense_id, payload, committed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(event.event_id.to_string())
    .bind(event.timestamp)
    .bind(event.event_type.as_str())
    .bind(event.expense_id.to_string())
    .bind(payload_json)
    .bind(event.committed)
    .execute(executor)
    .await?;

    Ok(())
}

/// Local events not yet observed on the shared medium, ordered by
/// `(timestamp, event_id)`.
///
/// Returned as a restartable stream backed by an unbuffered query: each
/// call to this function issues a fresh `SELECT`, and the returned stream
/// must not be assumed resumable after being dropped partway through.
///
/// # Errors
///
/// Items of the stream are `Err` if a row fails to deserialize or the
/// underlying query fails.
pub fn find_uncommitted(pool: &SqlitePool) -> impl Stream<Item = Result<Event, StoreError>> + '_ {
    async_stream::try_stream! {
        let mut rows = sqlx::query_as::<_, EventRow>(
            "SELECT event_id, timestamp, event_type, expense_id, payload, committed
             FROM events WHERE committed = 0
             ORDER BY timestamp ASC, event_id ASC",
        )
        .fetch(pool);

        use futures::TryStreamExt;
        while let Some(row) = rows.try_next().await? {
            yield Event::try_from(row)?;
        }
    }
}

/// Collects [`find_uncommitted`] into a `Vec`, for callers (e.g. the sync
/// orchestrator) that need the whole batch before deciding whether to
/// append anything to the sync file.
///
/// # Errors
///
/// Returns the first error encountered deserializing a row or running the
/// query.
pub async fn collect_uncommitted(pool: &SqlitePool) -> Result<Vec<Event>, StoreError> {
    use futures::TryStreamExt;
    find_uncommitted(pool).try_collect().await
}

/// Mark the given event ids as committed (observed on the shared medium).
/// Idempotent: re-marking an already-committed id is a no-op.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn mark_committed<'e, E>(executor: E, event_ids: &[EventId]) -> Result<(), StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    if event_ids.is_empty() {
        return Ok(());
    }
    let placeholders = event_ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
    let sql = format!("UPDATE events SET committed = 1 WHERE event_id IN ({placeholders})");
    let mut query = sqlx::query(&sql);
    for id in event_ids {
        query = query.bind(id.to_string());
    }
    query.execute(executor).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::bootstrap;
    use sync_core::{ExpenseId, Payload};

    fn sample_event(timestamp: i64) -> Event {
        let expense_id = ExpenseId::new();
        let payload = Payload {
            expense_id,
            description: Some("Coffee".to_string()),
            amount: 450,
            category: None,
            date: None,
            updated_at: timestamp,
            deleted: None,
        };
        Event::new_local(EventId::new(), timestamp, EventType::Created, expense_id, payload)
    }

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        bootstrap(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn append_then_find_uncommitted() {
        let pool = memory_pool().await;
        let event = sample_event(1000);
        append(&pool, &event).await.unwrap();

        let uncommitted = collect_uncommitted(&pool).await.unwrap();
        assert_eq!(uncommitted.len(), 1);
        assert_eq!(uncommitted[0].event_id, event.event_id);
    }

    #[tokio::test]
    async fn mark_committed_removes_from_uncommitted() {
        let pool = memory_pool().await;
        let event = sample_event(1000);
        append(&pool, &event).await.unwrap();
        mark_committed(&pool, &[event.event_id]).await.unwrap();

        let uncommitted = collect_uncommitted(&pool).await.unwrap();
        assert!(uncommitted.is_empty());
    }

    #[tokio::test]
    async fn mark_committed_is_idempotent() {
        let pool = memory_pool().await;
        let event = sample_event(1000);
        append(&pool, &event).await.unwrap();
        mark_committed(&pool, &[event.event_id]).await.unwrap();
        mark_committed(&pool, &[event.event_id]).await.unwrap();
        assert!(collect_uncommitted(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn uncommitted_ordered_by_timestamp_then_id() {
        let pool = memory_pool().await;
        let e1 = sample_event(2000);
        let e2 = sample_event(1000);
        append(&pool, &e1).await.unwrap();
        append(&pool, &e2).await.unwrap();

        let uncommitted = collect_uncommitted(&pool).await.unwrap();
        assert_eq!(uncommitted[0].event_id, e2.event_id);
        assert_eq!(uncommitted[1].event_id, e1.event_id);
    }
}
