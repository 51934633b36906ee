//! Projection Recorder — the transactional heart of sync-in.

use std::collections::HashSet;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::RwLock;
use uuid::Uuid;

use sync_core::{Event, EventType, ProjectionError};

use crate::{event_store, processed_events, projection_store};

/// Projects one event exactly once per `eventId`, guarded by [`crate::processed_events`]
/// and backed by an in-memory accelerator set that mirrors it.
///
/// The accelerator is an optimization, not a source of truth: a restart
/// drops it and [`ProjectionRecorder::warm`] repopulates it from
/// `processed_events::all`. An id is inserted into the accelerator only
/// after the transaction that recorded it in `processed_events` commits —
/// never on a rolled-back attempt — so the two never drift out of sync in
/// a way that would make `project_once` under-apply an event.
pub struct ProjectionRecorder {
    pool: SqlitePool,
    seen: Arc<RwLock<HashSet<Uuid>>>,
}

impl ProjectionRecorder {
    /// Construct a recorder over `pool` with an empty accelerator. Call
    /// [`Self::warm`] before serving traffic so the accelerator reflects
    /// whatever this replica already processed in a prior run.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            seen: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Load the accelerator from the durable processed-event registry.
    ///
    /// # Errors
    ///
    /// Returns [`sync_core::StoreError`] if the registry scan fails.
    pub async fn warm(&self) -> Result<(), sync_core::StoreError> {
        let ids = processed_events::all(&self.pool).await?;
        let mut seen = self.seen.write().await;
        seen.extend(ids.into_iter().map(|id| id.as_uuid()));
        Ok(())
    }

    /// Project `event` exactly once. Returns `true` if this call applied
    /// it, `false` if it had already been processed.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if the transaction fails; in that case
    /// no side effect (projection row, processed-event mark, or committed
    /// flag) is visible for this event.
    #[tracing::instrument(skip(self, event), fields(event_id = %event.event_id))]
    pub async fn project_once(&self, event: &Event) -> Result<bool, ProjectionError> {
        let id = event.event_id.as_uuid();
        if self.seen.read().await.contains(&id) {
            tracing::debug!("event already processed, skipping");
            return Ok(false);
        }
        if processed_events::has(&self.pool, event.event_id).await? {
            tracing::debug!("event already recorded in processed_events, skipping");
            return Ok(false);
        }

        let mut tx = self.pool.begin().await.map_err(sync_core::StoreError::from)?;

        match event.event_type {
            EventType::Created | EventType::Updated => {
                projection_store::project_from_event(&mut *tx, &event.payload).await?;
            }
            EventType::Deleted => {
                projection_store::mark_as_deleted(
                    &mut *tx,
                    event.expense_id,
                    event.payload.updated_at,
                )
                .await?;
            }
        }
        processed_events::mark(&mut *tx, event.event_id).await?;
        event_store::mark_committed(&mut *tx, &[event.event_id]).await?;

        tx.commit().await.map_err(sync_core::StoreError::from)?;

        self.seen.write().await.insert(id);
        tracing::debug!("event projected");
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::schema::bootstrap;
    use sync_core::{EventId, ExpenseId, Payload};

    fn created_event(expense_id: ExpenseId, amount: i64, updated_at: i64) -> Event {
        let payload = Payload {
            expense_id,
            description: Some("Coffee".to_string()),
            amount,
            category: None,
            date: None,
            updated_at,
            deleted: None,
        };
        Event::new_local(EventId::new(), updated_at, EventType::Created, expense_id, payload)
    }

    async fn memory_recorder() -> ProjectionRecorder {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        bootstrap(&pool).await.unwrap();
        ProjectionRecorder::new(pool)
    }

    #[tokio::test]
    async fn project_once_applies_then_skips() {
        let recorder = memory_recorder().await;
        let event = created_event(ExpenseId::new(), 500, 1000);

        assert!(recorder.project_once(&event).await.unwrap());
        assert!(!recorder.project_once(&event).await.unwrap());

        let stored = projection_store::find_by_id(&recorder.pool, event.expense_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.amount, 500);
    }

    #[tokio::test]
    async fn project_once_marks_processed_and_committed() {
        let recorder = memory_recorder().await;
        let event = created_event(ExpenseId::new(), 500, 1000);
        event_store::append(&recorder.pool, &event).await.unwrap();

        assert!(recorder.project_once(&event).await.unwrap());
        assert!(processed_events::has(&recorder.pool, event.event_id).await.unwrap());
        assert!(event_store::collect_uncommitted(&recorder.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn warm_prevents_reprocessing_after_restart() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        bootstrap(&pool).await.unwrap();
        let event = created_event(ExpenseId::new(), 500, 1000);

        let first = ProjectionRecorder::new(pool.clone());
        assert!(first.project_once(&event).await.unwrap());

        let second = ProjectionRecorder::new(pool);
        second.warm().await.unwrap();
        assert!(!second.project_once(&event).await.unwrap());
    }
}
