//! Command Service — the only path by which local mutations are made.

use sqlx::SqlitePool;

use sync_core::{Clock, Event, EventType, ExpenseId, IdGenerator, Payload, StoreError};
use sync_store::{event_store, projection_store};

/// Fields supplied to [`CommandService::update`]; absent fields keep the
/// existing stored value.
#[derive(Debug, Default, Clone)]
pub struct UpdateFields {
    pub description: Option<String>,
    pub amount: Option<i64>,
    pub category: Option<String>,
    pub date: Option<String>,
}

/// Issues `create`/`update`/`delete` commands, each inside one local
/// transaction that appends the event and updates the projection together:
/// never one without the other.
pub struct CommandService<C, I> {
    pool: SqlitePool,
    clock: C,
    ids: I,
}

impl<C, I> CommandService<C, I>
where
    C: Clock,
    I: IdGenerator,
{
    pub const fn new(pool: SqlitePool, clock: C, ids: I) -> Self {
        Self { pool, clock, ids }
    }

    /// Create a new expense. Always succeeds (barring a database error).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the transaction fails.
    #[tracing::instrument(skip(self, description))]
    pub async fn create(
        &self,
        description: Option<String>,
        amount: i64,
        category: Option<String>,
        date: Option<String>,
    ) -> Result<Payload, StoreError> {
        let now = self.clock.now_ms();
        let expense_id = self.ids.new_expense_id();
        let payload = Payload {
            expense_id,
            description,
            amount,
            category,
            date,
            updated_at: now,
            deleted: Some(false),
        };
        let event = Event::new_local(
            self.ids.new_event_id(),
            now,
            EventType::Created,
            expense_id,
            payload.clone(),
        );

        let mut tx = self.pool.begin().await?;
        event_store::append(&mut *tx, &event).await?;
        projection_store::project_from_event(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!(expense_id = %expense_id, "expense created");
        Ok(payload)
    }

    /// Update an existing expense. Returns `None` if no row exists for
    /// `id`; no event is emitted in that case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the transaction fails.
    #[tracing::instrument(skip(self, fields))]
    pub async fn update(
        &self,
        id: ExpenseId,
        fields: UpdateFields,
    ) -> Result<Option<Payload>, StoreError> {
        let Some(existing) = projection_store::find_by_id(&self.pool, id).await? else {
            return Ok(None);
        };

        let now = self.clock.now_ms();
        let payload = Payload {
            expense_id: id,
            description: fields.description.or(existing.description),
            amount: fields.amount.unwrap_or(existing.amount),
            category: fields.category.or(existing.category),
            date: fields.date.or(existing.date),
            updated_at: now,
            deleted: Some(false),
        };
        let event = Event::new_local(
            self.ids.new_event_id(),
            now,
            EventType::Updated,
            id,
            payload.clone(),
        );

        let mut tx = self.pool.begin().await?;
        event_store::append(&mut *tx, &event).await?;
        projection_store::project_from_event(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!(expense_id = %id, "expense updated");
        Ok(Some(payload))
    }

    /// Delete (tombstone) an existing expense. Returns `false` if no row
    /// exists for `id`, or if the tombstone write lost the monotonic race
    /// (the same clock millisecond as the expense's last write, or an
    /// in-flight update that arrived after the read above) — in that case
    /// the DELETED event is still appended to the log, but the projection
    /// is left as the other writer left it, and the caller is told the
    /// row visible to queries did not change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the transaction fails.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ExpenseId) -> Result<bool, StoreError> {
        let Some(existing) = projection_store::find_by_id(&self.pool, id).await? else {
            return Ok(false);
        };

        let now = self.clock.now_ms();
        let payload = Payload {
            expense_id: id,
            deleted: Some(true),
            updated_at: now,
            ..existing
        };
        let event = Event::new_local(
            self.ids.new_event_id(),
            now,
            EventType::Deleted,
            id,
            payload,
        );

        let mut tx = self.pool.begin().await?;
        event_store::append(&mut *tx, &event).await?;
        let applied = projection_store::mark_as_deleted(&mut *tx, id, now).await?;
        tx.commit().await?;

        if applied {
            tracing::info!(expense_id = %id, "expense deleted");
        } else {
            tracing::warn!(expense_id = %id, "delete event logged but tombstone lost monotonic race");
        }
        Ok(applied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sync_core::{FixedClock, SequenceClock, UuidGenerator};
    use sync_store::schema::bootstrap;

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        bootstrap(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn create_then_update_bumps_timestamp() {
        let pool = memory_pool().await;
        let service = CommandService::new(pool, SequenceClock::new(1000, 10), UuidGenerator);

        let created = service.create(Some("Coffee".into()), 450, None, None).await.unwrap();
        assert_eq!(created.updated_at, 1000);

        let updated = service
            .update(
                created.expense_id,
                UpdateFields {
                    amount: Some(500),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount, 500);
        assert_eq!(updated.description.as_deref(), Some("Coffee"));
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_missing_returns_none() {
        let pool = memory_pool().await;
        let service = CommandService::new(pool, FixedClock(1000), UuidGenerator);
        let result = service.update(ExpenseId::new(), UpdateFields::default()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_missing_returns_false() {
        let pool = memory_pool().await;
        let service = CommandService::new(pool, FixedClock(1000), UuidGenerator);
        assert!(!service.delete(ExpenseId::new()).await.unwrap());
    }

    #[tokio::test]
    async fn delete_tombstones_and_is_hidden_from_queries() {
        let pool = memory_pool().await;
        let service = CommandService::new(pool.clone(), SequenceClock::new(1000, 10), UuidGenerator);
        let created = service.create(None, 100, None, None).await.unwrap();

        assert!(service.delete(created.expense_id).await.unwrap());
        let stored = projection_store::find_by_id(&pool, created.expense_id).await.unwrap().unwrap();
        assert!(stored.is_deleted());
    }

    #[tokio::test]
    async fn create_appends_uncommitted_local_event() {
        let pool = memory_pool().await;
        let service = CommandService::new(pool.clone(), FixedClock(1000), UuidGenerator);
        service.create(None, 100, None, None).await.unwrap();

        let uncommitted = sync_store::event_store::collect_uncommitted(&pool).await.unwrap();
        assert_eq!(uncommitted.len(), 1);
        assert_eq!(uncommitted[0].event_type, EventType::Created);
    }
}
