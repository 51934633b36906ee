//! Projection Store — the durable read model, one row per expense.
//!
//! Both mutating entry points are expressed as a single `INSERT ... ON
//! CONFLICT DO UPDATE ... WHERE` statement rather than a read-then-write
//! pair, so the monotonicity predicate holds even when called
//! concurrently within one process, not just across replicas.

use sqlx::{Sqlite, SqlitePool};

use sync_core::{ExpenseId, Payload, StoreError};

use crate::row::ExpenseRow;

/// Monotonic upsert: insert `payload` if no row exists for its `expense_id`,
/// or replace the row iff `payload.updated_at` is strictly greater than the
/// stored value. Equal timestamps never overwrite.
///
/// Returns `true` if the row was inserted or replaced, `false` if the
/// existing row was newer or equally new.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn project_from_event<'e, E>(executor: E, payload: &Payload) -> Result<bool, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO expenses (expense_id, description, amount, category, date, updated_at, deleted)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(expense_id) DO UPDATE SET
            description = excluded.description,
            amount      = excluded.amount,
            category    = excluded.category,
            date        = excluded.date,
            updated_at  = excluded.updated_at,
            deleted     = excluded.deleted
         WHERE excluded.updated_at > expenses.updated_at",
    )
    .bind(payload.expense_id.to_string())
    .bind(&payload.description)
    .bind(payload.amount)
    .bind(&payload.category)
    .bind(&payload.date)
    .bind(payload.updated_at)
    .bind(payload.is_deleted())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Tombstone helper: sets `deleted = true` and bumps `updated_at` iff the
/// stored `updated_at` is strictly less than `updated_at`.
///
/// Implemented as the same monotonic predicate as [`project_from_event`] so
/// the two entry points (kept distinct for contract fidelity, see
/// DESIGN.md) cannot drift apart.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn mark_as_deleted<'e, E>(
    executor: E,
    expense_id: ExpenseId,
    updated_at: i64,
) -> Result<bool, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE expenses SET deleted = 1, updated_at = ?2
         WHERE expense_id = ?1 AND updated_at < ?2",
    )
    .bind(expense_id.to_string())
    .bind(updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Look up a projection row by id, tombstone or not. The caller decides
/// whether to hide deleted rows (query-service concern, see [`crate::query`]).
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn find_by_id<'e, E>(
    executor: E,
    expense_id: ExpenseId,
) -> Result<Option<Payload>, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, ExpenseRow>(
        "SELECT expense_id, description, amount, category, date, updated_at, deleted
         FROM expenses WHERE expense_id = ?1",
    )
    .bind(expense_id.to_string())
    .fetch_optional(executor)
    .await?;

    row.map(Payload::try_from).transpose()
}

/// Scan of active (non-tombstoned) rows.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if the underlying query fails.
pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Payload>, StoreError> {
    let rows = sqlx::query_as::<_, ExpenseRow>(
        "SELECT expense_id, description, amount, category, date, updated_at, deleted
         FROM expenses WHERE deleted = 0
         ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Payload::try_from).collect()
}
