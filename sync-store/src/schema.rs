//! Embedded schema bootstrap for a replica's local database file.
//!
//! No external migration tool is in scope for this revision: the three
//! tables are created with `CREATE TABLE IF NOT EXISTS` on first open, and
//! schema evolution across crate versions is out of scope.

use sqlx::SqlitePool;

use sync_core::StoreError;

/// Create the `expenses`, `events`, and `processed_events` tables if they do
/// not already exist.
///
/// # Errors
///
/// Returns [`StoreError::Database`] if any `CREATE TABLE` statement fails.
pub async fn bootstrap(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS expenses (
            expense_id  TEXT    PRIMARY KEY,
            description TEXT,
            amount      INTEGER NOT NULL,
            category    TEXT,
            date        TEXT,
            updated_at  INTEGER NOT NULL,
            deleted     INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            event_id    TEXT    PRIMARY KEY,
            timestamp   INTEGER NOT NULL,
            event_type  TEXT    NOT NULL,
            expense_id  TEXT    NOT NULL,
            payload     TEXT    NOT NULL,
            committed   INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_events_uncommitted
            ON events (committed, timestamp, event_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS processed_events (
            event_id TEXT PRIMARY KEY
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
