//! Fast, deterministic in-memory doubles for the projection store and the
//! processed-event registry, for tests that want to exercise command/query
//! logic without paying for a SQLite pool.
//!
//! These intentionally mirror the monotonicity contract of
//! `sync_store::projection_store` exactly (same upsert predicate) rather
//! than approximating it, so a test passing against this double says
//! something real about the production store's behavior too.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use sync_core::{EventId, ExpenseId, Payload};

/// `HashMap`-backed stand-in for the SQLite projection table.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProjectionStore {
    rows: Arc<RwLock<HashMap<ExpenseId, Payload>>>,
}

impl InMemoryProjectionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Same predicate as the SQL upsert: replace only if `payload.updated_at`
    /// is strictly newer than whatever is stored. Returns whether it applied.
    #[must_use]
    pub fn project_from_event(&self, payload: &Payload) -> bool {
        let mut rows = self.rows.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        match rows.get(&payload.expense_id) {
            Some(existing) if !payload.is_newer_than(existing.updated_at) => false,
            _ => {
                rows.insert(payload.expense_id, payload.clone());
                true
            }
        }
    }

    /// Same predicate as `sync_store::projection_store::mark_as_deleted`.
    #[must_use]
    pub fn mark_as_deleted(&self, expense_id: ExpenseId, updated_at: i64) -> bool {
        let mut rows = self.rows.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        match rows.get_mut(&expense_id) {
            Some(row) if updated_at > row.updated_at => {
                row.deleted = Some(true);
                row.updated_at = updated_at;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn find_by_id(&self, expense_id: ExpenseId) -> Option<Payload> {
        self.rows
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&expense_id)
            .cloned()
    }

    #[must_use]
    pub fn list_active(&self) -> Vec<Payload> {
        let mut rows: Vec<Payload> = self
            .rows
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .values()
            .filter(|p| !p.is_deleted())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `HashSet`-backed stand-in for the processed-event registry.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProcessedEvents {
    seen: Arc<RwLock<HashSet<EventId>>>,
}

impl InMemoryProcessedEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has(&self, event_id: EventId) -> bool {
        self.seen
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(&event_id)
    }

    /// Insert `event_id`. Idempotent: marking twice is a no-op.
    pub fn mark(&self, event_id: EventId) {
        self.seen
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(event_id);
    }

    #[must_use]
    pub fn all(&self) -> Vec<EventId> {
        self.seen
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }
}
