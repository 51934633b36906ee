//! The expense snapshot carried inside every event and projection row.

use serde::{Deserialize, Serialize};

use crate::ids::ExpenseId;

/// Full post-image of one expense.
///
/// A `Payload` is never a partial patch: every event and every projection
/// row holds a complete snapshot, which is what lets [`Payload::is_newer_than`]
/// (last-write-wins on `updated_at`) act as the sole conflict-resolution rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Stable identifier for the expense this snapshot describes.
    #[serde(rename = "id")]
    pub expense_id: ExpenseId,
    /// Free-text description, capped at 500 chars by the command layer.
    pub description: Option<String>,
    /// Signed amount in minor currency units (cents). Never floating-point.
    pub amount: i64,
    /// Free-text category, capped at 100 chars by the command layer.
    pub category: Option<String>,
    /// ISO-8601 timestamp of the expense itself (not the event).
    pub date: Option<String>,
    /// Logical version: ms since epoch, the sole input to conflict resolution.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    /// Tombstone flag. `None` on the wire is treated as `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Payload {
    /// `deleted`, normalized: wire `null`/absent means "not deleted".
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false)
    }

    /// Last-write-wins comparison: strictly newer `updated_at` wins; equal
    /// timestamps never overwrite.
    #[must_use]
    pub fn is_newer_than(&self, stored_updated_at: i64) -> bool {
        self.updated_at > stored_updated_at
    }
}
