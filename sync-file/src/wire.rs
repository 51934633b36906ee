//! JSON wire format for the shared sync file, including the untyped
//! side-channel that round-trips unknown fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use sync_core::{Event, EventId, EventType, ExpenseId, Payload};

/// `{ "snapshot": ..., "events": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncDocument {
    pub snapshot: Option<Value>,
    pub events: Vec<EventEntry>,

    /// Top-level keys this revision doesn't know about; re-emitted verbatim.
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

/// One entry of the `events` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    pub timestamp: i64,
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    #[serde(rename = "expenseId")]
    pub expense_id: ExpenseId,
    pub payload: PayloadEntry,

    /// Unknown fields at the entry level, preserved on re-serialization.
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

/// Payload shape on the wire, with an unknown-field side channel distinct
/// from [`Payload`]'s own (typed, internal) representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadEntry {
    #[serde(rename = "id")]
    pub expense_id: ExpenseId,
    pub description: Option<String>,
    pub amount: i64,
    pub category: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,

    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl From<Payload> for PayloadEntry {
    fn from(p: Payload) -> Self {
        Self {
            expense_id: p.expense_id,
            description: p.description,
            amount: p.amount,
            category: p.category,
            date: p.date,
            updated_at: p.updated_at,
            deleted: p.deleted,
            unknown: Map::new(),
        }
    }
}

impl From<PayloadEntry> for Payload {
    fn from(p: PayloadEntry) -> Self {
        Self {
            expense_id: p.expense_id,
            description: p.description,
            amount: p.amount,
            category: p.category,
            date: p.date,
            updated_at: p.updated_at,
            deleted: p.deleted,
        }
    }
}

impl From<&Event> for EventEntry {
    fn from(event: &Event) -> Self {
        Self {
            event_id: event.event_id,
            timestamp: event.timestamp,
            event_type: event.event_type,
            expense_id: event.expense_id,
            payload: event.payload.clone().into(),
            unknown: Map::new(),
        }
    }
}

impl From<EventEntry> for Event {
    fn from(entry: EventEntry) -> Self {
        Self::new_local(
            entry.event_id,
            entry.timestamp,
            entry.event_type,
            entry.expense_id,
            entry.payload.into(),
        )
    }
}
