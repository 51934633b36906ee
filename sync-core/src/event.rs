//! Event types for the expense sync log.
//!
//! An [`Event`] is an immutable fact about one mutation of one expense. It is
//! the unit that both the local event log and the shared sync file traffic
//! in.

use serde::{Deserialize, Serialize};

use crate::ids::{EventId, ExpenseId};
use crate::payload::Payload;

/// The kind of mutation an event records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// A new expense was created.
    #[serde(rename = "CREATED")]
    Created,
    /// An existing expense was updated.
    #[serde(rename = "UPDATED")]
    Updated,
    /// An expense was deleted (tombstoned).
    #[serde(rename = "DELETED")]
    Deleted,
}

impl EventType {
    /// Static label matching the wire format exactly, for logging/SQL use
    /// without going through serde.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "UPDATED" => Ok(Self::Updated),
            "DELETED" => Ok(Self::Deleted),
            other => Err(crate::error::CoreError::UnknownEventType(other.to_string())),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable record of one mutation of one expense.
///
/// `(event_id, event_type, expense_id, timestamp, payload)` never mutates
/// after insertion; `committed` is the one transient, local-only field —
/// it marks that this replica has observed the event on the shared medium
/// and has no meaning to any other replica.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Globally unique id for this event.
    pub event_id: EventId,
    /// Ms since epoch, assigned at creation from an injectable [`crate::clock::Clock`].
    pub timestamp: i64,
    /// The kind of mutation this event records.
    pub event_type: EventType,
    /// The expense this event is about.
    pub expense_id: ExpenseId,
    /// Complete post-image of the expense after this event.
    pub payload: Payload,
    /// Local-only: whether this replica has observed this event on the
    /// shared medium. Never part of the wire format; has no meaning on a
    /// remote event.
    #[serde(skip)]
    pub committed: bool,
}

impl Event {
    /// Build a freshly-minted local event, `committed = false` by construction
    /// (every event this replica appends is, by definition, not yet observed
    /// on the shared medium).
    #[must_use]
    pub const fn new_local(
        event_id: EventId,
        timestamp: i64,
        event_type: EventType,
        expense_id: ExpenseId,
        payload: Payload,
    ) -> Self {
        Self {
            event_id,
            timestamp,
            event_type,
            expense_id,
            payload,
            committed: false,
        }
    }
}

/// Sort key implementing the `(timestamp, eventId)` ordering required for
/// batch processing: equal timestamps break ties by the 128-bit unsigned
/// id ordering, which is exactly `Uuid`'s `Ord`.
pub fn sort_key(event: &Event) -> (i64, EventId) {
    (event.timestamp, event.event_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn event_type_roundtrips_through_str() {
        for ty in [EventType::Created, EventType::Updated, EventType::Deleted] {
            let parsed: EventType = ty.as_str().parse().unwrap();
            assert_eq!(parsed, ty);
        }
    }

    #[test]
    fn unknown_event_type_is_an_error() {
        assert!("BOGUS".parse::<EventType>().is_err());
    }

    #[test]
    fn sort_key_breaks_ties_by_event_id() {
        let expense_id = ExpenseId::new();
        let payload = Payload {
            expense_id,
            description: None,
            amount: 0,
            category: None,
            date: None,
            updated_at: 1000,
            deleted: None,
        };
        let a = Event::new_local(EventId::from_uuid(uuid::Uuid::nil()), 1000, EventType::Created, expense_id, payload.clone());
        let b = Event::new_local(EventId::from_uuid(uuid::Uuid::from_u128(1)), 1000, EventType::Updated, expense_id, payload);
        assert!(sort_key(&a) < sort_key(&b));
    }
}
