//! Row types shared between `projection_store` and `event_store`, and the
//! fallible conversions back into `sync-core`'s domain types.

use std::str::FromStr;

use sync_core::{Event, EventId, EventType, ExpenseId, Payload, StoreError};

#[derive(sqlx::FromRow)]
pub(crate) struct ExpenseRow {
    pub expense_id: String,
    pub description: Option<String>,
    pub amount: i64,
    pub category: Option<String>,
    pub date: Option<String>,
    pub updated_at: i64,
    pub deleted: bool,
}

impl TryFrom<ExpenseRow> for Payload {
    type Error = StoreError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let expense_id = ExpenseId::from_str(&row.expense_id)
            .map_err(|e| StoreError::CorruptRow(format!("bad expense_id: {e}")))?;
        Ok(Self {
            expense_id,
            description: row.description,
            amount: row.amount,
            category: row.category,
            date: row.date,
            updated_at: row.updated_at,
            deleted: Some(row.deleted),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EventRow {
    pub event_id: String,
    pub timestamp: i64,
    pub event_type: String,
    pub expense_id: String,
    pub payload: String,
    pub committed: bool,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let event_id = EventId::from_str(&row.event_id)
            .map_err(|e| StoreError::CorruptRow(format!("bad event_id: {e}")))?;
        let expense_id = ExpenseId::from_str(&row.expense_id)
            .map_err(|e| StoreError::CorruptRow(format!("bad expense_id: {e}")))?;
        let event_type = EventType::from_str(&row.event_type)
            .map_err(|e| StoreError::CorruptRow(e.to_string()))?;
        let payload: Payload = serde_json::from_str(&row.payload)
            .map_err(|e| StoreError::CorruptRow(format!("bad payload: {e}")))?;
        Ok(Self {
            event_id,
            timestamp: row.timestamp,
            event_type,
            expense_id,
            payload,
            committed: row.committed,
        })
    }
}
