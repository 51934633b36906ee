//! Identifier types shared by events and projections.
//!
//! Both ids are 128-bit UUIDs. Keeping them as distinct newtypes (rather than
//! passing `Uuid` around directly) stops an `EventId` and an `ExpenseId` from
//! being swapped at a call site by accident.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when a textual id fails to parse as a UUID.
#[derive(Debug, thiserror::Error)]
#[error("invalid id: {0}")]
pub struct ParseIdError(#[from] uuid::Error);

macro_rules! uuid_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID without validation.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // lowercase-hyphenated, matching the sync file's wire format.
                write!(f, "{}", self.0.as_hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_newtype!(ExpenseId, "Stable identifier for one expense, across all events about it.");
uuid_newtype!(EventId, "Globally unique identifier for one event.");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_hyphenated() {
        let id = ExpenseId::new();
        let text = id.to_string();
        assert_eq!(text, text.to_lowercase());
        assert_eq!(text.len(), 36);
        assert_eq!(text.matches('-').count(), 4);
    }

    #[test]
    fn roundtrips_through_string() {
        let id = EventId::new();
        let parsed: EventId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn ord_matches_uuid_ord() {
        let a = ExpenseId::from_uuid(Uuid::nil());
        let b = ExpenseId::from_uuid(Uuid::from_u128(u128::MAX));
        assert!(a < b);
    }

    #[test]
    fn distinct_newtypes_do_not_unify() {
        // Compile-time property: this would not compile if ExpenseId and
        // EventId were the same type.
        let expense: ExpenseId = ExpenseId::new();
        let event: EventId = EventId::new();
        assert_ne!(expense.as_uuid(), event.as_uuid());
    }
}
