//! The two public-facing services built on top of `sync-store`: commands
//! that mutate local state and queries that read it back.

pub mod command;
pub mod query;

pub use command::{CommandService, UpdateFields};
pub use query::{stream_active, QueryService};
