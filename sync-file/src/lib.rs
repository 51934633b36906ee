//! Reads, writes, and checksums the shared JSON sync file.

pub mod manager;
pub mod wire;

pub use manager::{SyncFileConfig, SyncFileManager};
pub use wire::{EventEntry, PayloadEntry, SyncDocument};
