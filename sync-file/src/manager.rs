//! Sync File Manager — read/write of the shared JSON document, with
//! checksum caching and optional gzip framing.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use sync_core::{Event, SyncFileError};

use crate::wire::{EventEntry, SyncDocument};

/// Where the shared sync file lives and whether it is gzip-framed.
#[derive(Debug, Clone)]
pub struct SyncFileConfig {
    pub path: PathBuf,
    pub compressed: bool,
}

impl SyncFileConfig {
    #[must_use]
    pub const fn new(path: PathBuf, compressed: bool) -> Self {
        Self { path, compressed }
    }
}

/// Reads and writes the sync file, caching its checksum between cycles so
/// [`SyncFileManager::has_changed`] can skip re-processing an unchanged
/// file without re-reading its contents twice per cycle.
pub struct SyncFileManager {
    config: SyncFileConfig,
    cached_checksum: Arc<RwLock<Option<String>>>,
}

impl SyncFileManager {
    #[must_use]
    pub fn new(config: SyncFileConfig) -> Self {
        Self {
            config,
            cached_checksum: Arc::new(RwLock::new(None)),
        }
    }

    /// Read and parse the sync file, returning events sorted by
    /// `(timestamp, eventId)`. Returns an empty list if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`SyncFileError::Malformed`] if the file exists but is not
    /// valid JSON in the documented shape, or [`SyncFileError::Io`] if it
    /// exists but cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn read(&self) -> Result<Vec<Event>, SyncFileError> {
        let Some(bytes) = self.read_bytes().await? else {
            return Ok(Vec::new());
        };
        let doc: SyncDocument = serde_json::from_slice(&bytes)?;
        let mut events: Vec<Event> = doc.events.into_iter().map(Event::from).collect();
        events.sort_by_key(sync_core::event::sort_key);
        tracing::debug!(count = events.len(), "read sync file");
        Ok(events)
    }

    /// Append `new_events` to the sync file's `events` array, preserving
    /// existing order and any unknown fields, and write the result back
    /// atomically (write to a sibling temp file, then rename).
    ///
    /// # Errors
    ///
    /// Returns [`SyncFileError::Io`] if the read or write fails,
    /// [`SyncFileError::Malformed`] if the existing file cannot be parsed.
    #[tracing::instrument(skip(self, new_events), fields(added = new_events.len()))]
    pub async fn append(&self, new_events: &[Event]) -> Result<(), SyncFileError> {
        if new_events.is_empty() {
            return Ok(());
        }

        let mut doc = match self.read_bytes().await? {
            Some(bytes) => serde_json::from_slice(&bytes)?,
            None => SyncDocument::default(),
        };
        doc.events.extend(new_events.iter().map(EventEntry::from));

        let body = serde_json::to_vec_pretty(&doc)?;
        let framed = if self.config.compressed { gzip(&body)? } else { body };
        self.write_atomic(&framed).await?;
        tracing::info!(total = doc.events.len(), "appended to sync file");
        Ok(())
    }

    /// SHA-256 of the file's on-disk bytes, hex-encoded. `None` if the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SyncFileError::Io`] if the file exists but cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn checksum(&self) -> Result<Option<String>, SyncFileError> {
        let Some(bytes) = self.read_bytes_raw().await? else {
            return Ok(None);
        };
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(Some(format!("{:x}", hasher.finalize())))
    }

    /// `true` if the cached checksum is absent or differs from the
    /// current on-disk checksum.
    ///
    /// # Errors
    ///
    /// Returns [`SyncFileError::Io`] if the file exists but cannot be read.
    pub async fn has_changed(&self) -> Result<bool, SyncFileError> {
        let current = self.checksum().await?;
        let cached = self.cached_checksum.read().await;
        Ok(*cached != current)
    }

    /// Recompute and store the current checksum for the next
    /// [`Self::has_changed`] call.
    ///
    /// # Errors
    ///
    /// Returns [`SyncFileError::Io`] if the file exists but cannot be read.
    pub async fn cache_checksum(&self) -> Result<(), SyncFileError> {
        let current = self.checksum().await?;
        *self.cached_checksum.write().await = current;
        Ok(())
    }

    async fn read_bytes(&self) -> Result<Option<Vec<u8>>, SyncFileError> {
        let Some(raw) = self.read_bytes_raw().await? else {
            return Ok(None);
        };
        if self.config.compressed {
            Ok(Some(gunzip(&raw)?))
        } else {
            Ok(Some(raw))
        }
    }

    async fn read_bytes_raw(&self) -> Result<Option<Vec<u8>>, SyncFileError> {
        match tokio::fs::read(&self.config.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_atomic(&self, bytes: &[u8]) -> Result<(), SyncFileError> {
        let dir = self.config.path.parent().unwrap_or_else(|| Path::new("."));
        let tmp = tmp_path(&self.config.path);
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.config.path).await?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

fn gzip(bytes: &[u8]) -> Result<Vec<u8>, SyncFileError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    Ok(encoder.finish()?)
}

fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, SyncFileError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
