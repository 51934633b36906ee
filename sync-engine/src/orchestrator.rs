//! Sync Orchestrator — one `full_sync()` cycle, coordinating the file
//! manager, the remote batch processor, and the local event store in the
//! strict order the deferred-commit handshake between replicas depends on.

use sqlx::SqlitePool;

use sync_core::SyncError;
use sync_file::SyncFileManager;
use sync_store::{event_store, ProjectionRecorder};

use crate::processor::process_batch;

/// Coordinates one replica's sync cycle against the shared file.
pub struct SyncOrchestrator {
    pool: SqlitePool,
    file: SyncFileManager,
    recorder: ProjectionRecorder,
}

/// Summary of one `full_sync()` cycle, useful for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub downloaded: usize,
    pub applied: usize,
    pub uploaded: usize,
}

impl SyncOrchestrator {
    #[must_use]
    pub const fn new(pool: SqlitePool, file: SyncFileManager, recorder: ProjectionRecorder) -> Self {
        Self { pool, file, recorder }
    }

    /// Run one sync cycle:
    ///
    /// 1. If the shared file changed since last cycle, read and apply its
    ///    events via the remote event processor.
    /// 2. Collect this replica's uncommitted local events and append them
    ///    to the shared file.
    /// 3. Cache the file's checksum for the next call to this method.
    ///
    /// Safe to cancel between steps or to call twice in a row: both are
    /// idempotent by construction.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if reading/writing the shared file or a local
    /// store query fails outside the per-event projection loop (which logs
    /// and continues instead of failing the cycle).
    #[tracing::instrument(skip(self))]
    pub async fn full_sync(&self) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();

        if self.file.has_changed().await? {
            let remote_events = self.file.read().await?;
            report.downloaded = remote_events.len();
            report.applied = process_batch(&self.recorder, &remote_events).await;
        }

        let local_events = event_store::collect_uncommitted(&self.pool).await?;
        if !local_events.is_empty() {
            report.uploaded = local_events.len();
            self.file.append(&local_events).await?;
        }

        self.file.cache_checksum().await?;

        tracing::info!(
            downloaded = report.downloaded,
            applied = report.applied,
            uploaded = report.uploaded,
            "sync cycle complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sync_core::{EventId, EventType, ExpenseId, Payload};
    use sync_file::SyncFileConfig;
    use sync_store::schema::bootstrap;

    async fn memory_orchestrator(path: std::path::PathBuf) -> SyncOrchestrator {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        bootstrap(&pool).await.unwrap();
        let file = SyncFileManager::new(SyncFileConfig::new(path, false));
        let recorder = ProjectionRecorder::new(pool.clone());
        recorder.warm().await.unwrap();
        SyncOrchestrator::new(pool, file, recorder)
    }

    fn created_event(expense_id: ExpenseId, amount: i64, updated_at: i64) -> sync_core::Event {
        let payload = Payload {
            expense_id,
            description: None,
            amount,
            category: None,
            date: None,
            updated_at,
            deleted: None,
        };
        sync_core::Event::new_local(EventId::new(), updated_at, EventType::Created, expense_id, payload)
    }

    #[tokio::test]
    async fn local_events_upload_and_then_flip_committed_next_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = memory_orchestrator(dir.path().join("sync.json")).await;
        event_store::append(&orchestrator.pool, &created_event(ExpenseId::new(), 100, 1000))
            .await
            .unwrap();

        let first = orchestrator.full_sync().await.unwrap();
        assert_eq!(first.uploaded, 1);

        // Uploaded but not yet committed: it round-trips back as a remote
        // event and flips to committed only once the recorder applies it.
        let second = orchestrator.full_sync().await.unwrap();
        assert_eq!(second.downloaded, 1);
        assert_eq!(second.applied, 1);
        assert!(event_store::collect_uncommitted(&orchestrator.pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_sync_of_unchanged_file_applies_nothing_twice() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = memory_orchestrator(dir.path().join("sync.json")).await;
        event_store::append(&orchestrator.pool, &created_event(ExpenseId::new(), 100, 1000))
            .await
            .unwrap();
        orchestrator.full_sync().await.unwrap();
        orchestrator.full_sync().await.unwrap();

        let third = orchestrator.full_sync().await.unwrap();
        assert_eq!(third.downloaded, 0);
        assert_eq!(third.applied, 0);
        assert_eq!(third.uploaded, 0);
    }
}
