//! Remote Event Processor — applies an already-sorted batch of events
//! one at a time, never letting a single bad event abort the rest.

use sync_core::Event;
use sync_store::ProjectionRecorder;

/// Applies `events` (assumed pre-sorted by `(timestamp, eventId)`) to
/// `recorder`, logging and skipping any event whose projection fails.
///
/// Returns the number of events actually applied (i.e. not already
/// processed, and not failing).
#[tracing::instrument(skip(recorder, events), fields(batch_size = events.len()))]
pub async fn process_batch(recorder: &ProjectionRecorder, events: &[Event]) -> usize {
    let mut applied = 0;
    for event in events {
        match recorder.project_once(event).await {
            Ok(true) => applied += 1,
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(event_id = %event.event_id, error = %err, "failed to project event, will retry next cycle");
            }
        }
    }
    applied
}
