//! Fire-and-forget audit trail.
//!
//! Handlers hand [`Activity`] entries to [`ActivityLog::record`], which
//! queues them for a single background task that writes them to the store in
//! order. A failed write is logged and dropped; it never reaches the caller.

use std::sync::Arc;

use branchdesk_core::{activity::Activity, store::DocumentStore};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ActivityLog {
  tx: mpsc::UnboundedSender<Activity>,
}

impl ActivityLog {
  /// Start the writer task. It exits once every `ActivityLog` clone has been
  /// dropped and the queue is drained.
  pub fn spawn<S>(store: Arc<S>) -> (Self, JoinHandle<()>)
  where
    S: DocumentStore + 'static,
  {
    let (tx, mut rx) = mpsc::unbounded_channel::<Activity>();
    let worker = tokio::spawn(async move {
      while let Some(entry) = rx.recv().await {
        let kind = entry.kind;
        match store.insert(entry).await {
          Ok(record) => debug!(id = %record.id, ?kind, "activity recorded"),
          Err(e) => warn!(error = %e, ?kind, "failed to record activity"),
        }
      }
      debug!("activity log closed");
    });
    (Self { tx }, worker)
  }

  pub fn record(&self, entry: Activity) {
    if let Err(e) = self.tx.send(entry) {
      warn!(kind = ?e.0.kind, "activity log is closed; entry dropped");
    }
  }
}
