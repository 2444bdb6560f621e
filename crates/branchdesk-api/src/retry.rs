//! Optimistic read-modify-write.
//!
//! Writes are version-checked by the store. When another request got there
//! first the record is reloaded and the edit replayed, up to
//! [`MAX_ATTEMPTS`] times.

use std::future::Future;

use branchdesk_core::{
  record::{Document, Record},
  store::{DocumentStore, WriteOutcome},
};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

pub const MAX_ATTEMPTS: usize = 5;

fn contention() -> ApiError {
  ApiError::Conflict("The record was modified concurrently, please retry".to_owned())
}

/// Run `attempt` until it yields a value. `Ok(None)` means its write was
/// stale and the whole attempt should be repeated against fresh state.
pub async fn with_retry<T, F, Fut>(mut attempt: F) -> Result<T, ApiError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<Option<T>, ApiError>>,
{
  for n in 1..=MAX_ATTEMPTS {
    if let Some(done) = attempt().await? {
      return Ok(done);
    }
    debug!(attempt = n, "stale write, retrying");
  }
  Err(contention())
}

/// Load record `id`, apply `edit` to its document and write it back.
/// `what` names the record in the 404 message.
pub async fn modify<S, D>(
  store: &S,
  id: Uuid,
  what: &str,
  mut edit: impl FnMut(&mut D) -> Result<(), ApiError> + Send,
) -> Result<Record<D>, ApiError>
where
  S: DocumentStore,
  D: Document,
{
  for n in 1..=MAX_ATTEMPTS {
    let Some(mut record) = store.get::<D>(id).await.map_err(ApiError::store)? else {
      return Err(ApiError::not_found(what));
    };
    edit(&mut record.doc)?;
    match store.replace(record).await.map_err(ApiError::store)? {
      WriteOutcome::Written(written) => return Ok(written),
      WriteOutcome::Missing(_) => return Err(ApiError::not_found(what)),
      WriteOutcome::Stale(_) => debug!(%id, attempt = n, "stale write, reloading"),
    }
  }
  Err(contention())
}

/// `outcome` as a retry signal: stale or vanished records ask for another
/// attempt.
pub fn written<T>(outcome: WriteOutcome<T>) -> Option<T> {
  match outcome {
    WriteOutcome::Written(t) => Some(t),
    WriteOutcome::Missing(id) | WriteOutcome::Stale(id) => {
      debug!(%id, "write lost a race");
      None
    }
  }
}
