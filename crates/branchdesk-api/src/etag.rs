//! ETags for branch resources.
//!
//! A branch's ETag is a SHA-256 hash over its id and store version, so it
//! changes on every successful write.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Compute the quoted ETag for a record.
pub fn compute_etag(id: Uuid, version: u64) -> String {
  let mut hasher = Sha256::new();
  hasher.update(id.as_bytes());
  hasher.update(version.to_le_bytes());
  let hash = hasher.finalize();
  format!("\"{}\"", hex::encode(hash))
}

/// Whether an `If-Match` header value admits `current`. Accepts `*`, weak
/// validators and comma-separated lists.
pub fn if_match_allows(header: &str, current: &str) -> bool {
  let current = strip_etag_quotes(current);
  header.split(',').map(str::trim).any(|candidate| {
    candidate == "*" || strip_etag_quotes(candidate.trim_start_matches("W/")) == current
  })
}

fn strip_etag_quotes(s: &str) -> &str { s.trim_matches('"') }
