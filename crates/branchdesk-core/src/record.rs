//! Stored document envelopes.
//!
//! Every collection holds plain serde documents. The store wraps each one in
//! a [`Record`] carrying its identity, a version counter used for optimistic
//! concurrency, and server-assigned timestamps.

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Collections ─────────────────────────────────────────────────────────────

/// The named collections of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Users,
  Employees,
  TempEmployees,
  Branches,
  Vacations,
  DailyExpenditures,
  MonthlySavings,
  Activities,
}

impl Collection {
  /// The value stored in the `collection` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Users => "users",
      Self::Employees => "employees",
      Self::TempEmployees => "temp_employees",
      Self::Branches => "branches",
      Self::Vacations => "vacations",
      Self::DailyExpenditures => "daily_expenditures",
      Self::MonthlySavings => "monthly_savings",
      Self::Activities => "activities",
    }
  }
}

/// A type that lives in exactly one collection.
pub trait Document:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  const COLLECTION: Collection;
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A document as persisted: identity and bookkeeping plus the document body,
/// flattened together on the wire.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<D> {
  pub id:         Uuid,
  #[serde(flatten)]
  pub doc:        D,
  /// Incremented by the store on every successful replace.
  pub version:    u64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl<D> Record<D> {
  pub fn map<T>(self, f: impl FnOnce(D) -> T) -> Record<T> {
    Record {
      id:         self.id,
      doc:        f(self.doc),
      version:    self.version,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

// ─── Merge patch ─────────────────────────────────────────────────────────────

/// Overlay the top-level keys of `patch` onto `doc`, the way a shallow object
/// assignment would, and re-validate the result as a `D`.
///
/// Keys that do not belong to `D` (including `id`, `version` and the
/// timestamps) are ignored.
pub fn merge_patch<D: Document>(doc: &D, patch: Value) -> Result<D> {
  let Value::Object(patch) = patch else {
    return Err(Error::PatchNotObject);
  };
  let mut merged = match serde_json::to_value(doc)? {
    Value::Object(map) => map,
    _ => return Err(Error::PatchNotObject),
  };
  for (key, value) in patch {
    merged.insert(key, value);
  }
  Ok(serde_json::from_value(Value::Object(merged))?)
}

#[cfg(test)]
mod tests {
  use serde::Deserialize;
  use serde_json::json;

  use super::*;

  #[derive(Debug, Clone, Serialize, Deserialize)]
  #[serde(rename_all = "camelCase")]
  struct Note {
    title: String,
    body:  Option<String>,
  }

  impl Document for Note {
    const COLLECTION: Collection = Collection::Activities;
  }

  #[test]
  fn merge_patch_overrides_only_sent_keys() {
    let note = Note { title: "a".into(), body: Some("keep".into()) };
    let merged = merge_patch(&note, json!({ "title": "b", "id": "ignored" })).unwrap();
    assert_eq!(merged.title, "b");
    assert_eq!(merged.body.as_deref(), Some("keep"));
  }

  #[test]
  fn merge_patch_rejects_non_objects() {
    let note = Note { title: "a".into(), body: None };
    assert!(matches!(merge_patch(&note, json!([1, 2])), Err(Error::PatchNotObject)));
  }

  #[test]
  fn record_flattens_document_fields() {
    let record = Record {
      id:         Uuid::nil(),
      doc:        Note { title: "t".into(), body: None },
      version:    3,
      created_at: DateTime::<Utc>::UNIX_EPOCH,
      updated_at: DateTime::<Utc>::UNIX_EPOCH,
    };
    let v = serde_json::to_value(&record).unwrap();
    assert_eq!(v["title"], "t");
    assert_eq!(v["version"], 3);
    assert!(v.get("doc").is_none());
    assert!(v.get("createdAt").is_some());
  }
}
