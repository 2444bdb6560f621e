//! References to files held in object storage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A file uploaded elsewhere; only its location is stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
  #[serde(default)]
  pub url:         String,
  #[serde(default)]
  pub file_name:   String,
  #[serde(default)]
  pub uploaded_at: Option<DateTime<Utc>>,
}

/// Named attachments keyed by slot, e.g. `"passportCopy"` or `"crDocument"`.
pub type AttachmentMap = BTreeMap<String, Attachment>;

/// `deserialize_with` for attachment maps. Clients send `null` for empty
/// slots; those are dropped.
pub fn slots<'de, D>(deserializer: D) -> Result<AttachmentMap, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<BTreeMap<String, Option<Attachment>>> = Option::deserialize(deserializer)?;
  Ok(
    raw
      .unwrap_or_default()
      .into_iter()
      .filter_map(|(slot, a)| a.map(|a| (slot, a)))
      .collect(),
  )
}

/// Overlay `incoming` onto `existing` slot by slot. Slots the caller did not
/// send are kept.
pub fn merge_attachments(existing: &mut AttachmentMap, incoming: AttachmentMap) {
  existing.extend(incoming);
}

#[cfg(test)]
mod tests {
  use super::*;

  fn attachment(url: &str) -> Attachment {
    Attachment { url: url.into(), file_name: String::new(), uploaded_at: None }
  }

  #[test]
  fn merge_keeps_unsent_slots() {
    let mut existing = AttachmentMap::new();
    existing.insert("visa".into(), attachment("s3://old-visa"));
    existing.insert("contract".into(), attachment("s3://contract"));

    let mut incoming = AttachmentMap::new();
    incoming.insert("visa".into(), attachment("s3://new-visa"));
    merge_attachments(&mut existing, incoming);

    assert_eq!(existing["visa"].url, "s3://new-visa");
    assert_eq!(existing["contract"].url, "s3://contract");
  }

  #[derive(Deserialize)]
  struct Holder {
    #[serde(default, deserialize_with = "slots")]
    documents: AttachmentMap,
  }

  #[test]
  fn null_slots_are_dropped() {
    let h: Holder = serde_json::from_str(
      r#"{"documents": {"crDocument": null, "logoDocument": {"url": "s3://logo"}}}"#,
    )
    .unwrap();
    assert_eq!(h.documents.len(), 1);
    assert_eq!(h.documents["logoDocument"].url, "s3://logo");
  }
}
