//! Calendar-date parsing shared by every document type.
//!
//! Dates are stored and emitted as `YYYY-MM-DD`. Clients are allowed to send
//! full RFC 3339 timestamps (the UTC calendar date is kept) and empty strings,
//! which count as "no date".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de};

use crate::{Error, Result};

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse(s: &str) -> Result<NaiveDate> {
  let s = s.trim();
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .or_else(|| {
      DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
    .ok_or_else(|| Error::InvalidDate(s.to_owned()))
}

/// `deserialize_with` for `Option<NaiveDate>` fields.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  match raw.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => parse(s).map(Some).map_err(de::Error::custom),
  }
}

/// `deserialize_with` for mandatory `NaiveDate` fields.
pub fn required<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  parse(&raw).map_err(de::Error::custom)
}

/// `deserialize_with` for patch fields that distinguish "absent" (outer
/// `None`, via `#[serde(default)]`) from "explicitly cleared" (`Some(None)`).
pub fn patch<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
  D: Deserializer<'de>,
{
  optional(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Deserialize)]
  struct Probe {
    #[serde(default, deserialize_with = "optional")]
    at:      Option<NaiveDate>,
    #[serde(default, deserialize_with = "patch")]
    cleared: Option<Option<NaiveDate>>,
  }

  #[test]
  fn parses_plain_dates_and_timestamps() {
    let d = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    assert_eq!(parse("2026-03-09").unwrap(), d);
    assert_eq!(parse("2026-03-09T00:00:00.000Z").unwrap(), d);
    assert!(parse("09/03/2026").is_err());
  }

  #[test]
  fn empty_string_is_absent() {
    let p: Probe = serde_json::from_str(r#"{"at": ""}"#).unwrap();
    assert!(p.at.is_none());
  }

  #[test]
  fn patch_distinguishes_absent_from_null() {
    let absent: Probe = serde_json::from_str("{}").unwrap();
    assert_eq!(absent.cleared, None);

    let cleared: Probe = serde_json::from_str(r#"{"cleared": null}"#).unwrap();
    assert_eq!(cleared.cleared, Some(None));

    let set: Probe = serde_json::from_str(r#"{"cleared": "2026-01-02"}"#).unwrap();
    assert_eq!(set.cleared, Some(NaiveDate::from_ymd_opt(2026, 1, 2)));
  }
}
