//! Error types for `branchdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("unknown document category: {0:?}")]
  UnknownCategory(String),

  #[error("{0} is required")]
  MissingField(&'static str),

  #[error("{field} must be between {min} and {max}")]
  OutOfRange { field: &'static str, min: f64, max: f64 },

  #[error("endDate must not be before startDate")]
  EndBeforeStart,

  #[error("patch body must be a JSON object")]
  PatchNotObject,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
