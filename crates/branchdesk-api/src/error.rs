//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is reported as `{"success": false, "message": ..., "error": ...}`
//! where `error` carries the underlying detail for internal failures only.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or malformed input.
  #[error("{0}")]
  Validation(String),

  /// A unique key (email, phone, license number) is already taken.
  #[error("{0}")]
  Duplicate(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  NotFound(String),

  /// Concurrent writers kept invalidating this request's writes.
  #[error("{0}")]
  Conflict(String),

  #[error("precondition failed")]
  PreconditionFailed,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    ApiError::Store(Box::new(e))
  }

  pub fn not_found(what: &str) -> Self { ApiError::NotFound(format!("{what} not found")) }
}

impl From<branchdesk_core::Error> for ApiError {
  fn from(e: branchdesk_core::Error) -> Self { ApiError::Validation(e.to_string()) }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { ApiError::Validation(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message, detail) = match &self {
      ApiError::Validation(m) | ApiError::Duplicate(m) => {
        (StatusCode::BAD_REQUEST, m.clone(), None)
      }
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone(), None),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone(), None),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone(), None),
      ApiError::PreconditionFailed => {
        (StatusCode::PRECONDITION_FAILED, "Precondition Failed".to_owned(), None)
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_owned(), Some(e.to_string()))
      }
    };
    let body = match detail {
      Some(error) => json!({ "success": false, "message": message, "error": error }),
      None => json!({ "success": false, "message": message }),
    };
    (status, Json(body)).into_response()
  }
}
