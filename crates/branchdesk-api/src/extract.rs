//! Extractors whose rejections use the [`ApiError`] envelope.

use axum::{
  extract::{FromRequest, FromRequestParts},
  response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
  fn into_response(self) -> Response { axum::Json(self.0).into_response() }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Parse an id sent inside a body or query string. Blank means absent.
pub fn optional_id(field: &str, raw: Option<&str>) -> Result<Option<Uuid>, ApiError> {
  match raw.map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => Uuid::parse_str(s)
      .map(Some)
      .map_err(|_| ApiError::Validation(format!("Invalid {field} format"))),
  }
}
