//! Read-only access for guests.
//!
//! The console marks guest sessions with an `x-user-role: guest` header.
//! Such requests may read anything but every mutating method is refused.

use axum::{
  Json,
  extract::Request,
  http::{Method, StatusCode},
  middleware::Next,
  response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

pub const ROLE_HEADER: &str = "x-user-role";

const GUEST_MESSAGE: &str = "You only have authority to view. Contact admin for modifications.";

fn is_mutating(method: &Method) -> bool {
  matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

/// `axum::middleware::from_fn` guard rejecting guest writes with 403.
pub async fn read_only_guard(req: Request, next: Next) -> Response {
  let guest = req
    .headers()
    .get(ROLE_HEADER)
    .is_some_and(|role| role.as_bytes() == b"guest");
  if guest && is_mutating(req.method()) {
    warn!(method = %req.method(), path = %req.uri().path(), "guest write refused");
    return (StatusCode::FORBIDDEN, Json(json!({ "error": GUEST_MESSAGE }))).into_response();
  }
  next.run(req).await
}
