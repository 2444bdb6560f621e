//! Handlers for `/temp-employees` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/temp-employees` | |
//! | `POST`   | `/temp-employees` | Unique email |
//! | `PUT`    | `/temp-employees/{id}` | Top-level keys of the body overwrite the stored ones |
//! | `DELETE` | `/temp-employees/{id}` | |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use branchdesk_core::{
  employee::TempEmployee,
  record::{Record, merge_patch},
  store::{DocumentStore, Query},
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  retry::modify,
};

const WHAT: &str = "Temporary employee";

async fn ensure_email_free<S: DocumentStore>(
  store: &S,
  email: &str,
  except: Option<Uuid>,
) -> Result<(), ApiError> {
  let taken = store
    .find::<TempEmployee>(Query::all().eq("email", email))
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .any(|r| Some(r.id) != except);
  if taken {
    return Err(ApiError::Duplicate(format!(
      "Email '{email}' is already registered. Please use a different email address."
    )));
  }
  Ok(())
}

/// `GET /temp-employees`
pub async fn list<S: DocumentStore>(
  State(state): State<ApiState<S>>,
) -> Result<ApiJson<Vec<Record<TempEmployee>>>, ApiError> {
  let all = state
    .store
    .find::<TempEmployee>(Query::all())
    .await
    .map_err(ApiError::store)?;
  Ok(ApiJson(all))
}

/// `POST /temp-employees`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(employee): ApiJson<TempEmployee>,
) -> Result<impl IntoResponse, ApiError> {
  let employee = employee.validate()?;
  ensure_email_free(&*state.store, &employee.email, None).await?;
  let record = state.store.insert(employee).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, ApiJson(record)))
}

/// `PUT /temp-employees/{id}`
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(patch): ApiJson<Value>,
) -> Result<ApiJson<Record<TempEmployee>>, ApiError> {
  let store = &*state.store;
  if let Some(email) = patch.get("email").and_then(Value::as_str) {
    ensure_email_free(store, email.trim(), Some(id)).await?;
  }
  let record = modify::<_, TempEmployee>(store, id, WHAT, |doc| {
    *doc = merge_patch(doc, patch.clone())?.validate()?;
    Ok(())
  })
  .await?;
  Ok(ApiJson(record))
}

/// `DELETE /temp-employees/{id}`
pub async fn delete_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  if !state
    .store
    .delete::<TempEmployee>(id)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::not_found(WHAT));
  }
  Ok(ApiJson(json!({ "message": "Temporary employee removed" })))
}
