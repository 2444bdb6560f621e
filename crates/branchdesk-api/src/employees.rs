//! Handlers for `/employees` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/employees` | |
//! | `POST`   | `/employees` | Creates, or updates the employee with the same email |
//! | `GET`    | `/employees/{id}` | |
//! | `PUT`    | `/employees/{id}` | Blank fields keep their stored value |
//! | `DELETE` | `/employees/{id}` | |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use branchdesk_core::{
  activity::{Activity, ActivityType, EntityType},
  attachment::merge_attachments,
  employee::{Employee, EmployeeUpdate},
  record::Record,
  store::{DocumentStore, Query},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  retry::modify,
};

/// Reject `email` or `phone` when they belong to an employee other than
/// `except`.
async fn ensure_unique<S: DocumentStore>(
  store: &S,
  except: Option<Uuid>,
  email: Option<&str>,
  phone: Option<&str>,
) -> Result<(), ApiError> {
  if let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) {
    let taken = store
      .find::<Employee>(Query::all().eq("email", email))
      .await
      .map_err(ApiError::store)?
      .into_iter()
      .any(|r| Some(r.id) != except);
    if taken {
      return Err(ApiError::Duplicate(format!(
        "Email '{email}' is already registered. Please use a different email address."
      )));
    }
  }
  if let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) {
    let taken = store
      .find::<Employee>(Query::all().eq("phone", phone))
      .await
      .map_err(ApiError::store)?
      .into_iter()
      .any(|r| Some(r.id) != except);
    if taken {
      return Err(ApiError::Duplicate(format!(
        "Phone number '{phone}' is already registered. Please use a different phone number."
      )));
    }
  }
  Ok(())
}

fn activity(kind: ActivityType, verb: &str, record: &Record<Employee>) -> Activity {
  Activity::new(kind, format!("Employee {} was {verb}", record.doc.name)).about(
    EntityType::Employee,
    record.id,
    &record.doc.name,
  )
}

// ─── List / get ──────────────────────────────────────────────────────────────

/// `GET /employees`
pub async fn list<S: DocumentStore>(
  State(state): State<ApiState<S>>,
) -> Result<ApiJson<Vec<Record<Employee>>>, ApiError> {
  let employees = state
    .store
    .find::<Employee>(Query::all())
    .await
    .map_err(ApiError::store)?;
  Ok(ApiJson(employees))
}

/// `GET /employees/{id}`
pub async fn get_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<ApiJson<Record<Employee>>, ApiError> {
  state
    .store
    .get::<Employee>(id)
    .await
    .map_err(ApiError::store)?
    .map(ApiJson)
    .ok_or_else(|| ApiError::not_found("Employee"))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /employees`
///
/// Email identifies the employee: posting an email that already exists
/// overwrites that record (keeping attachments the body does not mention)
/// instead of creating a second one.
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(employee): ApiJson<Employee>,
) -> Result<impl IntoResponse, ApiError> {
  let employee = employee.validate()?;
  let store = &*state.store;

  let existing = store
    .find_one::<Employee>(Query::all().eq("email", employee.email.as_str()))
    .await
    .map_err(ApiError::store)?;
  ensure_unique(store, existing.as_ref().map(|r| r.id), None, employee.phone.as_deref()).await?;

  match existing {
    Some(existing) => {
      let updated = modify::<_, Employee>(store, existing.id, "Employee", |doc| {
        let mut next = employee.clone();
        let mut documents = std::mem::take(&mut doc.documents);
        merge_attachments(&mut documents, std::mem::take(&mut next.documents));
        next.documents = documents;
        *doc = next;
        Ok(())
      })
      .await?;
      state
        .activity
        .record(activity(ActivityType::EmployeeUpdated, "updated", &updated));
      Ok((
        StatusCode::OK,
        ApiJson(json!({
          "success": true,
          "message": "Employee updated successfully",
          "employee": updated,
        })),
      ))
    }
    None => {
      let created = store.insert(employee).await.map_err(ApiError::store)?;
      state
        .activity
        .record(activity(ActivityType::EmployeeCreated, "created", &created));
      Ok((
        StatusCode::CREATED,
        ApiJson(json!({
          "success": true,
          "message": "Employee created successfully",
          "employee": created,
        })),
      ))
    }
  }
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /employees/{id}`
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(update): ApiJson<EmployeeUpdate>,
) -> Result<ApiJson<Record<Employee>>, ApiError> {
  let store = &*state.store;
  ensure_unique(store, Some(id), update.email.as_deref(), update.phone.as_deref()).await?;

  let updated = modify::<_, Employee>(store, id, "Employee", |doc| {
    update.clone().apply(doc);
    *doc = doc.clone().validate()?;
    Ok(())
  })
  .await?;

  state
    .activity
    .record(activity(ActivityType::EmployeeUpdated, "updated", &updated));
  Ok(ApiJson(updated))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /employees/{id}`
pub async fn delete_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let record = state
    .store
    .get::<Employee>(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("Employee"))?;
  state
    .store
    .delete::<Employee>(id)
    .await
    .map_err(ApiError::store)?;

  state
    .activity
    .record(activity(ActivityType::EmployeeDeleted, "deleted", &record));
  Ok(ApiJson(json!({ "message": "Employee removed" })))
}
