//! Handlers for `/vacations` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/vacations` | Latest start date first; status as of today |
//! | `POST`   | `/vacations` | `employeeId`, `startDate`, `endDate` required |
//! | `PUT`    | `/vacations/{id}` | Omitted fields keep their value |
//! | `DELETE` | `/vacations/{id}` | |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use branchdesk_core::{
  date,
  employee::Employee,
  record::Record,
  store::{Direction, DocumentStore, Query},
  vacation::{Vacation, status_on},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath, optional_id},
  retry::modify,
  today,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationBody {
  #[serde(default, alias = "employee")]
  pub employee_id: Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub start_date:  Option<NaiveDate>,
  #[serde(default, deserialize_with = "date::optional")]
  pub end_date:    Option<NaiveDate>,
  #[serde(default)]
  pub reason:      Option<String>,
}

async fn employee_name<S: DocumentStore>(store: &S, id: Uuid) -> Result<String, ApiError> {
  store
    .get::<Employee>(id)
    .await
    .map_err(ApiError::store)?
    .map(|e| e.doc.name)
    .ok_or_else(|| ApiError::not_found("Employee"))
}

/// `GET /vacations`
pub async fn list<S: DocumentStore>(
  State(state): State<ApiState<S>>,
) -> Result<ApiJson<Vec<Record<Vacation>>>, ApiError> {
  let today = today();
  let vacations = state
    .store
    .find::<Vacation>(Query::all().order_by("startDate", Direction::Desc))
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|mut r| {
      r.doc.status = status_on(r.doc.start_date, r.doc.end_date, today);
      r
    })
    .collect();
  Ok(ApiJson(vacations))
}

/// `POST /vacations`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<VacationBody>,
) -> Result<impl IntoResponse, ApiError> {
  let employee_id = optional_id("employeeId", body.employee_id.as_deref())?;
  let (Some(employee_id), Some(start), Some(end)) = (employee_id, body.start_date, body.end_date)
  else {
    return Err(ApiError::Validation(
      "Please provide employee, start date, and end date".to_owned(),
    ));
  };
  let name = employee_name(&*state.store, employee_id).await?;
  let vacation = Vacation::new(employee_id, name, start, end, body.reason, today())?;
  let record = state.store.insert(vacation).await.map_err(ApiError::store)?;
  Ok((
    StatusCode::CREATED,
    ApiJson(json!({
      "success": true,
      "message": "Vacation added successfully",
      "vacation": record,
    })),
  ))
}

/// `PUT /vacations/{id}`
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<VacationBody>,
) -> Result<impl IntoResponse, ApiError> {
  let store = &*state.store;
  let new_employee = match optional_id("employeeId", body.employee_id.as_deref())? {
    Some(employee_id) => Some((employee_id, employee_name(store, employee_id).await?)),
    None => None,
  };
  let today = today();

  let record = modify::<_, Vacation>(store, id, "Vacation", |doc| {
    let (employee_id, name) = new_employee
      .clone()
      .unwrap_or_else(|| (doc.employee_id, doc.employee_name.clone()));
    let reason = body.reason.clone().or_else(|| doc.reason.clone());
    *doc = Vacation::new(
      employee_id,
      name,
      body.start_date.unwrap_or(doc.start_date),
      body.end_date.unwrap_or(doc.end_date),
      reason,
      today,
    )?;
    Ok(())
  })
  .await?;

  Ok(ApiJson(json!({
    "success": true,
    "message": "Vacation updated successfully",
    "vacation": record,
  })))
}

/// `DELETE /vacations/{id}`
pub async fn delete_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  if !state
    .store
    .delete::<Vacation>(id)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::not_found("Vacation"));
  }
  Ok(ApiJson(json!({ "message": "Vacation removed" })))
}
