//! Handlers for `/expenditures` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/expenditures` | `?branchId=`, `?month=&year=`; newest date first |
//! | `GET`    | `/expenditures/analytics` | Same filters; totals and daily averages |
//! | `POST`   | `/expenditures` | Totals are derived server-side |
//! | `PUT`    | `/expenditures/{id}` | Top-level keys overwrite; totals re-derived |
//! | `DELETE` | `/expenditures/{id}` | |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use branchdesk_core::{
  finance::{DailyExpenditure, ExpenditureSummary, GroupBy, analytics as summarise, month_range},
  record::{Record, merge_patch},
  store::{Direction, DocumentStore, Query},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery, optional_id},
  retry::modify,
};

const WHAT: &str = "Expenditure";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
  pub branch_id: Option<String>,
  pub month:     Option<u32>,
  pub year:      Option<i32>,
}

impl Filter {
  /// The store query for this filter, and whether it names a branch.
  fn query(&self) -> Result<(Query, bool), ApiError> {
    let mut query = Query::all().order_by("date", Direction::Desc);
    let branch = optional_id("branchId", self.branch_id.as_deref())?;
    if let Some(branch) = branch {
      query = query.eq("branchId", branch.to_string());
    }
    if let (Some(month), Some(year)) = (self.month, self.year) {
      let (first, last) = month_range(month, year)?;
      query = query.between("date", first.to_string(), last.to_string());
    }
    Ok((query, branch.is_some()))
  }
}

/// `GET /expenditures`
pub async fn list<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiQuery(filter): ApiQuery<Filter>,
) -> Result<ApiJson<Vec<Record<DailyExpenditure>>>, ApiError> {
  let (query, _) = filter.query()?;
  let records = state
    .store
    .find::<DailyExpenditure>(query)
    .await
    .map_err(ApiError::store)?;
  Ok(ApiJson(records))
}

/// `GET /expenditures/analytics`
///
/// Grouped by branch id when the filter names a branch, by branch name
/// otherwise.
pub async fn analytics<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiQuery(filter): ApiQuery<Filter>,
) -> Result<ApiJson<Vec<ExpenditureSummary>>, ApiError> {
  let (query, by_branch) = filter.query()?;
  let records = state
    .store
    .find::<DailyExpenditure>(query)
    .await
    .map_err(ApiError::store)?;
  let group_by = if by_branch { GroupBy::BranchId } else { GroupBy::BranchName };
  Ok(ApiJson(summarise(&records, group_by)))
}

/// `POST /expenditures`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(expenditure): ApiJson<DailyExpenditure>,
) -> Result<impl IntoResponse, ApiError> {
  let record = state
    .store
    .insert(expenditure.prepare()?)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, ApiJson(record)))
}

/// `PUT /expenditures/{id}`
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(patch): ApiJson<Value>,
) -> Result<ApiJson<Record<DailyExpenditure>>, ApiError> {
  let record = modify::<_, DailyExpenditure>(&*state.store, id, WHAT, |doc| {
    *doc = merge_patch(doc, patch.clone())?.prepare()?;
    Ok(())
  })
  .await?;
  Ok(ApiJson(record))
}

/// `DELETE /expenditures/{id}`
pub async fn delete_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  if !state
    .store
    .delete::<DailyExpenditure>(id)
    .await
    .map_err(ApiError::store)?
  {
    return Err(ApiError::not_found(WHAT));
  }
  Ok(ApiJson(json!({ "message": "Expenditure removed" })))
}
