//! Handlers for the expiry scans.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/documents/expiring` | `?category=all\|employee\|branch\|vehicle`; due within 30 days |
//! | `GET`  | `/documents/expired`  | Same filter; already past |

use axum::extract::State;
use branchdesk_core::{
  branch::Branch,
  employee::Employee,
  expiry::{Category, ExpiringDocument, ScanMode, scan},
  store::{DocumentStore, Query},
};
use serde::Deserialize;

use crate::{
  ApiState, today,
  error::ApiError,
  extract::{ApiJson, ApiQuery},
};

#[derive(Debug, Default, Deserialize)]
pub struct ScanParams {
  #[serde(default)]
  pub category: String,
}

async fn run<S: DocumentStore>(
  state: &ApiState<S>,
  params: ScanParams,
  mode: ScanMode,
) -> Result<ApiJson<Vec<ExpiringDocument>>, ApiError> {
  let category: Category = params.category.parse()?;

  let employees = if category.needs_employees() {
    state
      .store
      .find::<Employee>(Query::all())
      .await
      .map_err(ApiError::store)?
  } else {
    Vec::new()
  };
  let branches = if category.needs_branches() {
    state
      .store
      .find::<Branch>(Query::all())
      .await
      .map_err(ApiError::store)?
  } else {
    Vec::new()
  };

  Ok(ApiJson(scan(&employees, &branches, category, mode, today())))
}

/// `GET /documents/expiring[?category=<category>]`
pub async fn expiring<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiQuery(params): ApiQuery<ScanParams>,
) -> Result<ApiJson<Vec<ExpiringDocument>>, ApiError> {
  run(&state, params, ScanMode::Expiring).await
}

/// `GET /documents/expired[?category=<category>]`
pub async fn expired<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiQuery(params): ApiQuery<ScanParams>,
) -> Result<ApiJson<Vec<ExpiringDocument>>, ApiError> {
  run(&state, params, ScanMode::Expired).await
}
