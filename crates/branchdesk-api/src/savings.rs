//! Handlers for `/monthly-savings/{branchId}/{month}/{year}`.
//!
//! `GET` returns the stored savings, or an empty list when nothing was saved
//! for that month. `PUT` replaces the list, creating the record if needed.

use axum::extract::State;
use branchdesk_core::{
  finance::{MonthlySavings, Saving},
  store::{DocumentStore, Query},
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  retry::modify,
};

fn key(branch_id: Uuid, month: u32, year: i32) -> Query {
  Query::all()
    .eq("branchId", branch_id.to_string())
    .eq("month", month)
    .eq("year", year)
}

/// `GET /monthly-savings/{branchId}/{month}/{year}`
pub async fn get_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath((branch_id, month, year)): ApiPath<(Uuid, u32, i32)>,
) -> Result<ApiJson<Value>, ApiError> {
  let found = state
    .store
    .find_one::<MonthlySavings>(key(branch_id, month, year))
    .await
    .map_err(ApiError::store)?;
  let body = match found {
    Some(record) => serde_json::to_value(record).map_err(ApiError::store)?,
    None => json!({ "branchId": branch_id, "month": month, "year": year, "savings": [] }),
  };
  Ok(ApiJson(body))
}

#[derive(Debug, Deserialize)]
pub struct SavingsBody {
  #[serde(default)]
  pub savings: Vec<Saving>,
}

/// `PUT /monthly-savings/{branchId}/{month}/{year}`
pub async fn upsert<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath((branch_id, month, year)): ApiPath<(Uuid, u32, i32)>,
  ApiJson(body): ApiJson<SavingsBody>,
) -> Result<ApiJson<Value>, ApiError> {
  let doc = MonthlySavings::new(branch_id, month, year, body.savings)?;
  let store = &*state.store;

  let existing = store
    .find_one::<MonthlySavings>(key(branch_id, month, year))
    .await
    .map_err(ApiError::store)?;
  let record = match existing {
    Some(existing) => {
      modify::<_, MonthlySavings>(store, existing.id, "Monthly savings", |stored| {
        stored.savings = doc.savings.clone();
        Ok(())
      })
      .await?
    }
    None => store.insert(doc).await.map_err(ApiError::store)?,
  };
  Ok(ApiJson(serde_json::to_value(record).map_err(ApiError::store)?))
}
