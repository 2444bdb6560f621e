//! Handlers for `/branches` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/branches` | Creates a default "Headquarters" branch when there are none |
//! | `POST`   | `/branches` | 201 with the new branch |
//! | `GET`    | `/branches/{id}` | Sets `ETag` |
//! | `PUT`    | `/branches/{id}` | Patch semantics; honours `If-Match` |
//! | `DELETE` | `/branches/{id}` | |

use axum::{
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use branchdesk_core::{
  activity::{Activity, ActivityType, EntityType},
  branch::{Branch, BranchPatch},
  fleet::{LicenseClash, VehicleInput, replace_vehicles},
  record::Record,
  store::{DocumentStore, Query, WriteOutcome},
};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  ApiState, current_year,
  error::ApiError,
  etag::{compute_etag, if_match_allows},
  extract::{ApiJson, ApiPath},
  retry::MAX_ATTEMPTS,
};

impl From<LicenseClash> for ApiError {
  fn from(clash: LicenseClash) -> Self {
    match clash {
      LicenseClash::Repeated(license) => ApiError::Duplicate(format!(
        "Vehicle with license number '{license}' appears more than once"
      )),
      LicenseClash::HeldElsewhere { license, branch } => ApiError::Duplicate(format!(
        "Vehicle with license number '{license}' already exists in branch '{branch}'"
      )),
    }
  }
}

fn with_etag(record: Record<Branch>) -> impl IntoResponse {
  let etag = compute_etag(record.id, record.version);
  ([(header::ETAG, etag)], ApiJson(record))
}

/// Replace `branch`'s vehicles with `inputs` after checking every license
/// against the other branches.
async fn set_vehicles<S: DocumentStore>(
  store: &S,
  branch: &mut Branch,
  branch_id: Uuid,
  inputs: Vec<VehicleInput>,
) -> Result<(), ApiError> {
  let branches = store
    .find::<Branch>(Query::all())
    .await
    .map_err(ApiError::store)?;
  replace_vehicles(branch, branch_id, inputs, &branches, current_year())?;
  Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /branches`
pub async fn list<S: DocumentStore>(
  State(state): State<ApiState<S>>,
) -> Result<ApiJson<Vec<Record<Branch>>>, ApiError> {
  let branches = state
    .store
    .find::<Branch>(Query::all())
    .await
    .map_err(ApiError::store)?;
  if !branches.is_empty() {
    return Ok(ApiJson(branches));
  }

  let headquarters = state
    .store
    .insert(Branch::headquarters())
    .await
    .map_err(ApiError::store)?;
  info!(id = %headquarters.id, "created default branch");
  state.activity.record(
    Activity::new(
      ActivityType::BranchCreated,
      format!("Default branch \"{}\" was created", headquarters.doc.name),
    )
    .about(EntityType::Branch, headquarters.id, &headquarters.doc.name),
  );
  Ok(ApiJson(vec![headquarters]))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /branches/{id}`
pub async fn get_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let record = state
    .store
    .get::<Branch>(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("Branch"))?;
  Ok(with_etag(record))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /branches`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(mut patch): ApiJson<BranchPatch>,
) -> Result<impl IntoResponse, ApiError> {
  let vehicles = patch.vehicles.take();
  let mut branch = patch.into_branch()?;
  if let Some(inputs) = vehicles {
    set_vehicles(&*state.store, &mut branch, Uuid::nil(), inputs).await?;
  }

  let record = state.store.insert(branch).await.map_err(ApiError::store)?;
  state.activity.record(
    Activity::new(
      ActivityType::BranchCreated,
      format!("Branch \"{}\" was created", record.doc.name),
    )
    .about(EntityType::Branch, record.id, &record.doc.name),
  );
  Ok((StatusCode::CREATED, with_etag(record)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /branches/{id}`
///
/// Without `If-Match` a write that loses a race is replayed on the fresh
/// record. With it, the client asked for exactly the version it saw, so any
/// interleaved write is a 412.
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  headers: HeaderMap,
  ApiJson(patch): ApiJson<BranchPatch>,
) -> Result<impl IntoResponse, ApiError> {
  let if_match = headers
    .get(header::IF_MATCH)
    .and_then(|v| v.to_str().ok())
    .map(str::to_owned);
  let store = &*state.store;

  for attempt in 1..=MAX_ATTEMPTS {
    let mut record = store
      .get::<Branch>(id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::not_found("Branch"))?;
    if let Some(expected) = &if_match
      && !if_match_allows(expected, &compute_etag(record.id, record.version))
    {
      return Err(ApiError::PreconditionFailed);
    }

    let mut patch = patch.clone();
    let vehicles = patch.vehicles.take();
    patch.apply(&mut record.doc)?;
    if let Some(inputs) = vehicles {
      set_vehicles(store, &mut record.doc, id, inputs).await?;
    }

    match store.replace(record).await.map_err(ApiError::store)? {
      WriteOutcome::Written(written) => {
        state.activity.record(
          Activity::new(
            ActivityType::BranchUpdated,
            format!("Branch \"{}\" was updated", written.doc.name),
          )
          .about(EntityType::Branch, written.id, &written.doc.name),
        );
        return Ok(with_etag(written));
      }
      WriteOutcome::Missing(_) => return Err(ApiError::not_found("Branch")),
      WriteOutcome::Stale(_) if if_match.is_some() => return Err(ApiError::PreconditionFailed),
      WriteOutcome::Stale(_) => debug!(%id, attempt, "stale branch write, reloading"),
    }
  }
  Err(ApiError::Conflict(
    "The record was modified concurrently, please retry".to_owned(),
  ))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /branches/{id}`
pub async fn delete_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let record = state
    .store
    .get::<Branch>(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("Branch"))?;
  if !state.store.delete::<Branch>(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found("Branch"));
  }

  state.activity.record(
    Activity::new(
      ActivityType::BranchDeleted,
      format!("Branch \"{}\" was deleted", record.doc.name),
    )
    .about(EntityType::Branch, id, &record.doc.name),
  );
  Ok(ApiJson(json!({ "message": "Branch removed" })))
}

#[cfg(test)]
mod tests {
  use axum::http::Method;
  use serde_json::json;

  use super::*;
  use crate::testing::TestApp;

  #[tokio::test]
  async fn empty_store_gets_headquarters_once() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Method::GET, "/branches", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Headquarters");
    assert_eq!(body[0]["contactNumber"], "+974 1234 5678");

    let (_, again) = app.send(Method::GET, "/branches", None).await;
    assert_eq!(again[0]["id"], body[0]["id"]);

    let activities = app.activities().await;
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].doc.kind, ActivityType::BranchCreated);
    assert_eq!(activities[0].doc.description, "Default branch \"Headquarters\" was created");
  }

  #[tokio::test]
  async fn create_validates_and_drops_unlicensed_vehicles() {
    let app = TestApp::new().await;

    let (status, body) = app
      .send(Method::POST, "/branches", Some(json!({ "name": "Doha" })))
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "location is required");

    let (status, body) = app
      .send(
        Method::POST,
        "/branches",
        Some(json!({
          "name": "Doha",
          "location": "West Bay",
          "crExpiry": "2026-12-01",
          "vehicles": [{ "licenseNumber": "V-1" }, { "licenseNumber": "" }]
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["crExpiry"], "2026-12-01");
    assert_eq!(body["vehicles"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn update_rejects_license_of_another_branch() {
    let app = TestApp::new().await;
    let mut a = Branch::new("A", "x");
    a.vehicles.push(VehicleInput::default().into_vehicle("V-1".into(), None, 2026));
    app.store.insert(a).await.unwrap();
    let b = app.store.insert(Branch::new("B", "y")).await.unwrap();

    let (status, body) = app
      .send(
        Method::PUT,
        &format!("/branches/{}", b.id),
        Some(json!({ "vehicles": [{ "licenseNumber": "V-1" }] })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("'A'"));
  }

  #[tokio::test]
  async fn update_clears_expiry_with_null_and_honours_if_match() {
    let app = TestApp::new().await;
    let mut doc = Branch::new("Doha", "West Bay");
    doc.cr_expiry = chrono::NaiveDate::from_ymd_opt(2026, 12, 1);
    let branch = app.store.insert(doc).await.unwrap();
    let uri = format!("/branches/{}", branch.id);

    let (status, headers, _) = app.send_with(Method::GET, &uri, &[], None).await;
    assert_eq!(status, StatusCode::OK);
    let etag = headers[header::ETAG].to_str().unwrap().to_owned();

    let (status, headers, body) = app
      .send_with(
        Method::PUT,
        &uri,
        &[(header::IF_MATCH, etag.as_str())],
        Some(json!({ "crExpiry": null, "manager": "Noor" })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["crExpiry"], serde_json::Value::Null);
    assert_eq!(body["manager"], "Noor");
    assert_ne!(headers[header::ETAG].to_str().unwrap(), etag);

    let (status, _, _) = app
      .send_with(
        Method::PUT,
        &uri,
        &[(header::IF_MATCH, etag.as_str())],
        Some(json!({ "manager": "late" })),
      )
      .await;
    assert_eq!(status, StatusCode::PRECONDITION_FAILED);
  }

  #[tokio::test]
  async fn delete_then_get_is_not_found() {
    let app = TestApp::new().await;
    let branch = app.store.insert(Branch::new("Doha", "West Bay")).await.unwrap();
    let uri = format!("/branches/{}", branch.id);

    let (status, body) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Branch removed");
    let (status, body) = app.send(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Branch not found");
  }
}
