//! Handlers for `/vehicles` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/vehicles` | Every vehicle with its branch id, name and location |
//! | `POST`   | `/vehicles` | Upsert into `branch`/`branchId` |
//! | `PUT`    | `/vehicles/{licenseNumber}` | Update in place, or move when `originalBranchId` differs from `branchId` |
//! | `DELETE` | `/vehicles/{licenseNumber}` | Optional `?branchId=` |
//!
//! Vehicles live inside their branch document, so every write here loads the
//! branches, edits the embedded list and writes the branch back under a
//! version check, retrying when another request changed it in between.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use branchdesk_core::{
  activity::{Activity, ActivityType, EntityType},
  branch::{Branch, Vehicle},
  fleet::{FleetVehicle, Upsert, VehicleInput, all_vehicles, license_owner, locate_vehicle},
  record::Record,
  store::{DocumentStore, Query},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::{
  ApiState, current_year,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery, optional_id},
  retry::{with_retry, written},
};

fn held_by(license: &str, owner: &Record<Branch>) -> ApiError {
  ApiError::Duplicate(format!(
    "Vehicle with license number '{license}' already exists in branch '{}'",
    owner.doc.name
  ))
}

async fn load_branches<S: DocumentStore>(store: &S) -> Result<Vec<Record<Branch>>, ApiError> {
  store
    .find::<Branch>(Query::all())
    .await
    .map_err(ApiError::store)
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Insert the vehicle into `branch_id`, or replace the branch's existing
/// vehicle with the same license number.
pub async fn add_vehicle<S: DocumentStore>(
  store: &S,
  branch_id: Uuid,
  license: &str,
  input: VehicleInput,
  default_year: i32,
) -> Result<(FleetVehicle, Upsert), ApiError> {
  with_retry(move || add_once(store, branch_id, license, input.clone(), default_year)).await
}

async fn add_once<S: DocumentStore>(
  store: &S,
  branch_id: Uuid,
  license: &str,
  input: VehicleInput,
  default_year: i32,
) -> Result<Option<(FleetVehicle, Upsert)>, ApiError> {
  let branches = load_branches(store).await?;
  let Some(target) = branches.iter().find(|b| b.id == branch_id) else {
    return Err(ApiError::not_found("Branch"));
  };
  if let Some(owner) = license_owner(&branches, license, branch_id) {
    return Err(held_by(license, owner));
  }

  let mut record = target.clone();
  let vehicle = input.into_vehicle(license.to_owned(), record.doc.vehicle(license), default_year);
  let upsert = record.doc.upsert_vehicle(vehicle.clone());

  let outcome = store.replace(record).await.map_err(ApiError::store)?;
  Ok(written(outcome).map(|branch| (FleetVehicle::new(vehicle, &branch), upsert)))
}

/// Overwrite the vehicle keyed by `license`. Without `branch_id` the owning
/// branch is looked up. A new license number in `input` renames the vehicle.
pub async fn update_vehicle<S: DocumentStore>(
  store: &S,
  license: &str,
  branch_id: Option<Uuid>,
  input: VehicleInput,
  default_year: i32,
) -> Result<FleetVehicle, ApiError> {
  with_retry(move || update_once(store, license, branch_id, input.clone(), default_year)).await
}

async fn update_once<S: DocumentStore>(
  store: &S,
  license: &str,
  branch_id: Option<Uuid>,
  input: VehicleInput,
  default_year: i32,
) -> Result<Option<FleetVehicle>, ApiError> {
  let branches = load_branches(store).await?;
  let (owner, index) = match branch_id {
    Some(id) => {
      let owner = branches
        .iter()
        .find(|b| b.id == id)
        .ok_or_else(|| ApiError::not_found("Branch"))?;
      let index = owner
        .doc
        .vehicle_position(license)
        .ok_or_else(|| ApiError::not_found("Vehicle"))?;
      (owner, index)
    }
    None => locate_vehicle(&branches, license).ok_or_else(|| ApiError::not_found("Vehicle"))?,
  };

  let new_license = input.license().unwrap_or(license).to_owned();
  if new_license != license
    && let Some(holder) = branches
      .iter()
      .find(|b| b.doc.vehicle_position(&new_license).is_some())
  {
    return Err(held_by(&new_license, holder));
  }

  let mut record = owner.clone();
  let vehicle = input.into_vehicle(new_license, Some(&record.doc.vehicles[index]), default_year);
  record.doc.vehicles[index] = vehicle.clone();

  let outcome = store.replace(record).await.map_err(ApiError::store)?;
  Ok(written(outcome).map(|branch| FleetVehicle::new(vehicle, &branch)))
}

/// A completed move, with the name of the branch it left when that branch
/// still existed.
#[derive(Debug)]
pub struct Moved {
  pub vehicle: FleetVehicle,
  pub from:    Option<String>,
}

/// Move the vehicle keyed by `license` from branch `from` to branch `to`,
/// applying `input` on the way. Both branches are written in one
/// transaction.
pub async fn move_vehicle<S: DocumentStore>(
  store: &S,
  license: &str,
  from: Uuid,
  to: Uuid,
  input: VehicleInput,
  default_year: i32,
) -> Result<Moved, ApiError> {
  with_retry(move || move_once(store, license, from, to, input.clone(), default_year)).await
}

async fn move_once<S: DocumentStore>(
  store: &S,
  license: &str,
  from: Uuid,
  to: Uuid,
  input: VehicleInput,
  default_year: i32,
) -> Result<Option<Moved>, ApiError> {
  let branches = load_branches(store).await?;
  let Some(destination) = branches.iter().find(|b| b.id == to) else {
    return Err(ApiError::NotFound("Destination branch not found".to_owned()));
  };

  // A renamed vehicle may not take a license held anywhere, source and
  // destination included.
  let new_license = input.license().unwrap_or(license).to_owned();
  let renamed = new_license != license;
  if let Some(holder) = branches
    .iter()
    .filter(|b| renamed || (b.id != from && b.id != to))
    .find(|b| b.doc.vehicle_position(&new_license).is_some())
  {
    return Err(held_by(&new_license, holder));
  }

  let mut writes = Vec::with_capacity(2);
  let mut existing = None;
  match branches.iter().find(|b| b.id == from) {
    Some(source) => {
      let mut source = source.clone();
      existing = source.doc.remove_vehicle(license);
      if existing.is_some() {
        writes.push(source);
      } else {
        warn!(%from, license, "vehicle not in source branch, inserting into destination only");
      }
    }
    None => warn!(%from, license, "source branch not found, inserting into destination only"),
  }
  let source_name = writes.first().map(|b| b.doc.name.clone());

  let mut destination = destination.clone();
  let vehicle = input.into_vehicle(new_license, existing.as_ref(), default_year);
  destination.doc.upsert_vehicle(vehicle.clone());
  writes.push(destination);

  let outcome = store.replace_all(writes).await.map_err(ApiError::store)?;
  Ok(written(outcome).and_then(|written| {
    let destination = written.last()?;
    Some(Moved { vehicle: FleetVehicle::new(vehicle, destination), from: source_name })
  }))
}

/// Remove the vehicle keyed by `license`, returning it and the branch it was
/// removed from.
pub async fn remove_vehicle<S: DocumentStore>(
  store: &S,
  license: &str,
  branch_id: Option<Uuid>,
) -> Result<(Vehicle, Record<Branch>), ApiError> {
  with_retry(move || remove_once(store, license, branch_id)).await
}

async fn remove_once<S: DocumentStore>(
  store: &S,
  license: &str,
  branch_id: Option<Uuid>,
) -> Result<Option<(Vehicle, Record<Branch>)>, ApiError> {
  let mut record = match branch_id {
    Some(id) => store
      .get::<Branch>(id)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::not_found("Branch"))?,
    None => {
      let branches = load_branches(store).await?;
      let (owner, _) =
        locate_vehicle(&branches, license).ok_or_else(|| ApiError::not_found("Vehicle"))?;
      owner.clone()
    }
  };
  let removed = record
    .doc
    .remove_vehicle(license)
    .ok_or_else(|| ApiError::not_found("Vehicle"))?;

  let outcome = store.replace(record).await.map_err(ApiError::store)?;
  Ok(written(outcome).map(|branch| (removed, branch)))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /vehicles`
pub async fn list<S: DocumentStore>(
  State(state): State<ApiState<S>>,
) -> Result<impl IntoResponse, ApiError> {
  let branches = load_branches(&*state.store).await?;
  let vehicles = all_vehicles(&branches);
  Ok(ApiJson(json!({ "success": true, "count": vehicles.len(), "data": vehicles })))
}

// ─── Add ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBody {
  #[serde(default)]
  pub branch:    Option<String>,
  #[serde(default)]
  pub branch_id: Option<String>,
  #[serde(flatten)]
  pub vehicle:   VehicleInput,
}

/// `POST /vehicles`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<AddBody>,
) -> Result<impl IntoResponse, ApiError> {
  let raw_branch = body.branch.as_deref().or(body.branch_id.as_deref());
  let branch_id = optional_id("branch", raw_branch)?;
  let (Some(branch_id), Some(license)) = (branch_id, body.vehicle.license()) else {
    return Err(ApiError::Validation(
      "Please provide branch ID and license number".to_owned(),
    ));
  };
  let license = license.to_owned();

  let (vehicle, upsert) =
    add_vehicle(&*state.store, branch_id, &license, body.vehicle, current_year()).await?;

  let (kind, description) = match upsert {
    Upsert::Inserted => (
      ActivityType::VehicleAdded,
      format!("Vehicle \"{license}\" was added to branch \"{}\"", vehicle.branch_name),
    ),
    Upsert::Replaced => (
      ActivityType::VehicleUpdated,
      format!("Vehicle \"{license}\" was updated in branch \"{}\"", vehicle.branch_name),
    ),
  };
  state
    .activity
    .record(Activity::new(kind, description).about(EntityType::Vehicle, &license, &license));

  Ok((StatusCode::CREATED, ApiJson(json!({ "success": true, "data": vehicle }))))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBody {
  #[serde(default, alias = "branch")]
  pub branch_id:          Option<String>,
  #[serde(default)]
  pub original_branch_id: Option<String>,
  #[serde(flatten)]
  pub vehicle:            VehicleInput,
}

/// `PUT /vehicles/{licenseNumber}`
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(license): ApiPath<String>,
  ApiJson(body): ApiJson<UpdateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let branch_id = optional_id("branchId", body.branch_id.as_deref())?;
  let original = optional_id("originalBranchId", body.original_branch_id.as_deref())?;
  let store = &*state.store;

  let (vehicle, activity) = match (original, branch_id) {
    (Some(from), Some(to)) if from != to => {
      let moved = move_vehicle(store, &license, from, to, body.vehicle, current_year()).await?;
      let description = match &moved.from {
        Some(source) => format!(
          "Vehicle \"{license}\" was moved from branch \"{source}\" to branch \"{}\"",
          moved.vehicle.branch_name
        ),
        None => format!(
          "Vehicle \"{license}\" was moved to branch \"{}\"",
          moved.vehicle.branch_name
        ),
      };
      (moved.vehicle, description)
    }
    _ => {
      let vehicle = update_vehicle(store, &license, branch_id, body.vehicle, current_year()).await?;
      let description = format!(
        "Vehicle \"{license}\" was updated in branch \"{}\"",
        vehicle.branch_name
      );
      (vehicle, description)
    }
  };

  let key = &vehicle.vehicle.license_number;
  state.activity.record(
    Activity::new(ActivityType::VehicleUpdated, activity).about(EntityType::Vehicle, key, key),
  );
  Ok(ApiJson(json!({ "success": true, "data": vehicle })))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
  pub branch_id: Option<String>,
}

/// `DELETE /vehicles/{licenseNumber}[?branchId=<id>]`
pub async fn delete_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(license): ApiPath<String>,
  ApiQuery(params): ApiQuery<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
  let branch_id = optional_id("branchId", params.branch_id.as_deref())?;
  let (_, branch) = remove_vehicle(&*state.store, &license, branch_id).await?;

  state.activity.record(
    Activity::new(
      ActivityType::VehicleDeleted,
      format!("Vehicle \"{license}\" was removed from branch \"{}\"", branch.doc.name),
    )
    .about(EntityType::Vehicle, &license, &license),
  );
  Ok(ApiJson(json!({ "success": true, "message": "Vehicle deleted successfully" })))
}

#[cfg(test)]
mod tests {
  use axum::http::{Method, StatusCode};
  use branchdesk_store_sqlite::SqliteStore;
  use serde_json::{Value, json};

  use super::*;
  use crate::testing::TestApp;

  fn input(license: &str) -> VehicleInput {
    VehicleInput { license_number: Some(license.into()), ..Default::default() }
  }

  async fn branch_with(store: &SqliteStore, name: &str, licenses: &[&str]) -> Record<Branch> {
    let mut doc = Branch::new(name, "somewhere");
    doc.vehicles = licenses
      .iter()
      .map(|l| input(l).into_vehicle((*l).into(), None, 2026))
      .collect();
    store.insert(doc).await.unwrap()
  }

  async fn reload(store: &SqliteStore, id: Uuid) -> Record<Branch> {
    store.get::<Branch>(id).await.unwrap().unwrap()
  }

  fn licenses(branch: &Record<Branch>) -> Vec<&str> {
    branch.doc.vehicles.iter().map(|v| v.license_number.as_str()).collect()
  }

  // ─── Service ───

  #[tokio::test]
  async fn same_branch_upsert_replaces_in_place() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let branch = branch_with(&store, "A", &["V-1", "V-2"]).await;

    let mut update = input("V-1");
    update.color = Some("red".into());
    let (vehicle, upsert) = add_vehicle(&store, branch.id, "V-1", update, 2026).await.unwrap();

    assert_eq!(upsert, Upsert::Replaced);
    assert_eq!(vehicle.branch_id, branch.id);
    let now = reload(&store, branch.id).await;
    assert_eq!(licenses(&now), ["V-1", "V-2"]);
    assert_eq!(now.doc.vehicles[0].color, "red");
  }

  #[tokio::test]
  async fn add_rejects_license_held_by_another_branch() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1"]).await;
    let b = branch_with(&store, "B", &[]).await;

    let err = add_vehicle(&store, b.id, "V-1", input("V-1"), 2026).await.unwrap_err();
    assert!(matches!(err, ApiError::Duplicate(m) if m.contains("'A'")));
    assert_eq!(reload(&store, b.id).await.version, b.version);
    assert_eq!(reload(&store, a.id).await.version, a.version);
  }

  #[tokio::test]
  async fn add_to_missing_branch_is_not_found() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let err = add_vehicle(&store, Uuid::new_v4(), "V-1", input("V-1"), 2026).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(m) if m == "Branch not found"));
  }

  #[tokio::test]
  async fn update_keeps_attachments_when_omitted() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut doc = Branch::new("A", "x");
    let mut first = input("V-1");
    first.license_document = Some(serde_json::from_value(json!({ "url": "s3://lic" })).unwrap());
    doc.vehicles.push(first.into_vehicle("V-1".into(), None, 2026));
    let branch = store.insert(doc).await.unwrap();

    let mut change = input("V-1");
    change.make = Some("Toyota".into());
    let updated = update_vehicle(&store, "V-1", None, change, 2026).await.unwrap();

    assert_eq!(updated.vehicle.make, "Toyota");
    let now = reload(&store, branch.id).await;
    let doc = now.doc.vehicles[0].license_document.as_ref().unwrap();
    assert_eq!(doc.url, "s3://lic");
  }

  #[tokio::test]
  async fn update_of_unknown_license_is_not_found() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let branch = branch_with(&store, "A", &["V-1"]).await;

    let err = update_vehicle(&store, "V-9", Some(branch.id), input("V-9"), 2026)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(m) if m == "Vehicle not found"));
    let err = update_vehicle(&store, "V-9", None, input("V-9"), 2026).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
  }

  #[tokio::test]
  async fn move_between_branches() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1", "V-2"]).await;
    let b = branch_with(&store, "B", &["V-3"]).await;

    let moved = move_vehicle(&store, "V-1", a.id, b.id, input("V-1"), 2026).await.unwrap();
    assert_eq!(moved.from.as_deref(), Some("A"));
    assert_eq!(moved.vehicle.branch_id, b.id);

    let (a, b) = (reload(&store, a.id).await, reload(&store, b.id).await);
    assert_eq!(licenses(&a), ["V-2"]);
    assert_eq!(licenses(&b), ["V-3", "V-1"]);
  }

  #[tokio::test]
  async fn move_to_missing_destination_leaves_source_untouched() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1"]).await;

    let err = move_vehicle(&store, "V-1", a.id, Uuid::new_v4(), input("V-1"), 2026)
      .await
      .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(m) if m == "Destination branch not found"));
    let now = reload(&store, a.id).await;
    assert_eq!(now.version, a.version);
    assert_eq!(licenses(&now), ["V-1"]);
  }

  #[tokio::test]
  async fn move_from_missing_source_inserts_only() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let b = branch_with(&store, "B", &[]).await;

    let moved = move_vehicle(&store, "V-1", Uuid::new_v4(), b.id, input("V-1"), 2026)
      .await
      .unwrap();
    assert_eq!(moved.from, None);
    assert_eq!(licenses(&reload(&store, b.id).await), ["V-1"]);
  }

  #[tokio::test]
  async fn move_rejects_license_held_by_third_branch() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1"]).await;
    let b = branch_with(&store, "B", &[]).await;
    branch_with(&store, "C", &["V-2"]).await;

    let err = move_vehicle(&store, "V-1", a.id, b.id, input("V-2"), 2026).await.unwrap_err();
    assert!(matches!(err, ApiError::Duplicate(m) if m.contains("'C'")));
    assert_eq!(licenses(&reload(&store, a.id).await), ["V-1"]);
  }

  #[tokio::test]
  async fn move_rename_rejects_license_left_in_source() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1", "V-2"]).await;
    let b = branch_with(&store, "B", &[]).await;

    let err = move_vehicle(&store, "V-1", a.id, b.id, input("V-2"), 2026).await.unwrap_err();
    assert!(matches!(err, ApiError::Duplicate(m) if m.contains("'A'")));
    assert_eq!(licenses(&reload(&store, a.id).await), ["V-1", "V-2"]);
    assert!(licenses(&reload(&store, b.id).await).is_empty());
  }

  #[tokio::test]
  async fn move_rename_does_not_overwrite_destination_vehicle() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1"]).await;
    let mut doc = Branch::new("B", "somewhere");
    doc.vehicles.push(
      VehicleInput { make: Some("Original".into()), ..input("V-3") }
        .into_vehicle("V-3".into(), None, 2026),
    );
    let b = store.insert(doc).await.unwrap();

    let err = move_vehicle(&store, "V-1", a.id, b.id, input("V-3"), 2026).await.unwrap_err();
    assert!(matches!(err, ApiError::Duplicate(m) if m.contains("'B'")));
    assert_eq!(licenses(&reload(&store, a.id).await), ["V-1"]);
    let b = reload(&store, b.id).await;
    assert_eq!(b.version, 1);
    assert_eq!(b.doc.vehicles[0].make, "Original");
  }

  #[tokio::test]
  async fn remove_unknown_license_leaves_branch_unchanged() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1"]).await;

    let err = remove_vehicle(&store, "V-9", Some(a.id)).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(reload(&store, a.id).await.version, a.version);

    let (removed, branch) = remove_vehicle(&store, "V-1", None).await.unwrap();
    assert_eq!(removed.license_number, "V-1");
    assert!(branch.doc.vehicles.is_empty());
  }

  #[tokio::test]
  async fn concurrent_updates_to_one_branch_are_both_kept() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let a = branch_with(&store, "A", &["V-1", "V-2"]).await;

    let mut red = input("V-1");
    red.color = Some("red".into());
    let mut blue = input("V-2");
    blue.color = Some("blue".into());
    let (first, second) = tokio::join!(
      update_vehicle(&store, "V-1", Some(a.id), red, 2026),
      update_vehicle(&store, "V-2", Some(a.id), blue, 2026),
    );
    first.unwrap();
    second.unwrap();

    let now = reload(&store, a.id).await;
    assert_eq!(now.doc.vehicle("V-1").unwrap().color, "red");
    assert_eq!(now.doc.vehicle("V-2").unwrap().color, "blue");
    assert_eq!(now.version, a.version + 2);
  }

  // ─── HTTP ───

  #[tokio::test]
  async fn http_add_list_and_delete() {
    let app = TestApp::new().await;
    let branch = app.store.insert(Branch::new("Doha", "West Bay")).await.unwrap();

    let (status, body) = app
      .send(
        Method::POST,
        "/vehicles",
        Some(json!({ "branch": branch.id, "licenseNumber": " 12345 ", "year": "2020" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["licenseNumber"], "12345");
    assert_eq!(body["data"]["year"], 2020);
    assert_eq!(body["data"]["branchName"], "Doha");

    let (_, list) = app.send(Method::GET, "/vehicles", None).await;
    assert_eq!(list["count"], 1);
    assert_eq!(list["data"][0]["branchLocation"], "West Bay");

    let (status, _) = app.send(Method::DELETE, "/vehicles/12345", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send(Method::DELETE, "/vehicles/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let activities = app.activities().await;
    let kinds: Vec<_> = activities.iter().map(|a| a.doc.kind).collect();
    assert_eq!(kinds, [ActivityType::VehicleAdded, ActivityType::VehicleDeleted]);
    assert_eq!(activities[0].doc.entity_id.as_deref(), Some("12345"));
  }

  #[tokio::test]
  async fn http_add_requires_branch_and_license() {
    let app = TestApp::new().await;
    let (status, body) =
      app.send(Method::POST, "/vehicles", Some(json!({ "licenseNumber": "1" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide branch ID and license number");
  }

  #[tokio::test]
  async fn http_put_with_original_branch_moves() {
    let app = TestApp::new().await;
    let a = branch_with(&app.store, "A", &["V-1"]).await;
    let b = branch_with(&app.store, "B", &[]).await;

    let (status, body) = app
      .send(
        Method::PUT,
        "/vehicles/V-1",
        Some(json!({ "branchId": b.id, "originalBranchId": a.id, "color": "white" })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["branchId"], Value::String(b.id.to_string()));
    assert_eq!(body["data"]["color"], "white");
    assert!(reload(&app.store, a.id).await.doc.vehicles.is_empty());
  }

  #[tokio::test]
  async fn http_rejects_malformed_branch_id() {
    let app = TestApp::new().await;
    let (status, body) =
      app.send(Method::DELETE, "/vehicles/V-1?branchId=not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid branchId format");
  }
}
