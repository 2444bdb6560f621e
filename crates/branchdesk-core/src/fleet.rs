//! Operations on the vehicle list embedded in each branch.
//!
//! Everything here is pure: callers load branch records, mutate them with
//! these functions, and write them back under version checks.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

use crate::{
  attachment::Attachment,
  branch::{Branch, Vehicle, VehicleStatus, lenient_status},
  date,
  record::Record,
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// `deserialize_with` for model years sent either as numbers or strings.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Int(i64),
    Float(f64),
    Text(String),
  }

  match Option::<Raw>::deserialize(deserializer)? {
    None => Ok(None),
    Some(Raw::Int(n)) => i32::try_from(n).map(Some).map_err(de::Error::custom),
    Some(Raw::Float(f)) => Ok(Some(f.trunc() as i32)),
    Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
    Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
  }
}

/// Vehicle fields as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
  #[serde(rename = "type", default)]
  pub kind:               Option<String>,
  #[serde(default)]
  pub license_number:     Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub license_expiry:     Option<NaiveDate>,
  #[serde(default, deserialize_with = "date::optional")]
  pub insurance_expiry:   Option<NaiveDate>,
  #[serde(default)]
  pub make:               Option<String>,
  #[serde(default)]
  pub model:              Option<String>,
  #[serde(default, deserialize_with = "lenient_year")]
  pub year:               Option<i32>,
  #[serde(default)]
  pub color:              Option<String>,
  #[serde(default, deserialize_with = "lenient_status")]
  pub status:             Option<VehicleStatus>,
  #[serde(default)]
  pub license_document:   Option<Attachment>,
  #[serde(default)]
  pub insurance_document: Option<Attachment>,
}

impl VehicleInput {
  /// The trimmed license number, if one was sent.
  pub fn license(&self) -> Option<&str> {
    self
      .license_number
      .as_deref()
      .map(str::trim)
      .filter(|l| !l.is_empty())
  }

  /// Build the stored element. Scalars come from the input (with defaults);
  /// each attachment falls back to `existing`'s when the input has none.
  pub fn into_vehicle(
    self,
    license_number: String,
    existing: Option<&Vehicle>,
    default_year: i32,
  ) -> Vehicle {
    let license_document = self
      .license_document
      .or_else(|| existing.and_then(|v| v.license_document.clone()));
    let insurance_document = self
      .insurance_document
      .or_else(|| existing.and_then(|v| v.insurance_document.clone()));
    Vehicle {
      kind: self.kind.unwrap_or_default(),
      license_number,
      license_expiry: self.license_expiry,
      insurance_expiry: self.insurance_expiry,
      make: self.make.unwrap_or_default(),
      model: self.model.unwrap_or_default(),
      year: self.year.filter(|y| *y != 0).unwrap_or(default_year),
      color: self.color.unwrap_or_default(),
      status: self.status.unwrap_or_default(),
      license_document,
      insurance_document,
    }
  }
}

// ─── Per-branch operations ───────────────────────────────────────────────────

/// What [`Branch::upsert_vehicle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
  Inserted,
  Replaced,
}

impl Branch {
  /// Index of the first vehicle with `license`.
  pub fn vehicle_position(&self, license: &str) -> Option<usize> {
    self.vehicles.iter().position(|v| v.license_number == license)
  }

  pub fn vehicle(&self, license: &str) -> Option<&Vehicle> {
    self.vehicles.iter().find(|v| v.license_number == license)
  }

  /// Replace the first vehicle with the same license in place, or append.
  pub fn upsert_vehicle(&mut self, vehicle: Vehicle) -> Upsert {
    match self.vehicle_position(&vehicle.license_number) {
      Some(i) => {
        self.vehicles[i] = vehicle;
        Upsert::Replaced
      }
      None => {
        self.vehicles.push(vehicle);
        Upsert::Inserted
      }
    }
  }

  /// Remove and return the first vehicle with `license`.
  pub fn remove_vehicle(&mut self, license: &str) -> Option<Vehicle> {
    let i = self.vehicle_position(license)?;
    Some(self.vehicles.remove(i))
  }
}

// ─── Cross-branch operations ─────────────────────────────────────────────────

/// Find the first branch (in slice order) holding `license`, with the
/// vehicle's index in it.
pub fn locate_vehicle<'a>(
  branches: &'a [Record<Branch>],
  license: &str,
) -> Option<(&'a Record<Branch>, usize)> {
  branches
    .iter()
    .find_map(|b| b.doc.vehicle_position(license).map(|i| (b, i)))
}

/// The branch other than `except` that holds `license`, if any.
pub fn license_owner<'a>(
  branches: &'a [Record<Branch>],
  license: &str,
  except: Uuid,
) -> Option<&'a Record<Branch>> {
  branches
    .iter()
    .filter(|b| b.id != except)
    .find(|b| b.doc.vehicle_position(license).is_some())
}

/// Outcome of [`replace_vehicles`] when the new list is not acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseClash {
  /// The same license appears twice in the submitted list.
  Repeated(String),
  /// The license is held by another branch.
  HeldElsewhere { license: String, branch: String },
}

/// Replace `branch`'s vehicle list with `inputs`. Entries without a license
/// number are dropped; attachments are carried over by license number from
/// the current list. `others` must contain every branch record; the record
/// with id `branch_id` is ignored.
pub fn replace_vehicles(
  branch: &mut Branch,
  branch_id: Uuid,
  inputs: Vec<VehicleInput>,
  others: &[Record<Branch>],
  default_year: i32,
) -> Result<(), LicenseClash> {
  let mut seen = HashSet::new();
  let mut vehicles = Vec::with_capacity(inputs.len());
  for input in inputs {
    let Some(license) = input.license().map(str::to_owned) else {
      continue;
    };
    if !seen.insert(license.clone()) {
      return Err(LicenseClash::Repeated(license));
    }
    if let Some(owner) = license_owner(others, &license, branch_id) {
      return Err(LicenseClash::HeldElsewhere { license, branch: owner.doc.name.clone() });
    }
    let existing = branch.vehicle(&license);
    vehicles.push(input.into_vehicle(license, existing, default_year));
  }
  branch.vehicles = vehicles;
  Ok(())
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// A vehicle with the identity of the branch that owns it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetVehicle {
  #[serde(flatten)]
  pub vehicle:         Vehicle,
  pub branch_id:       Uuid,
  pub branch_name:     String,
  pub branch_location: String,
}

impl FleetVehicle {
  pub fn new(vehicle: Vehicle, branch: &Record<Branch>) -> Self {
    Self {
      vehicle,
      branch_id: branch.id,
      branch_name: branch.doc.name.clone(),
      branch_location: branch.doc.location.clone(),
    }
  }
}

/// Every vehicle of every branch, in branch order then array order.
pub fn all_vehicles(branches: &[Record<Branch>]) -> Vec<FleetVehicle> {
  branches
    .iter()
    .flat_map(|b| b.doc.vehicles.iter().map(move |v| FleetVehicle::new(v.clone(), b)))
    .collect()
}
