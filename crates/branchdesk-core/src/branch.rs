//! Branches and the records embedded in them.
//!
//! A branch owns its registration documents and its vehicles outright; neither
//! has a collection of its own. Operations on the vehicle list live in
//! [`crate::fleet`].

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::{
  Error, Result,
  attachment::{self, Attachment, AttachmentMap, merge_attachments},
  date,
  employee::require,
  fleet::VehicleInput,
  record::{Collection, Document},
};

// ─── Embedded types ──────────────────────────────────────────────────────────

/// A dated registration document held by a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDocument {
  #[serde(rename = "type", default)]
  pub kind:        String,
  #[serde(default)]
  pub number:      String,
  #[serde(default, deserialize_with = "date::optional")]
  pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shareholder {
  pub name:             String,
  pub quid:             String,
  pub share_percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
  #[default]
  Active,
  Maintenance,
  Retired,
}

impl FromStr for VehicleStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "maintenance" => Ok(Self::Maintenance),
      "retired" => Ok(Self::Retired),
      other => Err(format!("unknown vehicle status {other:?}")),
    }
  }
}

/// `deserialize_with` for optional vehicle statuses; blank means unset.
pub(crate) fn lenient_status<'de, D>(deserializer: D) -> Result<Option<VehicleStatus>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  match raw.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => s.parse().map(Some).map_err(de::Error::custom),
  }
}

/// A vehicle as stored inside its branch. `license_number` is the natural key
/// and is unique across every branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
  #[serde(rename = "type", default)]
  pub kind:               String,
  pub license_number:     String,
  #[serde(default, deserialize_with = "date::optional")]
  pub license_expiry:     Option<NaiveDate>,
  #[serde(default, deserialize_with = "date::optional")]
  pub insurance_expiry:   Option<NaiveDate>,
  #[serde(default)]
  pub make:               String,
  #[serde(default)]
  pub model:              String,
  #[serde(default)]
  pub year:               i32,
  #[serde(default)]
  pub color:              String,
  #[serde(default)]
  pub status:             VehicleStatus,
  #[serde(default)]
  pub license_document:   Option<Attachment>,
  #[serde(default)]
  pub insurance_document: Option<Attachment>,
}

// ─── Branch ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
  pub name:                  String,
  pub location:              String,
  #[serde(default)]
  pub address:               Option<String>,
  #[serde(default)]
  pub manager:               Option<String>,
  #[serde(default)]
  pub contact_number:        Option<String>,
  #[serde(default)]
  pub email:                 Option<String>,
  #[serde(default)]
  pub cr_number:             Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub cr_expiry:             Option<NaiveDate>,
  #[serde(default)]
  pub ruksa_number:          Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub ruksa_expiry:          Option<NaiveDate>,
  #[serde(default)]
  pub computer_card_number:  Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub computer_card_expiry:  Option<NaiveDate>,
  #[serde(default)]
  pub certification_number:  Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub certification_expiry:  Option<NaiveDate>,
  #[serde(default)]
  pub tax_card_number:       Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub tax_card_expiry:       Option<NaiveDate>,
  #[serde(default)]
  pub baladiya_number:       Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub baladiya_expiry:       Option<NaiveDate>,
  #[serde(default)]
  pub bank_name:             Option<String>,
  #[serde(default)]
  pub bank_account_number:   Option<String>,
  #[serde(default)]
  pub iban_number:           Option<String>,
  #[serde(default, deserialize_with = "attachment::slots")]
  pub branch_documents:      AttachmentMap,
  #[serde(default)]
  pub documents:             Vec<BranchDocument>,
  #[serde(default)]
  pub vehicles:              Vec<Vehicle>,
  #[serde(default)]
  pub assigned_users:        Vec<String>,
  #[serde(default)]
  pub zakath_percentage:     f64,
  #[serde(default)]
  pub shareholders:          Vec<Shareholder>,
}

impl Document for Branch {
  const COLLECTION: Collection = Collection::Branches;
}

impl Branch {
  pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
    Self {
      name:                 name.into(),
      location:             location.into(),
      address:              None,
      manager:              None,
      contact_number:       None,
      email:                None,
      cr_number:            None,
      cr_expiry:            None,
      ruksa_number:         None,
      ruksa_expiry:         None,
      computer_card_number: None,
      computer_card_expiry: None,
      certification_number: None,
      certification_expiry: None,
      tax_card_number:      None,
      tax_card_expiry:      None,
      baladiya_number:      None,
      baladiya_expiry:      None,
      bank_name:            None,
      bank_account_number:  None,
      iban_number:          None,
      branch_documents:     AttachmentMap::new(),
      documents:            Vec::new(),
      vehicles:             Vec::new(),
      assigned_users:       Vec::new(),
      zakath_percentage:    0.0,
      shareholders:         Vec::new(),
    }
  }

  /// The branch created when the store holds none.
  pub fn headquarters() -> Self {
    Self {
      address: Some("Main Street".into()),
      manager: Some("Admin".into()),
      contact_number: Some("+974 1234 5678".into()),
      email: Some("admin@company.com".into()),
      ..Self::new("Headquarters", "Main Location")
    }
  }

  fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    require("location", &self.location)?;
    percentage("zakathPercentage", self.zakath_percentage)?;
    for holder in &self.shareholders {
      require("shareholder name", &holder.name)?;
      require("shareholder quid", &holder.quid)?;
      percentage("sharePercentage", holder.share_percentage)?;
    }
    Ok(())
  }
}

fn percentage(field: &'static str, value: f64) -> Result<()> {
  if !(0.0..=100.0).contains(&value) {
    return Err(Error::OutOfRange { field, min: 0.0, max: 100.0 });
  }
  Ok(())
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// `deserialize_with` for fields where `null` clears the stored value.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Branch fields as sent by clients for both creation and update.
///
/// Absent fields leave the stored value alone. Fields wrapped in a double
/// `Option` may be cleared with an explicit `null`. The vehicle list is not
/// applied here because its uniqueness depends on every other branch; see
/// [`crate::fleet::replace_vehicles`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchPatch {
  pub name:                 Option<String>,
  pub location:             Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub address:              Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub manager:              Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub contact_number:       Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub email:                Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub cr_number:            Option<Option<String>>,
  #[serde(default, deserialize_with = "date::patch")]
  pub cr_expiry:            Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub ruksa_number:         Option<Option<String>>,
  #[serde(default, deserialize_with = "date::patch")]
  pub ruksa_expiry:         Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub computer_card_number: Option<Option<String>>,
  #[serde(default, deserialize_with = "date::patch")]
  pub computer_card_expiry: Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub certification_number: Option<Option<String>>,
  #[serde(default, deserialize_with = "date::patch")]
  pub certification_expiry: Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub tax_card_number:      Option<Option<String>>,
  #[serde(default, deserialize_with = "date::patch")]
  pub tax_card_expiry:      Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub baladiya_number:      Option<Option<String>>,
  #[serde(default, deserialize_with = "date::patch")]
  pub baladiya_expiry:      Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub bank_name:            Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub bank_account_number:  Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub iban_number:          Option<Option<String>>,
  #[serde(default, deserialize_with = "attachment::slots")]
  pub branch_documents:     AttachmentMap,
  pub documents:            Option<Vec<BranchDocument>>,
  pub vehicles:             Option<Vec<VehicleInput>>,
  pub assigned_users:       Option<Vec<String>>,
  pub zakath_percentage:    Option<f64>,
  pub shareholders:         Option<Vec<Shareholder>>,
}

fn set<T>(target: &mut T, value: Option<T>) {
  if let Some(v) = value {
    *target = v;
  }
}

impl BranchPatch {
  /// Build a new branch from the patch. `name` and `location` are required.
  pub fn into_branch(self) -> Result<Branch> {
    let mut branch = Branch::new(
      self.name.clone().unwrap_or_default(),
      self.location.clone().unwrap_or_default(),
    );
    self.apply(&mut branch)?;
    Ok(branch)
  }

  /// Overlay the patch onto `target` and re-validate it. Leaves `vehicles`
  /// untouched. On error `target` is left as it was.
  pub fn apply(self, target: &mut Branch) -> Result<()> {
    let mut branch = target.clone();
    if let Some(name) = self.name.filter(|n| !n.trim().is_empty()) {
      branch.name = name;
    }
    if let Some(location) = self.location.filter(|l| !l.trim().is_empty()) {
      branch.location = location;
    }
    set(&mut branch.address, self.address);
    set(&mut branch.manager, self.manager);
    set(&mut branch.contact_number, self.contact_number);
    set(&mut branch.email, self.email);
    set(&mut branch.cr_number, self.cr_number);
    set(&mut branch.cr_expiry, self.cr_expiry);
    set(&mut branch.ruksa_number, self.ruksa_number);
    set(&mut branch.ruksa_expiry, self.ruksa_expiry);
    set(&mut branch.computer_card_number, self.computer_card_number);
    set(&mut branch.computer_card_expiry, self.computer_card_expiry);
    set(&mut branch.certification_number, self.certification_number);
    set(&mut branch.certification_expiry, self.certification_expiry);
    set(&mut branch.tax_card_number, self.tax_card_number);
    set(&mut branch.tax_card_expiry, self.tax_card_expiry);
    set(&mut branch.baladiya_number, self.baladiya_number);
    set(&mut branch.baladiya_expiry, self.baladiya_expiry);
    set(&mut branch.bank_name, self.bank_name);
    set(&mut branch.bank_account_number, self.bank_account_number);
    set(&mut branch.iban_number, self.iban_number);
    merge_attachments(&mut branch.branch_documents, self.branch_documents);
    set(&mut branch.documents, self.documents);
    set(&mut branch.assigned_users, self.assigned_users);
    set(&mut branch.zakath_percentage, self.zakath_percentage);
    set(&mut branch.shareholders, self.shareholders);
    branch.validate()?;
    *target = branch;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn patch(v: serde_json::Value) -> BranchPatch { serde_json::from_value(v).unwrap() }

  #[test]
  fn create_requires_name_and_location() {
    let err = patch(json!({ "name": "Doha" })).into_branch().unwrap_err();
    assert!(matches!(err, Error::MissingField("location")));
  }

  #[test]
  fn null_clears_registration_expiry_but_absence_keeps_it() {
    let mut branch = patch(json!({
      "name": "Doha",
      "location": "West Bay",
      "crNumber": "CR-1",
      "crExpiry": "2027-01-01",
      "ruksaExpiry": "2027-02-01",
    }))
    .into_branch()
    .unwrap();

    patch(json!({ "crExpiry": null, "address": "Street 5" }))
      .apply(&mut branch)
      .unwrap();

    assert_eq!(branch.cr_expiry, None);
    assert_eq!(branch.cr_number.as_deref(), Some("CR-1"));
    assert_eq!(branch.ruksa_expiry, NaiveDate::from_ymd_opt(2027, 2, 1));
    assert_eq!(branch.address.as_deref(), Some("Street 5"));
  }

  #[test]
  fn branch_documents_merge_per_slot() {
    let mut branch = patch(json!({
      "name": "Doha",
      "location": "West Bay",
      "branchDocuments": { "crDocument": { "url": "s3://cr" } },
    }))
    .into_branch()
    .unwrap();

    patch(json!({ "branchDocuments": { "logoDocument": { "url": "s3://logo" }, "crDocument": null } }))
      .apply(&mut branch)
      .unwrap();

    assert_eq!(branch.branch_documents["crDocument"].url, "s3://cr");
    assert_eq!(branch.branch_documents["logoDocument"].url, "s3://logo");
  }

  #[test]
  fn percentages_are_bounded() {
    let mut branch = Branch::headquarters();
    let err = patch(json!({ "zakathPercentage": 120.0 })).apply(&mut branch).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { field: "zakathPercentage", .. }));
    assert_eq!(branch.zakath_percentage, Branch::headquarters().zakath_percentage);

    let err = patch(json!({
      "shareholders": [{ "name": "A", "quid": "Q1", "sharePercentage": -1.0 }]
    }))
    .apply(&mut branch)
    .unwrap_err();
    assert!(matches!(err, Error::OutOfRange { field: "sharePercentage", .. }));
    assert!(branch.shareholders.is_empty());
  }

  #[test]
  fn unknown_vehicle_status_is_rejected() {
    let res: std::result::Result<Vehicle, _> =
      serde_json::from_value(json!({ "licenseNumber": "X", "status": "sold" }));
    assert!(res.is_err());
  }
}
