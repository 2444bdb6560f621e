//! Permanent and temporary staff records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  attachment::{self, AttachmentMap, merge_attachments},
  date,
  record::{Collection, Document},
};

fn default_status() -> String { "Working".to_owned() }

/// Reject blank values for a mandatory text field.
pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(())
}

/// Treat blank strings as absent.
fn present(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

// ─── Employee ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
  pub name:                String,
  /// Unique across employees.
  pub email:               String,
  pub role:                String,
  pub branch:              String,
  pub work_location:       String,
  #[serde(default)]
  pub designation:         Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub doj:                 Option<NaiveDate>,
  #[serde(default, deserialize_with = "date::optional")]
  pub doe:                 Option<NaiveDate>,
  #[serde(default)]
  pub qid:                 Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub qid_expiry:          Option<NaiveDate>,
  #[serde(default)]
  pub passport_number:     Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub passport_expiry:     Option<NaiveDate>,
  #[serde(default = "default_status")]
  pub status:              String,
  #[serde(default)]
  pub bank_name:           Option<String>,
  #[serde(default)]
  pub bank_account_number: Option<String>,
  #[serde(default)]
  pub emergency_contact:   Option<String>,
  #[serde(default)]
  pub emergency_contact2:  Option<String>,
  #[serde(default)]
  pub native_address:      Option<String>,
  #[serde(default)]
  pub medical_card_number: Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub medical_card_expiry: Option<NaiveDate>,
  #[serde(default)]
  pub visa_number:         Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub visa_expiry:         Option<NaiveDate>,
  #[serde(default)]
  pub visa_added_branch:   Option<String>,
  /// Unique across employees when present.
  #[serde(default)]
  pub phone:               Option<String>,
  #[serde(default)]
  pub nationality:         Option<String>,
  #[serde(default)]
  pub salary:              Option<f64>,
  #[serde(default, deserialize_with = "attachment::slots")]
  pub documents:           AttachmentMap,
}

impl Document for Employee {
  const COLLECTION: Collection = Collection::Employees;
}

impl Employee {
  /// Check mandatory fields and normalise optional ones.
  pub fn validate(mut self) -> Result<Self> {
    require("name", &self.name)?;
    require("email", &self.email)?;
    require("role", &self.role)?;
    require("branch", &self.branch)?;
    require("workLocation", &self.work_location)?;
    self.email = self.email.trim().to_owned();
    self.phone = present(self.phone.take()).map(|p| p.trim().to_owned());
    if self.status.trim().is_empty() {
      self.status = default_status();
    }
    Ok(self)
  }
}

/// A partial employee update. Blank or missing fields leave the stored value
/// as it is; `documents` is merged slot by slot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
  pub name:                Option<String>,
  pub email:               Option<String>,
  pub role:                Option<String>,
  pub branch:              Option<String>,
  pub work_location:       Option<String>,
  pub designation:         Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub doj:                 Option<NaiveDate>,
  #[serde(default, deserialize_with = "date::optional")]
  pub doe:                 Option<NaiveDate>,
  pub qid:                 Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub qid_expiry:          Option<NaiveDate>,
  pub passport_number:     Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub passport_expiry:     Option<NaiveDate>,
  pub status:              Option<String>,
  pub bank_name:           Option<String>,
  pub bank_account_number: Option<String>,
  pub emergency_contact:   Option<String>,
  pub emergency_contact2:  Option<String>,
  pub native_address:      Option<String>,
  pub medical_card_number: Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub medical_card_expiry: Option<NaiveDate>,
  pub visa_number:         Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub visa_expiry:         Option<NaiveDate>,
  pub visa_added_branch:   Option<String>,
  pub phone:               Option<String>,
  pub nationality:         Option<String>,
  pub salary:              Option<f64>,
  #[serde(default, deserialize_with = "attachment::slots")]
  pub documents:           AttachmentMap,
}

fn keep_or(target: &mut String, value: Option<String>) {
  if let Some(v) = present(value) {
    *target = v;
  }
}

fn keep_or_opt<T>(target: &mut Option<T>, value: Option<T>) {
  if value.is_some() {
    *target = value;
  }
}

impl EmployeeUpdate {
  pub fn apply(self, e: &mut Employee) {
    keep_or(&mut e.name, self.name);
    keep_or(&mut e.email, self.email);
    keep_or(&mut e.role, self.role);
    keep_or(&mut e.branch, self.branch);
    keep_or(&mut e.work_location, self.work_location);
    keep_or(&mut e.status, self.status);
    keep_or_opt(&mut e.designation, present(self.designation));
    keep_or_opt(&mut e.doj, self.doj);
    keep_or_opt(&mut e.doe, self.doe);
    keep_or_opt(&mut e.qid, present(self.qid));
    keep_or_opt(&mut e.qid_expiry, self.qid_expiry);
    keep_or_opt(&mut e.passport_number, present(self.passport_number));
    keep_or_opt(&mut e.passport_expiry, self.passport_expiry);
    keep_or_opt(&mut e.bank_name, present(self.bank_name));
    keep_or_opt(&mut e.bank_account_number, present(self.bank_account_number));
    keep_or_opt(&mut e.emergency_contact, present(self.emergency_contact));
    keep_or_opt(&mut e.emergency_contact2, present(self.emergency_contact2));
    keep_or_opt(&mut e.native_address, present(self.native_address));
    keep_or_opt(&mut e.medical_card_number, present(self.medical_card_number));
    keep_or_opt(&mut e.medical_card_expiry, self.medical_card_expiry);
    keep_or_opt(&mut e.visa_number, present(self.visa_number));
    keep_or_opt(&mut e.visa_expiry, self.visa_expiry);
    keep_or_opt(&mut e.visa_added_branch, present(self.visa_added_branch));
    keep_or_opt(&mut e.phone, present(self.phone).map(|p| p.trim().to_owned()));
    keep_or_opt(&mut e.nationality, present(self.nationality));
    keep_or_opt(&mut e.salary, self.salary);
    merge_attachments(&mut e.documents, self.documents);
  }
}

// ─── Temporary employee ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempStatus {
  #[default]
  Working,
  Vacation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempEmployee {
  pub name:                String,
  /// Unique across temporary employees.
  pub email:               String,
  pub role:                String,
  pub work_location:       String,
  #[serde(default)]
  pub designation:         Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub doj:                 Option<NaiveDate>,
  #[serde(default)]
  pub qid:                 Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub qid_expiry:          Option<NaiveDate>,
  #[serde(default)]
  pub passport_number:     Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub passport_expiry:     Option<NaiveDate>,
  #[serde(default)]
  pub phone:               Option<String>,
  #[serde(default)]
  pub nationality:         Option<String>,
  #[serde(default)]
  pub salary:              Option<f64>,
  #[serde(default)]
  pub medical_card_number: Option<String>,
  #[serde(default, deserialize_with = "date::optional")]
  pub medical_card_expiry: Option<NaiveDate>,
  #[serde(default)]
  pub status:              TempStatus,
  #[serde(default, deserialize_with = "attachment::slots")]
  pub documents:           AttachmentMap,
}

impl Document for TempEmployee {
  const COLLECTION: Collection = Collection::TempEmployees;
}

impl TempEmployee {
  pub fn validate(mut self) -> Result<Self> {
    require("name", &self.name)?;
    require("email", &self.email)?;
    require("role", &self.role)?;
    require("workLocation", &self.work_location)?;
    self.email = self.email.trim().to_owned();
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::attachment::Attachment;

  fn employee() -> Employee {
    serde_json::from_value(json!({
      "name": "Amal",
      "email": " amal@example.com ",
      "role": "Driver",
      "branch": "Doha",
      "workLocation": "Doha",
      "visaExpiry": "2026-05-01T00:00:00.000Z",
      "phone": "",
      "documents": { "visa": { "url": "s3://visa" }, "contract": null }
    }))
    .unwrap()
  }

  #[test]
  fn validate_normalises_contact_fields() {
    let e = employee().validate().unwrap();
    assert_eq!(e.email, "amal@example.com");
    assert_eq!(e.phone, None);
    assert_eq!(e.status, "Working");
    assert_eq!(e.visa_expiry, NaiveDate::from_ymd_opt(2026, 5, 1));
    assert_eq!(e.documents.len(), 1);
  }

  #[test]
  fn validate_rejects_blank_required_fields() {
    let mut e = employee();
    e.work_location = "  ".into();
    assert!(matches!(e.validate(), Err(Error::MissingField("workLocation"))));
  }

  #[test]
  fn update_keeps_fields_the_caller_left_blank() {
    let mut e = employee().validate().unwrap();
    let update: EmployeeUpdate = serde_json::from_value(json!({
      "name": "",
      "role": "Supervisor",
      "visaExpiry": "",
      "documents": { "contract": { "url": "s3://contract" } }
    }))
    .unwrap();
    update.apply(&mut e);

    assert_eq!(e.name, "Amal");
    assert_eq!(e.role, "Supervisor");
    assert_eq!(e.visa_expiry, NaiveDate::from_ymd_opt(2026, 5, 1));
    assert_eq!(e.documents["visa"], Attachment {
      url:         "s3://visa".into(),
      file_name:   String::new(),
      uploaded_at: None,
    });
    assert_eq!(e.documents["contract"].url, "s3://contract");
  }

  #[test]
  fn temp_status_is_closed() {
    let res: Result<TempEmployee, _> = serde_json::from_value(json!({
      "name": "T", "email": "t@x", "role": "r", "workLocation": "w", "status": "Fired"
    }));
    assert!(res.is_err());
  }
}
