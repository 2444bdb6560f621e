//! The expiry scanner.
//!
//! Walks employees and branches (registration documents and vehicles) for
//! dated fields and classifies each against `today`:
//!
//! - expiring: `today < date <= today + 30 days`
//! - expired: `date < today`
//!
//! A date equal to `today` belongs to neither. Results are merged in source
//! order (employees, then per branch its documents followed by its vehicles)
//! and stably sorted by date: soonest first when expiring, most recent first
//! when expired.

use std::str::FromStr;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  branch::Branch,
  employee::Employee,
  record::Record,
};

/// Days ahead of today that count as "expiring soon".
pub const HORIZON_DAYS: u64 = 30;

// ─── Parameters ──────────────────────────────────────────────────────────────

/// Which sources a scan covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
  #[default]
  All,
  Employee,
  Branch,
  Vehicle,
}

impl Category {
  fn employees(self) -> bool { matches!(self, Self::All | Self::Employee) }

  fn branch_documents(self) -> bool { matches!(self, Self::All | Self::Branch) }

  fn vehicles(self) -> bool { matches!(self, Self::All | Self::Vehicle) }

  /// Whether the scan needs branch records at all.
  pub fn needs_branches(self) -> bool { self.branch_documents() || self.vehicles() }

  pub fn needs_employees(self) -> bool { self.employees() }
}

impl FromStr for Category {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "" | "all" => Ok(Self::All),
      "employee" => Ok(Self::Employee),
      "branch" => Ok(Self::Branch),
      "vehicle" => Ok(Self::Vehicle),
      other => Err(Error::UnknownCategory(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
  Expiring,
  Expired,
}

impl ScanMode {
  fn matches(self, date: NaiveDate, today: NaiveDate) -> bool {
    match self {
      Self::Expiring => date > today && date <= horizon(today),
      Self::Expired => date < today,
    }
  }
}

fn horizon(today: NaiveDate) -> NaiveDate {
  today
    .checked_add_days(Days::new(HORIZON_DAYS))
    .unwrap_or(NaiveDate::MAX)
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  Employee,
  Branch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
  Employee,
  Branch,
  Vehicle,
}

/// One dated field, projected into a uniform shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringDocument {
  #[serde(rename = "type")]
  pub kind:            String,
  pub number:          String,
  pub expiry_date:     NaiveDate,
  pub entity_id:       Uuid,
  pub entity_name:     String,
  /// Vehicles report their owning branch here.
  pub entity_type:     SourceKind,
  pub category:        SourceCategory,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vehicle_license: Option<String>,
}

// ─── Scan ────────────────────────────────────────────────────────────────────

/// Run a scan. Pure: the caller supplies the records and the date.
pub fn scan(
  employees: &[Record<Employee>],
  branches: &[Record<Branch>],
  category: Category,
  mode: ScanMode,
  today: NaiveDate,
) -> Vec<ExpiringDocument> {
  let mut out = Vec::new();
  let mut push = |kind: &str, number: &str, date: Option<NaiveDate>, base: &Base<'_>| {
    if let Some(date) = date.filter(|d| mode.matches(*d, today)) {
      out.push(base.project(kind, number, date));
    }
  };

  if category.employees() {
    for e in employees {
      let base = Base::new(e.id, &e.doc.name, SourceKind::Employee, SourceCategory::Employee);
      let or_na = |n: &Option<String>| n.clone().unwrap_or_else(|| "N/A".to_owned());
      push("Medical Card", &or_na(&e.doc.medical_card_number), e.doc.medical_card_expiry, &base);
      push("Visa", &or_na(&e.doc.visa_number), e.doc.visa_expiry, &base);
    }
  }

  for b in branches {
    if category.branch_documents() {
      let base = Base::new(b.id, &b.doc.name, SourceKind::Branch, SourceCategory::Branch);
      for d in &b.doc.documents {
        push(&d.kind, &d.number, d.expiry_date, &base);
      }
    }
    if category.vehicles() {
      for v in &b.doc.vehicles {
        let base = Base::new(b.id, &b.doc.name, SourceKind::Branch, SourceCategory::Vehicle)
          .with_vehicle(&v.license_number);
        push("Vehicle License", &v.license_number, v.license_expiry, &base);
        push("Vehicle Insurance", &v.license_number, v.insurance_expiry, &base);
      }
    }
  }

  match mode {
    ScanMode::Expiring => out.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date)),
    ScanMode::Expired => out.sort_by(|a, b| b.expiry_date.cmp(&a.expiry_date)),
  }
  out
}

/// The parts of a result shared by every field of one entity.
struct Base<'a> {
  id:       Uuid,
  name:     &'a str,
  kind:     SourceKind,
  category: SourceCategory,
  vehicle:  Option<&'a str>,
}

impl<'a> Base<'a> {
  fn new(id: Uuid, name: &'a str, kind: SourceKind, category: SourceCategory) -> Self {
    Self { id, name, kind, category, vehicle: None }
  }

  fn with_vehicle(mut self, license: &'a str) -> Self {
    self.vehicle = Some(license);
    self
  }

  fn project(&self, kind: &str, number: &str, expiry_date: NaiveDate) -> ExpiringDocument {
    ExpiringDocument {
      kind: kind.to_owned(),
      number: number.to_owned(),
      expiry_date,
      entity_id: self.id,
      entity_name: self.name.to_owned(),
      entity_type: self.kind,
      category: self.category,
      vehicle_license: self.vehicle.map(str::to_owned),
    }
  }
}
