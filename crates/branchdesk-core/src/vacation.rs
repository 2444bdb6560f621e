//! Employee vacations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  record::{Collection, Document},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VacationStatus {
  Upcoming,
  Active,
  Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacation {
  pub employee_id:   Uuid,
  /// Copied from the employee when the vacation is saved.
  pub employee_name: String,
  pub start_date:    NaiveDate,
  pub end_date:      NaiveDate,
  pub total_days:    i64,
  #[serde(default)]
  pub reason:        Option<String>,
  pub status:        VacationStatus,
}

impl Document for Vacation {
  const COLLECTION: Collection = Collection::Vacations;
}

impl Vacation {
  /// Build a vacation, deriving its length and its status relative to
  /// `today`.
  pub fn new(
    employee_id: Uuid,
    employee_name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: Option<String>,
    today: NaiveDate,
  ) -> Result<Self> {
    if end_date < start_date {
      return Err(Error::EndBeforeStart);
    }
    Ok(Self {
      employee_id,
      employee_name,
      start_date,
      end_date,
      total_days: total_days(start_date, end_date),
      reason: reason.filter(|r| !r.trim().is_empty()),
      status: status_on(start_date, end_date, today),
    })
  }
}

/// Inclusive day count: a vacation starting and ending on the same day lasts
/// one day.
pub fn total_days(start: NaiveDate, end: NaiveDate) -> i64 { (end - start).num_days() + 1 }

pub fn status_on(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> VacationStatus {
  if today < start {
    VacationStatus::Upcoming
  } else if today <= end {
    VacationStatus::Active
  } else {
    VacationStatus::Completed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2026, m, day).unwrap() }

  #[test]
  fn day_count_is_inclusive() {
    assert_eq!(total_days(d(4, 1), d(4, 1)), 1);
    assert_eq!(total_days(d(4, 1), d(4, 10)), 10);
    assert_eq!(total_days(d(2, 27), d(3, 2)), 4);
  }

  #[test]
  fn status_tracks_today() {
    let (start, end) = (d(4, 1), d(4, 10));
    assert_eq!(status_on(start, end, d(3, 31)), VacationStatus::Upcoming);
    assert_eq!(status_on(start, end, d(4, 1)), VacationStatus::Active);
    assert_eq!(status_on(start, end, d(4, 10)), VacationStatus::Active);
    assert_eq!(status_on(start, end, d(4, 11)), VacationStatus::Completed);
  }

  #[test]
  fn end_before_start_is_rejected() {
    let res = Vacation::new(Uuid::nil(), "A".into(), d(4, 10), d(4, 1), None, d(1, 1));
    assert!(matches!(res, Err(Error::EndBeforeStart)));
  }
}
