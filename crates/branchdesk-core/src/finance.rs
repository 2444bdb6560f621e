//! Daily expenditures, their analytics, and monthly savings.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result, date,
  employee::require,
  record::{Collection, Document, Record},
};

// ─── Daily expenditure ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseItem {
  pub category:    String,
  pub amount:      f64,
  #[serde(default)]
  pub description: Option<String>,
}

/// One branch's takings and spending for one day. `total_expenses` and
/// `earnings` are derived; see [`DailyExpenditure::recompute_totals`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExpenditure {
  pub branch_id:             Uuid,
  pub branch_name:           String,
  #[serde(deserialize_with = "date::required")]
  pub date:                  NaiveDate,
  #[serde(default)]
  pub income:                f64,
  #[serde(default)]
  pub expenses:              Vec<ExpenseItem>,
  #[serde(default)]
  pub total_expenses:        f64,
  #[serde(default)]
  pub earnings:              f64,
  pub submitted_by:          String,
  #[serde(default)]
  pub notes:                 Option<String>,
  #[serde(default)]
  pub total_online_delivery: f64,
  #[serde(default)]
  pub delivery_money:        f64,
}

impl Document for DailyExpenditure {
  const COLLECTION: Collection = Collection::DailyExpenditures;
}

impl DailyExpenditure {
  pub fn recompute_totals(&mut self) {
    self.total_expenses = self.expenses.iter().map(|e| e.amount).sum();
    self.earnings = self.income - self.total_expenses;
  }

  /// Validate and recompute the derived totals. Run before every write.
  pub fn prepare(mut self) -> Result<Self> {
    require("branchName", &self.branch_name)?;
    require("submittedBy", &self.submitted_by)?;
    for item in &self.expenses {
      require("expense category", &item.category)?;
    }
    self.recompute_totals();
    Ok(self)
  }
}

/// First and last day of a calendar month.
pub fn month_range(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate)> {
  let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::OutOfRange {
    field: "month",
    min:   1.0,
    max:   12.0,
  })?;
  let last = first
    .checked_add_months(Months::new(1))
    .and_then(|d| d.pred_opt())
    .ok_or(Error::InvalidDate(format!("{year}-{month}")))?;
  Ok((first, last))
}

// ─── Analytics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
  BranchId,
  BranchName,
}

/// Totals and per-record averages for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenditureSummary {
  #[serde(rename = "_id")]
  pub group:                     String,
  pub branch_name:               String,
  pub total_income:              f64,
  pub total_online_delivery:     f64,
  pub total_delivery_money:      f64,
  pub total_expenses:            f64,
  pub total_earnings:            f64,
  pub record_count:              usize,
  pub avg_daily_income:          f64,
  pub avg_daily_online_delivery: f64,
  pub avg_daily_delivery_money:  f64,
  pub avg_daily_expenses:        f64,
}

/// Group `records` and summarise each group. Groups appear in order of
/// their first record; `branch_name` is taken from that record.
pub fn analytics(
  records: &[Record<DailyExpenditure>],
  group_by: GroupBy,
) -> Vec<ExpenditureSummary> {
  let mut groups: Vec<ExpenditureSummary> = Vec::new();
  for r in records {
    let key = match group_by {
      GroupBy::BranchId => r.doc.branch_id.to_string(),
      GroupBy::BranchName => r.doc.branch_name.clone(),
    };
    let idx = match groups.iter().position(|g| g.group == key) {
      Some(i) => i,
      None => {
        groups.push(ExpenditureSummary::empty(key, r.doc.branch_name.clone()));
        groups.len() - 1
      }
    };
    let g = &mut groups[idx];
    g.total_income += r.doc.income;
    g.total_online_delivery += r.doc.total_online_delivery;
    g.total_delivery_money += r.doc.delivery_money;
    g.total_expenses += r.doc.total_expenses;
    g.total_earnings += r.doc.earnings;
    g.record_count += 1;
  }
  for g in &mut groups {
    let n = g.record_count as f64;
    g.avg_daily_income = g.total_income / n;
    g.avg_daily_online_delivery = g.total_online_delivery / n;
    g.avg_daily_delivery_money = g.total_delivery_money / n;
    g.avg_daily_expenses = g.total_expenses / n;
  }
  groups
}

impl ExpenditureSummary {
  fn empty(group: String, branch_name: String) -> Self {
    Self {
      group,
      branch_name,
      total_income: 0.0,
      total_online_delivery: 0.0,
      total_delivery_money: 0.0,
      total_expenses: 0.0,
      total_earnings: 0.0,
      record_count: 0,
      avg_daily_income: 0.0,
      avg_daily_online_delivery: 0.0,
      avg_daily_delivery_money: 0.0,
      avg_daily_expenses: 0.0,
    }
  }
}

// ─── Monthly savings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saving {
  pub name:        String,
  pub amount:      f64,
  #[serde(default)]
  pub description: String,
}

/// Savings lines for one branch and month. At most one per
/// `(branch_id, month, year)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySavings {
  pub branch_id: Uuid,
  pub month:     u32,
  pub year:      i32,
  #[serde(default)]
  pub savings:   Vec<Saving>,
}

impl Document for MonthlySavings {
  const COLLECTION: Collection = Collection::MonthlySavings;
}

impl MonthlySavings {
  pub fn new(branch_id: Uuid, month: u32, year: i32, savings: Vec<Saving>) -> Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(Error::OutOfRange { field: "month", min: 1.0, max: 12.0 });
    }
    for s in &savings {
      require("saving name", &s.name)?;
      if s.amount < 0.0 {
        return Err(Error::OutOfRange { field: "amount", min: 0.0, max: f64::MAX });
      }
    }
    Ok(Self { branch_id, month, year, savings })
  }
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, Utc};
  use serde_json::json;

  use super::*;

  fn expenditure(branch: Uuid, name: &str, income: f64, spent: &[f64]) -> Record<DailyExpenditure> {
    let doc: DailyExpenditure = serde_json::from_value(json!({
      "branchId": branch,
      "branchName": name,
      "date": "2026-02-10T00:00:00.000Z",
      "income": income,
      "expenses": spent.iter().map(|a| json!({ "category": "fuel", "amount": a })).collect::<Vec<_>>(),
      "submittedBy": "clerk",
      "totalOnlineDelivery": 10.0,
      "deliveryMoney": 4.0,
      "earnings": 999999.0
    }))
    .unwrap();
    Record {
      id:         Uuid::new_v4(),
      doc:        doc.prepare().unwrap(),
      version:    1,
      created_at: DateTime::<Utc>::UNIX_EPOCH,
      updated_at: DateTime::<Utc>::UNIX_EPOCH,
    }
  }

  #[test]
  fn totals_are_derived_not_trusted() {
    let r = expenditure(Uuid::nil(), "A", 500.0, &[100.0, 50.5]);
    assert_eq!(r.doc.total_expenses, 150.5);
    assert_eq!(r.doc.earnings, 349.5);
  }

  #[test]
  fn month_range_covers_whole_month() {
    let (first, last) = month_range(2, 2028).unwrap();
    assert_eq!(first, NaiveDate::from_ymd_opt(2028, 2, 1).unwrap());
    assert_eq!(last, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
    let (_, dec) = month_range(12, 2026).unwrap();
    assert_eq!(dec, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    assert!(month_range(13, 2026).is_err());
  }

  #[test]
  fn analytics_groups_and_averages() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let records = vec![
      expenditure(a, "Alpha", 100.0, &[40.0]),
      expenditure(b, "Beta", 300.0, &[]),
      expenditure(a, "Alpha", 200.0, &[20.0]),
    ];

    let by_name = analytics(&records, GroupBy::BranchName);
    assert_eq!(by_name.len(), 2);
    let alpha = &by_name[0];
    assert_eq!(alpha.group, "Alpha");
    assert_eq!(alpha.record_count, 2);
    assert_eq!(alpha.total_income, 300.0);
    assert_eq!(alpha.total_expenses, 60.0);
    assert_eq!(alpha.total_earnings, 240.0);
    assert_eq!(alpha.avg_daily_income, 150.0);
    assert_eq!(alpha.avg_daily_expenses, 30.0);
    assert_eq!(alpha.total_delivery_money, 8.0);

    let by_id = analytics(&records[..1], GroupBy::BranchId);
    let v = serde_json::to_value(&by_id[0]).unwrap();
    assert_eq!(v["_id"], a.to_string());
    assert_eq!(v["branchName"], "Alpha");
  }

  #[test]
  fn savings_validate_month_and_amounts() {
    let line = |amount| Saving { name: "Gold".into(), amount, description: String::new() };
    assert!(MonthlySavings::new(Uuid::nil(), 0, 2026, vec![]).is_err());
    assert!(MonthlySavings::new(Uuid::nil(), 6, 2026, vec![line(-1.0)]).is_err());
    assert!(MonthlySavings::new(Uuid::nil(), 6, 2026, vec![line(10.0)]).is_ok());
  }
}
