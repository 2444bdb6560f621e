//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns, plus the translation of
//! [`Query`] values into SQL.
//!
//! Timestamps are stored as RFC 3339 strings with microsecond precision so
//! they sort lexically. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use uuid::Uuid;

use branchdesk_core::{
  record::{Collection, Document, Record},
  store::{Condition, Direction, Query},
};

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Queries ─────────────────────────────────────────────────────────────────

pub const SELECT_COLUMNS: &str =
  "SELECT id, body, version, created_at, updated_at FROM documents";

/// The SQL expression addressing `field`. Envelope fields map to columns;
/// anything else is looked up in the JSON body.
fn field_expr(field: &str) -> Result<String> {
  match field {
    "id" => Ok("id".to_owned()),
    "createdAt" => Ok("created_at".to_owned()),
    "updatedAt" => Ok("updated_at".to_owned()),
    f if !f.is_empty() && f.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
      Ok(format!("json_extract(body, '$.{f}')"))
    }
    other => Err(Error::InvalidField(other.to_owned())),
  }
}

fn sql_value(value: &Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(n.as_f64().unwrap_or_default()),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    other => SqlValue::Text(other.to_string()),
  }
}

/// Build the `SELECT` for `query` over `collection`, with positional
/// parameters in order.
pub fn select_sql(collection: Collection, query: &Query) -> Result<(String, Vec<SqlValue>)> {
  let mut sql = format!("{SELECT_COLUMNS} WHERE collection = ?");
  let mut params = vec![SqlValue::Text(collection.as_str().to_owned())];

  for condition in &query.conditions {
    match condition {
      Condition::Eq(field, value) => {
        sql.push_str(&format!(" AND {} IS ?", field_expr(field)?));
        params.push(sql_value(value));
      }
      Condition::EqIgnoreCase(field, value) => {
        sql.push_str(&format!(" AND lower({}) = lower(?)", field_expr(field)?));
        params.push(SqlValue::Text(value.clone()));
      }
      Condition::Between(field, from, to) => {
        sql.push_str(&format!(" AND {} BETWEEN ? AND ?", field_expr(field)?));
        params.push(sql_value(from));
        params.push(sql_value(to));
      }
    }
  }

  match query.order {
    Some((field, direction)) => {
      let dir = match direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
      };
      sql.push_str(&format!(" ORDER BY {} {dir}, rowid {dir}", field_expr(field)?));
    }
    None => sql.push_str(" ORDER BY rowid ASC"),
  }

  if let Some(limit) = query.limit {
    sql.push_str(" LIMIT ?");
    params.push(SqlValue::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
  }

  Ok((sql, params))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `documents` row.
pub struct RawRecord {
  pub id:         String,
  pub body:       String,
  pub version:    i64,
  pub created_at: String,
  pub updated_at: String,
}

impl RawRecord {
  /// Row mapper for statements selecting [`SELECT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      body:       row.get(1)?,
      version:    row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_record<D: Document>(self) -> Result<Record<D>> {
    Ok(Record {
      id:         decode_uuid(&self.id)?,
      doc:        serde_json::from_str(&self.body)?,
      version:    u64::try_from(self.version).unwrap_or_default(),
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn envelope_fields_map_to_columns() {
    assert_eq!(field_expr("createdAt").unwrap(), "created_at");
    assert_eq!(field_expr("email").unwrap(), "json_extract(body, '$.email')");
  }

  #[test]
  fn hostile_field_names_are_rejected() {
    assert!(matches!(field_expr("x') OR 1=1 --"), Err(Error::InvalidField(_))));
    assert!(matches!(field_expr(""), Err(Error::InvalidField(_))));
  }

  #[test]
  fn select_binds_every_parameter_in_order() {
    let query = Query::all()
      .eq("branchId", "b-1")
      .between("date", "2026-01-01", "2026-01-31")
      .order_by("date", Direction::Desc)
      .limit(5);
    let (sql, params) = select_sql(Collection::DailyExpenditures, &query).unwrap();
    assert_eq!(sql.matches('?').count(), params.len());
    assert!(sql.ends_with("ORDER BY json_extract(body, '$.date') DESC, rowid DESC LIMIT ?"));
    assert_eq!(params[0], SqlValue::Text("daily_expenditures".into()));
    assert_eq!(params.last(), Some(&SqlValue::Integer(5)));
  }

  #[test]
  fn json_values_convert_to_sql() {
    assert_eq!(sql_value(&json!(true)), SqlValue::Integer(1));
    assert_eq!(sql_value(&json!(3)), SqlValue::Integer(3));
    assert_eq!(sql_value(&json!(1.5)), SqlValue::Real(1.5));
    assert_eq!(sql_value(&json!(null)), SqlValue::Null);
  }
}
