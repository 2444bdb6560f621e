//! [`SqliteStore`], the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use branchdesk_core::{
  record::{Document, Record},
  store::{DocumentStore, Query, WriteOutcome},
};

use crate::{
  Result,
  encode::{RawRecord, SELECT_COLUMNS, decode_uuid, encode_dt, encode_uuid, select_sql},
  schema::SCHEMA,
};

/// A row that blocked a versioned write: whether it still exists, and its id.
type Blocked = Option<(bool, String)>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A branchdesk document store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  async fn find<D: Document>(&self, query: Query) -> Result<Vec<Record<D>>> {
    let (sql, params) = select_sql(D::COLLECTION, &query)?;

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn get<D: Document>(&self, id: Uuid) -> Result<Option<Record<D>>> {
    let collection = D::COLLECTION.as_str();
    let id_str = encode_uuid(id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{SELECT_COLUMNS} WHERE collection = ?1 AND id = ?2"),
              rusqlite::params![collection, id_str],
              RawRecord::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn insert<D: Document>(&self, doc: D) -> Result<Record<D>> {
    let now = Utc::now().trunc_subsecs(6);
    let record = Record { id: Uuid::new_v4(), doc, version: 1, created_at: now, updated_at: now };

    let collection = D::COLLECTION.as_str();
    let id_str = encode_uuid(record.id);
    let body = serde_json::to_string(&record.doc)?;
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (collection, id, body, version, created_at, updated_at)
           VALUES (?1, ?2, ?3, 1, ?4, ?4)",
          rusqlite::params![collection, id_str, body, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn replace<D: Document>(&self, record: Record<D>) -> Result<WriteOutcome<Record<D>>> {
    let id = record.id;
    Ok(match self.replace_all(vec![record]).await? {
      WriteOutcome::Written(mut written) => match written.pop() {
        Some(r) => WriteOutcome::Written(r),
        None => WriteOutcome::Missing(id),
      },
      WriteOutcome::Missing(id) => WriteOutcome::Missing(id),
      WriteOutcome::Stale(id) => WriteOutcome::Stale(id),
    })
  }

  async fn replace_all<D: Document>(
    &self,
    records: Vec<Record<D>>,
  ) -> Result<WriteOutcome<Vec<Record<D>>>> {
    let now = Utc::now().trunc_subsecs(6);
    let collection = D::COLLECTION.as_str();
    let at_str = encode_dt(now);
    let rows = records
      .iter()
      .map(|r| -> Result<_> {
        Ok((
          encode_uuid(r.id),
          serde_json::to_string(&r.doc)?,
          i64::try_from(r.version).unwrap_or(i64::MAX),
        ))
      })
      .collect::<Result<Vec<_>>>()?;

    let blocked: Blocked = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (id, body, version) in &rows {
          let changed = tx.execute(
            "UPDATE documents
             SET body = ?1, version = version + 1, updated_at = ?2
             WHERE collection = ?3 AND id = ?4 AND version = ?5",
            rusqlite::params![body, at_str, collection, id, version],
          )?;
          if changed == 0 {
            let exists = tx
              .query_row(
                "SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2",
                rusqlite::params![collection, id],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false);
            // Dropping `tx` rolls back the writes made so far.
            return Ok(Some((exists, id.clone())));
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    Ok(match blocked {
      Some((true, id)) => WriteOutcome::Stale(decode_uuid(&id)?),
      Some((false, id)) => WriteOutcome::Missing(decode_uuid(&id)?),
      None => WriteOutcome::Written(
        records
          .into_iter()
          .map(|r| Record { version: r.version + 1, updated_at: now, ..r })
          .collect(),
      ),
    })
  }

  async fn delete<D: Document>(&self, id: Uuid) -> Result<bool> {
    let collection = D::COLLECTION.as_str();
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
          rusqlite::params![collection, id_str],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }
}
