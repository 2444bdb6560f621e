//! The `DocumentStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `branchdesk-store-sqlite`). The API layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use serde_json::Value;
use uuid::Uuid;

use crate::record::{Document, Record};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Asc,
  Desc,
}

/// A single filter over a top-level document field.
///
/// `createdAt` and `updatedAt` address the record timestamps rather than the
/// document body.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
  Eq(&'static str, Value),
  EqIgnoreCase(&'static str, String),
  /// Inclusive on both ends.
  Between(&'static str, Value, Value),
}

/// Parameters for [`DocumentStore::find`]. Without an explicit order,
/// records come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Query {
  pub conditions: Vec<Condition>,
  pub order:      Option<(&'static str, Direction)>,
  pub limit:      Option<usize>,
}

impl Query {
  /// Every record of the collection.
  pub fn all() -> Self { Self::default() }

  pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
    self.conditions.push(Condition::Eq(field, value.into()));
    self
  }

  pub fn eq_ignore_case(mut self, field: &'static str, value: impl Into<String>) -> Self {
    self.conditions.push(Condition::EqIgnoreCase(field, value.into()));
    self
  }

  pub fn between(
    mut self,
    field: &'static str,
    from: impl Into<Value>,
    to: impl Into<Value>,
  ) -> Self {
    self
      .conditions
      .push(Condition::Between(field, from.into(), to.into()));
    self
  }

  pub fn order_by(mut self, field: &'static str, direction: Direction) -> Self {
    self.order = Some((field, direction));
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }
}

// ─── Write outcome ───────────────────────────────────────────────────────────

/// Result of a version-checked write.
#[derive(Debug, Clone)]
pub enum WriteOutcome<T> {
  /// The write was applied; carries the new state.
  Written(T),
  /// A target record no longer exists.
  Missing(Uuid),
  /// A target record was changed by someone else since it was read.
  Stale(Uuid),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a collection-oriented document store.
///
/// Each document is replaced whole; there are no partial updates at this
/// layer. `replace` and `replace_all` compare the caller's `version` with the
/// stored one and refuse to overwrite a newer write.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return every record of `D`'s collection matching `query`.
  fn find<D: Document>(
    &self,
    query: Query,
  ) -> impl Future<Output = Result<Vec<Record<D>>, Self::Error>> + Send + '_;

  /// Return the first record matching `query`, if any.
  fn find_one<D: Document>(
    &self,
    query: Query,
  ) -> impl Future<Output = Result<Option<Record<D>>, Self::Error>> + Send + '_
  {
    async move { Ok(self.find(query.limit(1)).await?.into_iter().next()) }
  }

  /// Retrieve a record by id. Returns `None` if not found.
  fn get<D: Document>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Record<D>>, Self::Error>> + Send + '_;

  /// Persist a new document and return its record (version 1).
  fn insert<D: Document>(
    &self,
    doc: D,
  ) -> impl Future<Output = Result<Record<D>, Self::Error>> + Send + '_;

  /// Overwrite a record's document if its stored version still equals
  /// `record.version`.
  fn replace<D: Document>(
    &self,
    record: Record<D>,
  ) -> impl Future<Output = Result<WriteOutcome<Record<D>>, Self::Error>> + Send + '_;

  /// Replace several records in one transaction. Either every write applies
  /// or none does.
  fn replace_all<D: Document>(
    &self,
    records: Vec<Record<D>>,
  ) -> impl Future<Output = Result<WriteOutcome<Vec<Record<D>>>, Self::Error>> + Send + '_;

  /// Delete a record. Returns `false` if it did not exist.
  fn delete<D: Document>(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
