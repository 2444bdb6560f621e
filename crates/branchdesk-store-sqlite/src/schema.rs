//! SQL schema for the branchdesk SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Every collection shares one table. Bodies are JSON and are queried with
/// `json_extract`; the implicit `rowid` gives insertion order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT    NOT NULL,
    id          TEXT    NOT NULL,
    body        TEXT    NOT NULL,   -- JSON document, without envelope fields
    version     INTEGER NOT NULL,   -- bumped on every replace
    created_at  TEXT    NOT NULL,   -- RFC 3339 UTC, fixed precision
    updated_at  TEXT    NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS documents_created_idx ON documents(collection, created_at);

PRAGMA user_version = 1;
";
