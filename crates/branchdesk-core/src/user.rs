//! Console users.
//!
//! The stored password is always an encoded hash; hashing itself happens in
//! the API layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{Collection, Document, Record};

fn default_status() -> String { "Active".to_owned() }

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub name:          String,
  /// Unique, compared case-insensitively.
  pub email:         String,
  /// PHC-format password hash.
  pub password_hash: String,
  pub role:          String,
  pub branch:        String,
  #[serde(default = "default_status")]
  pub status:        String,
}

impl Document for User {
  const COLLECTION: Collection = Collection::Users;
}

impl User {
  pub fn new(
    name: String,
    email: String,
    password_hash: String,
    role: String,
    branch: String,
  ) -> Self {
    Self { name, email, password_hash, role, branch, status: default_status() }
  }
}

/// A user as returned to clients: everything but the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
  pub id:     Uuid,
  pub name:   String,
  pub email:  String,
  pub role:   String,
  pub branch: String,
  pub status: String,
}

impl From<Record<User>> for UserView {
  fn from(r: Record<User>) -> Self {
    Self {
      id:     r.id,
      name:   r.doc.name,
      email:  r.doc.email,
      role:   r.doc.role,
      branch: r.doc.branch,
      status: r.doc.status,
    }
  }
}
