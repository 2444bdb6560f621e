//! Activity: the append-only audit trail.
//!
//! Entries are written once and never updated or deleted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{Collection, Document};

/// The closed set of auditable events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
  UserCreated,
  UserUpdated,
  UserDeleted,
  EmployeeCreated,
  EmployeeUpdated,
  EmployeeDeleted,
  BranchCreated,
  BranchUpdated,
  BranchDeleted,
  VehicleAdded,
  VehicleUpdated,
  VehicleDeleted,
  Login,
}

/// The kind of entity an activity is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
  User,
  Employee,
  Branch,
  Vehicle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
  #[serde(rename = "type")]
  pub kind:        ActivityType,
  pub description: String,
  /// The acting user, when known.
  #[serde(default)]
  pub user:        Option<Uuid>,
  /// Vehicle activities use the license number here, so this is not a UUID.
  #[serde(default)]
  pub entity_id:   Option<String>,
  #[serde(default)]
  pub entity_name: Option<String>,
  #[serde(default)]
  pub entity_type: Option<EntityType>,
}

impl Document for Activity {
  const COLLECTION: Collection = Collection::Activities;
}

impl Activity {
  pub fn new(kind: ActivityType, description: impl Into<String>) -> Self {
    Self {
      kind,
      description: description.into(),
      user: None,
      entity_id: None,
      entity_name: None,
      entity_type: None,
    }
  }

  /// Attach the subject entity.
  pub fn about(
    mut self,
    entity_type: EntityType,
    id: impl ToString,
    name: impl Into<String>,
  ) -> Self {
    self.entity_type = Some(entity_type);
    self.entity_id = Some(id.to_string());
    self.entity_name = Some(name.into());
    self
  }

  pub fn by(mut self, user: Uuid) -> Self {
    self.user = Some(user);
    self
  }
}
