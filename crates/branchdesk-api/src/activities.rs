//! Handlers for `/activities`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activities` | The 20 newest, with the acting user resolved |
//! | `POST` | `/activities` | Requires `type` and `description` |

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use branchdesk_core::{
  activity::{Activity, ActivityType, EntityType},
  store::{Direction, DocumentStore, Query},
  user::User,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError, extract::ApiJson};

const RECENT: usize = 20;

/// The user behind an activity, as shown in the feed.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
  pub id:    Uuid,
  pub name:  String,
  pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
  pub id:          Uuid,
  #[serde(rename = "type")]
  pub kind:        ActivityType,
  pub description: String,
  pub user:        Option<Actor>,
  pub entity_id:   Option<String>,
  pub entity_name: Option<String>,
  pub entity_type: Option<EntityType>,
  pub created_at:  DateTime<Utc>,
}

/// `GET /activities`
pub async fn recent<S: DocumentStore>(
  State(state): State<ApiState<S>>,
) -> Result<ApiJson<Vec<ActivityView>>, ApiError> {
  let store = &*state.store;
  let entries = store
    .find::<Activity>(
      Query::all()
        .order_by("createdAt", Direction::Desc)
        .limit(RECENT),
    )
    .await
    .map_err(ApiError::store)?;

  let mut actors: HashMap<Uuid, Option<Actor>> = HashMap::new();
  for id in entries.iter().filter_map(|e| e.doc.user) {
    if actors.contains_key(&id) {
      continue;
    }
    let actor = store
      .get::<User>(id)
      .await
      .map_err(ApiError::store)?
      .map(|u| Actor { id: u.id, name: u.doc.name, email: u.doc.email });
    actors.insert(id, actor);
  }

  let views = entries
    .into_iter()
    .map(|e| ActivityView {
      id:          e.id,
      kind:        e.doc.kind,
      description: e.doc.description,
      user:        e.doc.user.and_then(|id| actors.get(&id).cloned().flatten()),
      entity_id:   e.doc.entity_id,
      entity_name: e.doc.entity_name,
      entity_type: e.doc.entity_type,
      created_at:  e.created_at,
    })
    .collect();
  Ok(ApiJson(views))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivity {
  #[serde(rename = "type", default)]
  pub kind:        Option<ActivityType>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub user:        Option<Uuid>,
  #[serde(default)]
  pub entity_id:   Option<String>,
  #[serde(default)]
  pub entity_name: Option<String>,
  #[serde(default)]
  pub entity_type: Option<EntityType>,
}

/// `POST /activities`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<NewActivity>,
) -> Result<impl IntoResponse, ApiError> {
  let description = body.description.filter(|d| !d.trim().is_empty());
  let (Some(kind), Some(description)) = (body.kind, description) else {
    return Err(ApiError::Validation(
      "Please provide activity type and description".to_owned(),
    ));
  };
  let entry = Activity {
    kind,
    description,
    user: body.user,
    entity_id: body.entity_id,
    entity_name: body.entity_name,
    entity_type: body.entity_type,
  };
  let record = state.store.insert(entry).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, ApiJson(record)))
}

#[cfg(test)]
mod tests {
  use axum::http::Method;
  use serde_json::json;

  use super::*;
  use crate::testing::TestApp;

  #[tokio::test]
  async fn feed_is_newest_first_and_capped() {
    let app = TestApp::new().await;
    let user = app
      .store
      .insert(User::new(
        "Admin".into(),
        "admin@x.com".into(),
        "hash".into(),
        "admin".into(),
        "HQ".into(),
      ))
      .await
      .unwrap();
    for n in 0..25 {
      app
        .store
        .insert(Activity::new(ActivityType::Login, format!("entry {n}")).by(user.id))
        .await
        .unwrap();
    }

    let (status, feed) = app.send(Method::GET, "/activities", None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), RECENT);
    assert_eq!(feed[0]["description"], "entry 24");
    assert_eq!(feed[0]["user"]["email"], "admin@x.com");
    assert!(feed[0]["user"].get("passwordHash").is_none());
  }

  #[tokio::test]
  async fn post_requires_type_and_description() {
    let app = TestApp::new().await;
    let (status, body) = app
      .send(Method::POST, "/activities", Some(json!({ "type": "login" })))
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide activity type and description");

    let (status, body) = app
      .send(
        Method::POST,
        "/activities",
        Some(json!({ "type": "branch_updated", "description": "renamed", "entityType": "branch" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["type"], "branch_updated");
  }
}
