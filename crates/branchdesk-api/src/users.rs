//! Handlers for `/users` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users` | Password hashes are never returned |
//! | `POST`   | `/users` | `name`, `email`, `password`, `role` required |
//! | `POST`   | `/users/login` | 401 on any mismatch; no token is issued |
//! | `GET`    | `/users/{id}` | |
//! | `PUT`    | `/users/{id}` | Blank fields keep their value; `password` is re-hashed |
//! | `DELETE` | `/users/{id}` | |

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use branchdesk_core::{
  activity::{Activity, ActivityType, EntityType},
  store::{DocumentStore, Query},
  user::{User, UserView},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{ApiJson, ApiPath},
  password::{hash_password, verify_password},
  retry::modify,
};

/// User fields as sent by clients. Blank strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserBody {
  #[serde(default)]
  pub name:     Option<String>,
  #[serde(default)]
  pub email:    Option<String>,
  #[serde(default)]
  pub password: Option<String>,
  #[serde(default)]
  pub role:     Option<String>,
  #[serde(default)]
  pub branch:   Option<String>,
  #[serde(default)]
  pub status:   Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

async fn ensure_email_free<S: DocumentStore>(
  store: &S,
  email: &str,
  except: Option<Uuid>,
) -> Result<(), ApiError> {
  let taken = store
    .find::<User>(Query::all().eq_ignore_case("email", email))
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .any(|r| Some(r.id) != except);
  if taken {
    return Err(ApiError::Duplicate("User already exists".to_owned()));
  }
  Ok(())
}

fn activity(kind: ActivityType, verb: &str, user: &UserView) -> Activity {
  Activity::new(kind, format!("User {} was {verb}", user.name)).about(
    EntityType::User,
    user.id,
    &user.name,
  )
}

// ─── List / get ──────────────────────────────────────────────────────────────

/// `GET /users`
pub async fn list<S: DocumentStore>(
  State(state): State<ApiState<S>>,
) -> Result<ApiJson<Vec<UserView>>, ApiError> {
  let users = state
    .store
    .find::<User>(Query::all())
    .await
    .map_err(ApiError::store)?;
  Ok(ApiJson(users.into_iter().map(UserView::from).collect()))
}

/// `GET /users/{id}`
pub async fn get_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<ApiJson<UserView>, ApiError> {
  state
    .store
    .get::<User>(id)
    .await
    .map_err(ApiError::store)?
    .map(|u| ApiJson(UserView::from(u)))
    .ok_or_else(|| ApiError::not_found("User"))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /users`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<UserBody>,
) -> Result<impl IntoResponse, ApiError> {
  let (Some(name), Some(email), Some(password), Some(role)) = (
    present(body.name),
    present(body.email),
    body.password.filter(|p| !p.is_empty()),
    present(body.role),
  ) else {
    return Err(ApiError::Validation("Please provide all required fields".to_owned()));
  };
  ensure_email_free(&*state.store, &email, None).await?;

  let mut user = User::new(
    name,
    email,
    hash_password(&password)?,
    role,
    present(body.branch).unwrap_or_default(),
  );
  if let Some(status) = present(body.status) {
    user.status = status;
  }
  let view = UserView::from(state.store.insert(user).await.map_err(ApiError::store)?);

  state
    .activity
    .record(activity(ActivityType::UserCreated, "created", &view));
  Ok((StatusCode::CREATED, ApiJson(view)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /users/{id}`
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(body): ApiJson<UserBody>,
) -> Result<ApiJson<UserView>, ApiError> {
  let store = &*state.store;
  let email = present(body.email);
  if let Some(email) = &email {
    ensure_email_free(store, email, Some(id)).await?;
  }
  let password_hash = match body.password.filter(|p| !p.is_empty()) {
    Some(password) => Some(hash_password(&password)?),
    None => None,
  };
  let (name, role, branch, status) = (
    present(body.name),
    present(body.role),
    present(body.branch),
    present(body.status),
  );

  let record = modify::<_, User>(store, id, "User", |user| {
    let fields = [
      (&mut user.name, &name),
      (&mut user.email, &email),
      (&mut user.role, &role),
      (&mut user.branch, &branch),
      (&mut user.status, &status),
      (&mut user.password_hash, &password_hash),
    ];
    for (target, value) in fields {
      if let Some(value) = value {
        target.clone_from(value);
      }
    }
    Ok(())
  })
  .await?;

  let view = UserView::from(record);
  state
    .activity
    .record(activity(ActivityType::UserUpdated, "updated", &view));
  Ok(ApiJson(view))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /users/{id}`
pub async fn delete_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
  let record = state
    .store
    .get::<User>(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("User"))?;
  state.store.delete::<User>(id).await.map_err(ApiError::store)?;

  state
    .activity
    .record(activity(ActivityType::UserDeleted, "deleted", &UserView::from(record)));
  Ok(ApiJson(json!({ "message": "User removed" })))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub email:    String,
  #[serde(default)]
  pub password: String,
}

/// `POST /users/login`
pub async fn login<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
  let invalid = || ApiError::Unauthorized("Invalid credentials".to_owned());

  let user = state
    .store
    .find_one::<User>(Query::all().eq_ignore_case("email", body.email.trim()))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(invalid)?;
  if !verify_password(&body.password, &user.doc.password_hash) {
    return Err(invalid());
  }

  let view = UserView::from(user);
  info!(user = %view.id, "login");
  state.activity.record(
    Activity::new(ActivityType::Login, format!("User {} logged in", view.name))
      .about(EntityType::User, view.id, &view.name)
      .by(view.id),
  );
  Ok(ApiJson(json!({ "success": true, "user": view })))
}

#[cfg(test)]
mod tests {
  use axum::http::Method;
  use serde_json::{Value, json};

  use super::*;
  use crate::testing::TestApp;

  fn admin() -> Value {
    json!({
      "name": "Admin",
      "email": "Admin@Example.com",
      "password": "hunter2",
      "role": "admin",
      "branch": "HQ",
    })
  }

  #[tokio::test]
  async fn create_hides_hash_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let (status, created) = app.send(Method::POST, "/users", Some(admin())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "Active");
    assert!(created.get("passwordHash").is_none());

    let mut again = admin();
    again["email"] = json!("admin@example.com");
    let (status, body) = app.send(Method::POST, "/users", Some(again)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User already exists");

    let (status, body) = app
      .send(Method::POST, "/users", Some(json!({ "name": "x" })))
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all required fields");
  }

  #[tokio::test]
  async fn login_is_case_insensitive_and_logged() {
    let app = TestApp::new().await;
    let (_, created) = app.send(Method::POST, "/users", Some(admin())).await;

    let (status, body) = app
      .send(
        Method::POST,
        "/users/login",
        Some(json!({ "email": "admin@example.COM", "password": "hunter2" })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], created["id"]);

    let (status, body) = app
      .send(
        Method::POST,
        "/users/login",
        Some(json!({ "email": "admin@example.com", "password": "wrong" })),
      )
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let activities = app.activities().await;
    let login = activities
      .iter()
      .find(|a| a.doc.kind == ActivityType::Login)
      .unwrap();
    assert_eq!(login.doc.user.map(|u| u.to_string()), created["id"].as_str().map(str::to_owned));
  }

  #[tokio::test]
  async fn password_change_takes_effect() {
    let app = TestApp::new().await;
    let (_, created) = app.send(Method::POST, "/users", Some(admin())).await;
    let uri = format!("/users/{}", created["id"].as_str().unwrap());

    let (status, updated) = app
      .send(Method::PUT, &uri, Some(json!({ "password": "s3cret", "name": "" })))
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Admin");

    let (status, _) = app
      .send(
        Method::POST,
        "/users/login",
        Some(json!({ "email": "admin@example.com", "password": "s3cret" })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User removed");
  }
}
