//! HTTP front end for branchdesk.
//!
//! Wraps the JSON API from `branchdesk-api` with the process-level concerns:
//! configuration, request tracing, CORS and the guest guard.

pub mod guest;

use std::path::PathBuf;

use axum::{Json, Router, middleware::from_fn, routing::get};
use branchdesk_api::{ApiState, api_router};
use branchdesk_core::store::DocumentStore;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("branchdesk.sqlite3") }

fn default_cors() -> bool { true }

/// Runtime server configuration, deserialised from `config.toml` and
/// `BRANCHDESK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Allow any origin, method and header.
  #[serde(default = "default_cors")]
  pub cors_permissive: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            default_host(),
      port:            default_port(),
      store_path:      default_store_path(),
      cors_permissive: default_cors(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

async fn root() -> &'static str { "API is running..." }

async fn api_test() -> Json<Value> { Json(json!({ "message": "API is working" })) }

/// Build the complete application: health routes, `/api`, and the
/// middleware stack.
pub fn app<S>(state: ApiState<S>, config: &ServerConfig) -> Router
where
  S: DocumentStore + 'static,
{
  let router = Router::new()
    .route("/", get(root))
    .route("/api/test", get(api_test))
    .nest("/api", api_router(state))
    .layer(from_fn(guest::read_only_guard))
    .layer(TraceLayer::new_for_http());

  if config.cors_permissive {
    router.layer(CorsLayer::permissive())
  } else {
    router
  }
}
