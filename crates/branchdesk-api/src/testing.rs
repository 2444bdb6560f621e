//! Router harness shared by the handler tests.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Method, Request, StatusCode, header},
};
use branchdesk_core::{
  activity::Activity,
  record::Record,
  store::{DocumentStore, Query},
};
use branchdesk_store_sqlite::SqliteStore;
use serde_json::Value;
use tokio::task::JoinHandle;
use tower::ServiceExt as _;

use crate::{ActivityLog, ApiState, api_router};

pub struct TestApp {
  pub store: Arc<SqliteStore>,
  router:    Router,
  worker:    JoinHandle<()>,
}

impl TestApp {
  pub async fn new() -> Self {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (activity, worker) = ActivityLog::spawn(store.clone());
    let router = api_router(ApiState::new(store.clone(), activity));
    Self { store, router, worker }
  }

  /// Send a request and decode the JSON response body (`Null` when empty).
  pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, body) = self.send_with(method, uri, &[], body).await;
    (status, body)
  }

  pub async fn send_with(
    &self,
    method: Method,
    uri: &str,
    headers: &[(header::HeaderName, &str)],
    body: Option<Value>,
  ) -> (StatusCode, header::HeaderMap, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
      req = req.header(name, *value);
    }
    let req = match body {
      Some(json) => req
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    let resp = self.router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, json)
  }

  /// Shut the router down, wait for queued activities to be written and
  /// return them oldest first.
  pub async fn activities(self) -> Vec<Record<Activity>> {
    let Self { store, router, worker } = self;
    drop(router);
    worker.await.unwrap();
    store.find::<Activity>(Query::all()).await.unwrap()
  }
}
