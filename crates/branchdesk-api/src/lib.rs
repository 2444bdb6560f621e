//! JSON REST API for branchdesk.
//!
//! Exposes an axum [`Router`] backed by any
//! [`branchdesk_core::store::DocumentStore`]. CORS, request tracing and the
//! guest guard are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let (activity, _worker) = ActivityLog::spawn(store.clone());
//! .nest("/api", branchdesk_api::api_router(ApiState::new(store, activity)))
//! ```

pub mod activities;
pub mod activity_log;
pub mod branches;
pub mod documents;
pub mod employees;
pub mod error;
pub mod etag;
pub mod expenditures;
pub mod extract;
pub mod password;
pub mod retry;
pub mod savings;
pub mod temp_employees;
pub mod users;
pub mod vacations;
pub mod vehicles;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use branchdesk_core::store::DocumentStore;
use chrono::{Datelike as _, NaiveDate, Utc};

pub use activity_log::ActivityLog;
pub use error::ApiError;

/// Shared handler state: the store and the activity queue.
pub struct ApiState<S> {
  pub store:    Arc<S>,
  pub activity: ActivityLog,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, activity: ActivityLog) -> Self { Self { store, activity } }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), activity: self.activity.clone() }
  }
}

/// The current UTC calendar date.
pub(crate) fn today() -> NaiveDate { Utc::now().date_naive() }

/// Model year given to vehicles submitted without one.
pub(crate) fn current_year() -> i32 { today().year() }

/// Build a fully-materialised API router over `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/login", post(users::login::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .put(users::update::<S>)
        .delete(users::delete_one::<S>),
    )
    // Employees
    .route("/employees", get(employees::list::<S>).post(employees::create::<S>))
    .route(
      "/employees/{id}",
      get(employees::get_one::<S>)
        .put(employees::update::<S>)
        .delete(employees::delete_one::<S>),
    )
    .route(
      "/temp-employees",
      get(temp_employees::list::<S>).post(temp_employees::create::<S>),
    )
    .route(
      "/temp-employees/{id}",
      put(temp_employees::update::<S>).delete(temp_employees::delete_one::<S>),
    )
    // Branches and their fleets
    .route("/branches", get(branches::list::<S>).post(branches::create::<S>))
    .route(
      "/branches/{id}",
      get(branches::get_one::<S>)
        .put(branches::update::<S>)
        .delete(branches::delete_one::<S>),
    )
    .route("/vehicles", get(vehicles::list::<S>).post(vehicles::create::<S>))
    .route(
      "/vehicles/{license}",
      put(vehicles::update::<S>).delete(vehicles::delete_one::<S>),
    )
    // Expiry scans
    .route("/documents/expiring", get(documents::expiring::<S>))
    .route("/documents/expired", get(documents::expired::<S>))
    // Audit trail
    .route("/activities", get(activities::recent::<S>).post(activities::create::<S>))
    // Vacations
    .route("/vacations", get(vacations::list::<S>).post(vacations::create::<S>))
    .route(
      "/vacations/{id}",
      put(vacations::update::<S>).delete(vacations::delete_one::<S>),
    )
    // Finance
    .route(
      "/expenditures",
      get(expenditures::list::<S>).post(expenditures::create::<S>),
    )
    .route("/expenditures/analytics", get(expenditures::analytics::<S>))
    .route(
      "/expenditures/{id}",
      put(expenditures::update::<S>).delete(expenditures::delete_one::<S>),
    )
    .route(
      "/monthly-savings/{branch_id}/{month}/{year}",
      get(savings::get_one::<S>).put(savings::upsert::<S>),
    )
    .with_state(state)
}
