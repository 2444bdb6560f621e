//! Core types and trait definitions for the branchdesk administration backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::DocumentStore`]; the API crate drives
//! the pure logic in [`expiry`], [`fleet`], [`finance`] and [`vacation`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod attachment;
pub mod branch;
pub mod date;
pub mod employee;
pub mod error;
pub mod expiry;
pub mod finance;
pub mod fleet;
pub mod record;
pub mod store;
pub mod user;
pub mod vacation;

pub use error::{Error, Result};
