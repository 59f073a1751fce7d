//! # Taskflow Shared Library
//!
//! Domain types, persistence and business logic used by the Taskflow API
//! server.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, session tokens, request authentication
//! - `db`: PostgreSQL pool and migrations
//! - `models`: users, tasks and the task status state machine
//! - `services`: task lifecycle and user operations
//! - `store`: the `Store` trait with PostgreSQL and in-memory implementations

pub mod auth;
pub mod db;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Taskflow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
