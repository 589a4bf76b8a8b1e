//! # Taskdesk Shared Library
//!
//! Domain logic for the Taskdesk API server, kept free of HTTP routing.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, bearer tokens, identity resolution
//! - `credentials`: registration, login and account updates
//! - `task_access`: owner-scoped task operations
//! - `models`: users and tasks
//! - `store`: storage ports with PostgreSQL and in-memory adapters
//! - `db`: connection pool and migrations

pub mod auth;
pub mod credentials;
pub mod db;
pub mod models;
pub mod store;
pub mod task_access;

/// Current version of the Taskdesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
