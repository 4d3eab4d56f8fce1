//! # Recipe Shared Library
//!
//! Data model, account store and access-control primitives shared by the
//! recipe API server and its command-line tooling.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool, migrations and the startup availability wait
//! - `models`: Accounts, auth tokens and the ownership-scoped entities
//! - `auth`: Password hashing, token utilities and authorization checks

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the recipe shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
