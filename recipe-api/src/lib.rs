//! # Recipe API Server Library
//!
//! HTTP surface of the recipe backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `cli`: Command-line entry points (serve, migrate, wait-for-db, create-superuser)
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Token authentication and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
