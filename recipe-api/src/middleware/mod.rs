/// Middleware modules for the API server
///
/// - `security`: security response headers
/// - `auth`: token authentication gate for scoped routes

pub mod auth;
pub mod security;
