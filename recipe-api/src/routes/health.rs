/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
///
/// The endpoint answers 200 even when the database is unreachable; the
/// `status` field reports `degraded` in that case.

use crate::app::AppState;
use axum::{extract::State, Json};
use recipe_shared::db::pool::health_check as database_health_check;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

impl HealthResponse {
    fn new(database_connected: bool) -> Self {
        let (status, database) = if database_connected {
            ("healthy", "connected")
        } else {
            ("degraded", "disconnected")
        };

        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match database_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse::new(connected))
}
