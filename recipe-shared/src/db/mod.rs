/// Database layer for the recipe backend
///
/// This module provides database connection pooling, migrations and the
/// startup routine that waits for the database to accept connections.
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: Database migration runner
/// - `wait`: Fixed-interval retry used before the server starts
///
/// # Example
///
/// ```no_run
/// use recipe_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod wait;
