/// Startup wait for database availability
///
/// The server container usually starts before PostgreSQL accepts connections.
/// Before serving, the binary polls the database with a fixed number of
/// attempts separated by a fixed interval.
///
/// # Example
///
/// ```no_run
/// use recipe_shared::db::pool::DatabaseConfig;
/// use recipe_shared::db::wait::{wait_for_database, WaitPolicy};
///
/// # async fn example() -> Result<(), sqlx::Error> {
/// let config = DatabaseConfig::with_url("postgresql://localhost/recipe");
/// let pool = wait_for_database(config, WaitPolicy::default()).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use super::pool::{create_pool, DatabaseConfig};

/// How often and how long to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Total number of attempts, including the first one (at least 1)
    pub attempts: u32,

    /// Pause between two failed attempts
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_secs(1),
        }
    }
}

/// Retries `op` until it succeeds or the policy runs out of attempts
///
/// Returns the last error when every attempt failed.
pub async fn retry_fixed<T, E, F, Fut>(policy: WaitPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!(attempt, attempts, error = %e, "Database unavailable, waiting");
                tokio::time::sleep(policy.interval).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Waits until a pool can be created for `config`
pub async fn wait_for_database(
    config: DatabaseConfig,
    policy: WaitPolicy,
) -> Result<PgPool, sqlx::Error> {
    info!(attempts = policy.attempts, "Waiting for database");

    let pool = retry_fixed(policy, || create_pool(config.clone())).await?;

    info!("Database available");
    Ok(pool)
}
