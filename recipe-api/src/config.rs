/// Configuration management for the API server
///
/// Configuration is read from environment variables; a `.env` file in the
/// working directory is loaded first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `DATABASE_WAIT_ATTEMPTS`: startup connection attempts (default: 30)
/// - `DATABASE_WAIT_INTERVAL_MS`: pause between attempts (default: 1000)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8000)
/// - `CORS_ORIGINS`: comma-separated allowed origins, `*` for any (default: *)
/// - `PRODUCTION`: enables HSTS (default: false)
/// - `RUST_LOG`: Log filter
///
/// # Example
///
/// ```no_run
/// use recipe_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use recipe_shared::db::{pool::DatabaseConfig, wait::WaitPolicy};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseSettings,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Connection attempts before startup gives up
    pub wait_attempts: u32,

    /// Pause between connection attempts (milliseconds)
    pub wait_interval_ms: u64,
}

impl DatabaseSettings {
    /// Pool configuration for these settings
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            ..Default::default()
        }
    }

    /// Startup wait policy for these settings
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            attempts: self.wait_attempts,
            interval: Duration::from_millis(self.wait_interval_ms),
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", name, e)),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a variable has an
    /// invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "API_PORT", 8000u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = parse_or(&lookup, "PRODUCTION", false)?;

        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseSettings {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
                wait_attempts: parse_or(&lookup, "DATABASE_WAIT_ATTEMPTS", 30)?,
                wait_interval_ms: parse_or(&lookup, "DATABASE_WAIT_INTERVAL_MS", 1000)?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}
