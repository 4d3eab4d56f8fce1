//! # Recipe API Server
//!
//! Multi-tenant recipe backend: accounts with token authentication and
//! per-account tags, ingredients and recipes.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p recipe-api -- serve
//! cargo run -p recipe-api -- create-superuser --email admin@example.com --password s3cretpass
//! ```

use clap::Parser;
use recipe_api::cli::Cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_api=debug,recipe_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Recipe API v{} starting", env!("CARGO_PKG_VERSION"));

    Cli::parse().run().await
}
