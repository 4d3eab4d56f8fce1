/// Command-line interface
///
/// ```text
/// recipe-api                      # same as `serve`
/// recipe-api serve                # wait for the database, migrate, serve
/// recipe-api wait-for-db          # exit once the database answers
/// recipe-api migrate              # create the database if needed and migrate
/// recipe-api create-superuser --email admin@example.com --password s3cretpass
/// ```

use crate::{
    app::{build_router, AppState},
    config::Config,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool},
        wait::wait_for_database,
    },
    models::user::{NewUser, User},
};
use sqlx::PgPool;

#[derive(Debug, Parser)]
#[command(name = "recipe-api")]
#[command(about = "Recipe API server and account tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Commands {
    /// Wait for the database, apply migrations and serve HTTP
    Serve,

    /// Block until the database accepts connections
    WaitForDb,

    /// Apply pending migrations
    Migrate,

    /// Create an account with staff and superuser flags
    CreateSuperuser {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SUPERUSER_PASSWORD")]
        password: String,

        #[arg(long, default_value = "")]
        name: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::from_env()?;

        match self.command.unwrap_or(Commands::Serve) {
            Commands::Serve => serve(config).await,
            Commands::WaitForDb => {
                let pool = wait(&config).await?;
                close_pool(pool).await;
                Ok(())
            }
            Commands::Migrate => {
                ensure_database_exists(&config.database.url).await?;
                let pool = create_pool(config.database.pool_config()).await?;
                run_migrations(&pool).await?;
                close_pool(pool).await;
                Ok(())
            }
            Commands::CreateSuperuser {
                email,
                password,
                name,
            } => {
                let pool = wait(&config).await?;
                let user = User::create_superuser(
                    &pool,
                    NewUser {
                        email,
                        password: Some(password),
                        name,
                    },
                )
                .await
                .context("Failed to create superuser")?;
                tracing::info!(user_id = %user.id, email = %user.email, "Superuser created");
                close_pool(pool).await;
                Ok(())
            }
        }
    }
}

async fn wait(config: &Config) -> Result<PgPool> {
    let pool = wait_for_database(
        config.database.pool_config(),
        config.database.wait_policy(),
    )
    .await
    .context("Database did not become available")?;

    Ok(pool)
}

async fn serve(config: Config) -> Result<()> {
    let pool = wait(&config).await?;
    run_migrations(&pool).await?;

    let addr = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
