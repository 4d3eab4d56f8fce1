/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use recipe_api::{app::{build_router, AppState}, config::Config};
/// use recipe_shared::db::pool::create_pool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(config.database.pool_config()).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::token_auth_layer, security::SecurityHeadersLayer},
    routes::{admin, health, ingredients, recipes, tags, users},
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health                    public
/// ├── POST   /users/create/             public
/// ├── POST   /users/token/              public
/// ├── DELETE /users/token/              token
/// ├── GET|PUT|PATCH /users/me/          token
/// ├── GET|POST /recipe/tags/            token
/// ├── GET|POST /recipe/ingredients/     token
/// ├── GET|POST /recipe/recipes/         token
/// ├── GET|PUT|PATCH|DELETE /recipe/recipes/:id/   token
/// ├── GET    /admin/users/              token, staff
/// └── PATCH  /admin/users/:id/          token, superuser
/// ```
///
/// The token gate is a route layer, so unknown paths answer 404 and a
/// known path with an unsupported method answers 405 once authenticated.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/users/create/", post(users::create_user))
        .route("/users/token/", post(users::create_token));

    let authenticated_routes = Router::new()
        .route("/users/token/", delete(users::revoke_token))
        .route(
            "/users/me/",
            get(users::me).put(users::replace_me).patch(users::update_me),
        )
        .route(
            "/recipe/tags/",
            get(tags::list_tags).post(tags::create_tag),
        )
        .route(
            "/recipe/ingredients/",
            get(ingredients::list_ingredients).post(ingredients::create_ingredient),
        )
        .route(
            "/recipe/recipes/",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipe/recipes/:id/",
            get(recipes::retrieve_recipe)
                .put(recipes::update_recipe)
                .patch(recipes::partial_update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/admin/users/", get(admin::list_users))
        .route("/admin/users/:id/", patch(admin::set_user_flags))
        .route_layer(from_fn_with_state(state.clone(), token_auth_layer));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
