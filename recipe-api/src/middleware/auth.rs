/// Token authentication layer
///
/// Wraps every ownership-scoped and account route. A request without a valid
/// token is answered with 401 before its handler, and therefore before any
/// query on the caller's data, runs.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware::from_fn_with_state, routing::get, Extension, Router};
/// use recipe_api::{app::AppState, middleware::auth::token_auth_layer};
/// use recipe_shared::auth::middleware::AuthContext;
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.email
/// }
///
/// fn routes(state: AppState) -> Router<AppState> {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .route_layer(from_fn_with_state(state, token_auth_layer))
/// }
/// ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use recipe_shared::auth::middleware::authenticate_request;

use crate::{app::AppState, error::ApiError};

/// Resolves the request's token and stores the `AuthContext` extension
pub async fn token_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate_request(&state.db, req.headers()).await?;

    tracing::debug!(user_id = %auth.user_id, "Request authenticated");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
