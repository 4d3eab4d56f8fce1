/// Token authentication for Axum
///
/// Resolves the `Authorization` header of a request to an active account and
/// produces the [`AuthContext`] that handlers read from request extensions.
/// Every ownership-scoped route sits behind this gate, so an unauthenticated
/// request is rejected before any recipe data is read.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::Request, middleware::Next, response::{IntoResponse, Response}};
/// use recipe_shared::auth::middleware::authenticate_request;
/// use sqlx::PgPool;
///
/// async fn gate(pool: PgPool, mut req: Request, next: Next) -> Response {
///     match authenticate_request(&pool, req.headers()).await {
///         Ok(auth) => {
///             req.extensions_mut().insert(auth);
///             next.run(req).await
///         }
///         Err(_) => axum::http::StatusCode::UNAUTHORIZED.into_response(),
///     }
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::token::{parse_authorization, validate_token_format};
use crate::models::auth_token::{AuthToken, TokenOwner};

/// Authentication context added to request extensions
///
/// Handlers extract it with `Extension<AuthContext>` and pass `user_id`
/// explicitly to every ownership-scoped store call.
///
/// ```
/// use axum::Extension;
/// use recipe_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.email)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated account
    pub user_id: Uuid,

    /// Normalized email of the account
    pub email: String,

    /// Account may use the staff admin routes
    pub is_staff: bool,

    /// Account may change account flags
    pub is_superuser: bool,

    /// Token the request was authenticated with
    pub token_id: Uuid,
}

impl AuthContext {
    /// Builds the context for a resolved token
    pub fn from_token_owner(owner: &TokenOwner) -> Self {
        Self {
            user_id: owner.user.id,
            email: owner.user.email.clone(),
            is_staff: owner.user.is_staff,
            is_superuser: owner.user.is_superuser,
            token_id: owner.token_id,
        }
    }
}

/// Error type for the authentication gate
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Authentication credentials were not provided")]
    MissingCredentials,

    /// Header present but not `Token <key>` / `Bearer <key>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Unknown token, or its account is inactive
    #[error("Invalid token")]
    InvalidToken,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Resolves the request headers to an authenticated account
///
/// # Errors
///
/// - `MissingCredentials` when there is no `Authorization` header
/// - `InvalidFormat` when the scheme is not `Token` or `Bearer`
/// - `InvalidToken` when the token is malformed, unknown or belongs to an
///   inactive account
pub async fn authenticate_request(
    pool: &PgPool,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    let token = parse_authorization(auth_header)
        .ok_or_else(|| AuthError::InvalidFormat("Expected 'Token <key>'".to_string()))?;

    // Malformed tokens never reach the database
    if !validate_token_format(token) {
        debug!("Rejected malformed token");
        return Err(AuthError::InvalidToken);
    }

    let owner = AuthToken::authenticate(pool, token)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    Ok(AuthContext::from_token_owner(&owner))
}
