/// Account endpoints
///
/// # Endpoints
///
/// - `POST /users/create/` - Create an account
/// - `POST /users/token/` - Exchange email and password for a token
/// - `DELETE /users/token/` - Revoke the token used for the request
/// - `GET /users/me/` - Own profile
/// - `PUT /users/me/` - Replace own profile
/// - `PATCH /users/me/` - Update part of own profile

use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::middleware::AuthContext,
    models::{
        auth_token::AuthToken,
        user::{AccountError, NewUser, ProfileUpdate, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create account request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Ensure this field has 1 to 255 characters."))]
    pub name: String,
}

/// Token request
///
/// Both fields default to empty so that a missing field reports the same
/// per-field error as an empty one.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Full profile update (`PUT`)
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceProfileRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 1, max = 255, message = "Ensure this field has 1 to 255 characters."))]
    pub name: String,

    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    pub password: String,
}

/// Partial profile update (`PATCH`)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Ensure this field has 1 to 255 characters."))]
    pub name: Option<String>,

    #[validate(length(min = 8, message = "Ensure this field has at least 8 characters."))]
    pub password: Option<String>,
}

/// Public account representation; the credential is never serialized
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

/// Create an account
///
/// ```text
/// POST /users/create/
///
/// { "email": "cook@example.com", "password": "longenough", "name": "Cook" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: invalid or duplicate email, short password, blank name
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    req.validate()?;

    let user = User::create(
        &state.db,
        NewUser {
            email: req.email,
            password: Some(req.password),
            name: req.name,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "Account created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Issue a token for valid credentials
///
/// # Errors
///
/// - `400 Bad Request`: missing or empty field
/// - `403 Forbidden`: unknown email, wrong password or inactive account
pub async fn create_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    req.validate()?;

    let user = match User::authenticate(&state.db, &req.email, &req.password).await {
        Ok(user) => user,
        Err(AccountError::AuthenticationFailed) => {
            tracing::warn!("Token request with invalid credentials");
            return Err(AccountError::AuthenticationFailed.into());
        }
        Err(e) => return Err(e.into()),
    };

    let (record, token) = AuthToken::issue(&state.db, user.id).await?;
    tracing::info!(user_id = %user.id, token_prefix = %record.key_prefix, "Token issued");

    Ok(Json(TokenResponse { token }))
}

/// Revoke the presented token
pub async fn revoke_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    AuthToken::revoke(&state.db, auth.user_id, auth.token_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn current_user(state: &AppState, auth: &AuthContext) -> ApiResult<User> {
    User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| AccountError::NotFound.into())
}

/// Own profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = current_user(&state, &auth).await?;

    Ok(Json(user.into()))
}

/// Replace own profile; every field is required
pub async fn replace_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ReplaceProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let user = User::update_profile(
        &state.db,
        auth.user_id,
        ProfileUpdate {
            email: Some(req.email),
            name: Some(req.name),
            password: Some(req.password),
        },
    )
    .await?;

    Ok(Json(user.into()))
}

/// Update the supplied profile fields
///
/// A new password replaces the stored credential; the old one stops
/// verifying immediately.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let user = User::update_profile(
        &state.db,
        auth.user_id,
        ProfileUpdate {
            email: req.email,
            name: req.name,
            password: req.password,
        },
    )
    .await?;

    Ok(Json(user.into()))
}
