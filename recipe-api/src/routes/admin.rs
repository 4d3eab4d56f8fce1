/// Account administration
///
/// - `GET /admin/users/` - List accounts with their flags (staff)
/// - `PATCH /admin/users/:id/` - Set account flags (superuser)

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiPath, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use recipe_shared::{
    auth::{
        authorization::{require_staff, require_superuser},
        middleware::AuthContext,
    },
    models::user::{AccountFlags, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account as seen by staff
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminUserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for AdminUserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Flag update request; omitted flags are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct FlagsRequest {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<AdminUserResponse>>> {
    require_staff(&auth)?;

    let users = User::list(&state.db).await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Set account flags
///
/// # Errors
///
/// - `400 Bad Request`: no flag supplied
/// - `403 Forbidden`: caller is not a superuser
/// - `404 Not Found`: no such account
pub async fn set_user_flags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<FlagsRequest>,
) -> ApiResult<Json<AdminUserResponse>> {
    require_superuser(&auth)?;

    let flags = AccountFlags {
        is_active: req.is_active,
        is_staff: req.is_staff,
        is_superuser: req.is_superuser,
    };
    if flags.is_empty() {
        return Err(ApiError::BadRequest(
            "At least one of is_active, is_staff, is_superuser is required".to_string(),
        ));
    }

    let user = User::set_flags(&state.db, id, flags)
        .await?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(
        user_id = %user.id,
        by = %auth.user_id,
        is_active = user.is_active,
        is_staff = user.is_staff,
        is_superuser = user.is_superuser,
        "Account flags changed"
    );

    Ok(Json(user.into()))
}
