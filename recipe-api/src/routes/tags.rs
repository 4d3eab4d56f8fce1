/// Tag endpoints
///
/// - `GET /recipe/tags/` - List own tags, name descending
/// - `POST /recipe/tags/` - Create a tag owned by the caller

use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::middleware::AuthContext,
    models::{
        owned::{create_named_owned_by, list_owned_by},
        tag::Tag,
    },
};
use serde::Deserialize;

/// Name-only create request shared by tags and ingredients
///
/// Any other field in the body, including an owner, is ignored.
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Tag>>> {
    let tags = list_owned_by::<Tag>(&state.db, auth.user_id).await?;

    Ok(Json(tags))
}

pub async fn create_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<NameRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    let tag: Tag = create_named_owned_by(&state.db, auth.user_id, &req.name).await?;
    tracing::debug!(tag_id = %tag.id, user_id = %auth.user_id, "Tag created");

    Ok((StatusCode::CREATED, Json(tag)))
}
