/// Ingredient endpoints
///
/// - `GET /recipe/ingredients/` - List own ingredients, name descending
/// - `POST /recipe/ingredients/` - Create an ingredient owned by the caller

use super::tags::NameRequest;
use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::middleware::AuthContext,
    models::{
        ingredient::Ingredient,
        owned::{create_named_owned_by, list_owned_by},
    },
};

pub async fn list_ingredients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = list_owned_by::<Ingredient>(&state.db, auth.user_id).await?;

    Ok(Json(ingredients))
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<NameRequest>,
) -> ApiResult<(StatusCode, Json<Ingredient>)> {
    let ingredient: Ingredient =
        create_named_owned_by(&state.db, auth.user_id, &req.name).await?;
    tracing::debug!(ingredient_id = %ingredient.id, user_id = %auth.user_id, "Ingredient created");

    Ok((StatusCode::CREATED, Json(ingredient)))
}
