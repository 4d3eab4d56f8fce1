/// Recipe endpoints
///
/// # Endpoints
///
/// - `GET /recipe/recipes/` - List own recipes (compact)
/// - `POST /recipe/recipes/` - Create a recipe (compact, 201)
/// - `GET /recipe/recipes/:id/` - Retrieve (expanded)
/// - `PUT /recipe/recipes/:id/` - Replace (compact)
/// - `PATCH /recipe/recipes/:id/` - Update supplied fields (compact)
/// - `DELETE /recipe/recipes/:id/` - Delete (204)
///
/// # Representations
///
/// Compact:
///
/// ```json
/// { "id": "…", "name": "Curry", "time_minutes": 30, "price": "8.50",
///   "link": null, "tags": ["…"], "ingredients": ["…"] }
/// ```
///
/// Expanded replaces the ID lists with `{ "id", "name" }` objects.

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiPath, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use recipe_shared::{
    auth::middleware::AuthContext,
    models::recipe::{Recipe, RecipeInput, RecipePatch, RecipeRepresentation, RecipeView},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Create or replace request
///
/// `price` accepts a JSON number or a decimal string.
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub name: String,

    #[serde(default)]
    pub time_minutes: i32,

    #[serde(default)]
    pub price: Decimal,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub tags: Vec<Uuid>,

    #[serde(default)]
    pub ingredients: Vec<Uuid>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(req: RecipeRequest) -> Self {
        Self {
            name: req.name,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
}

/// Partial update request
///
/// An absent key leaves the field unchanged. `link` may be `null` to clear
/// it; `null` on any other field is rejected.
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatchRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "present")]
    pub time_minutes: Option<i32>,

    #[serde(default, deserialize_with = "present")]
    pub price: Option<Decimal>,

    #[serde(default, deserialize_with = "present")]
    pub link: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    pub tags: Option<Vec<Uuid>>,

    #[serde(default, deserialize_with = "present")]
    pub ingredients: Option<Vec<Uuid>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<RecipePatchRequest> for RecipePatch {
    fn from(req: RecipePatchRequest) -> Self {
        Self {
            name: req.name,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
}

pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<RecipeRepresentation>>> {
    let recipes = Recipe::list_for(&state.db, auth.user_id).await?;

    Ok(Json(
        recipes
            .into_iter()
            .map(|recipe| recipe.represent(RecipeView::Compact))
            .collect(),
    ))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeRepresentation>)> {
    let recipe = Recipe::create(&state.db, auth.user_id, req.into()).await?;
    tracing::debug!(recipe_id = %recipe.recipe.id, user_id = %auth.user_id, "Recipe created");

    Ok((
        StatusCode::CREATED,
        Json(recipe.represent(RecipeView::Compact)),
    ))
}

/// Retrieve one recipe with its tags and ingredients inlined
pub async fn retrieve_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<RecipeRepresentation>> {
    let recipe = Recipe::find_for(&state.db, auth.user_id, id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(recipe.represent(RecipeView::Expanded)))
}

/// Replace a recipe; omitted optional fields reset to their defaults
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RecipeRequest>,
) -> ApiResult<Json<RecipeRepresentation>> {
    let recipe = Recipe::update(&state.db, auth.user_id, id, req.into())
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(recipe.represent(RecipeView::Compact)))
}

pub async fn partial_update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RecipePatchRequest>,
) -> ApiResult<Json<RecipeRepresentation>> {
    let recipe = Recipe::patch(&state.db, auth.user_id, id, req.into())
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(recipe.represent(RecipeView::Compact)))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    if !Recipe::delete(&state.db, auth.user_id, id).await? {
        return Err(ApiError::not_found());
    }

    tracing::debug!(recipe_id = %id, user_id = %auth.user_id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
