/// Recipe model and database operations
///
/// A recipe is owned by one account and references sets of tags and
/// ingredients through the `recipe_tags` and `recipe_ingredients` join
/// tables. The recipe row and its join rows are always written in a single
/// transaction.
///
/// Referenced tag and ingredient IDs must exist, but they are not required
/// to belong to the recipe's owner.
///
/// # Representations
///
/// A loaded [`RecipeWithRelations`] is rendered in one of two shapes, picked
/// by [`RecipeView`]:
///
/// - `Compact`: `tags` and `ingredients` as lists of IDs
/// - `Expanded`: `tags` and `ingredients` as `{id, name}` objects
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (name <> ''),
///     time_minutes INTEGER NOT NULL DEFAULT 0,
///     price NUMERIC(5, 2) NOT NULL DEFAULT 0.00,
///     link VARCHAR(255)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::recipe::{Recipe, RecipeInput, RecipeView};
/// use rust_decimal::Decimal;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid, vegan: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let recipe = Recipe::create(&pool, owner_id, RecipeInput {
///     name: "Chickpea curry".to_string(),
///     time_minutes: 30,
///     price: Decimal::new(850, 2),
///     tags: vec![vegan],
///     ..Default::default()
/// }).await?;
///
/// let body = serde_json::to_value(recipe.represent(RecipeView::Compact))?;
/// assert_eq!(body["price"], "8.50");
/// # Ok(())
/// # }
/// ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use super::ingredient::Ingredient;
use super::owned::{
    delete_owned_by, existing_ids, find_owned_by, list_owned_by, lock_owned_by, validate_name,
    NameError, Owned,
};
use super::tag::Tag;

/// Maximum length of a recipe link, in characters
pub const MAX_LINK_LENGTH: usize = 255;

/// Digits after the decimal point of a price
const PRICE_DECIMAL_PLACES: u32 = 2;

/// Prices must stay below this (NUMERIC(5, 2))
const PRICE_LIMIT: i64 = 1000;

/// Recipe row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: Uuid,

    #[serde(skip)]
    pub user_id: Uuid,

    pub name: String,

    pub time_minutes: i32,

    /// Fixed-point price, serialized as a decimal string
    pub price: Decimal,

    pub link: Option<String>,
}

impl Owned for Recipe {
    const TABLE: &'static str = "recipes";
    const COLUMNS: &'static str = "id, user_id, name, time_minutes, price, link";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// A recipe with its tag and ingredient sets loaded
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeWithRelations {
    pub recipe: Recipe,

    /// Ordered by name
    pub tags: Vec<Tag>,

    /// Ordered by name
    pub ingredients: Vec<Ingredient>,
}

/// Full set of writable recipe fields
///
/// Used for creation and full replacement. Fields left at their default
/// reset the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeInput {
    pub name: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

/// Partial recipe change; `None` leaves a field untouched
///
/// A supplied `tags` or `ingredients` list replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    /// `Some(None)` clears the link
    pub link: Option<Option<String>>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

/// Error type for recipe writes
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error("{0}")]
    InvalidPrice(&'static str),

    #[error("Ensure this value is greater than or equal to 0.")]
    NegativeTime,

    #[error("Ensure this field has no more than 255 characters.")]
    LinkTooLong,

    #[error("Invalid pk \"{0}\" - object does not exist.")]
    UnknownTag(Uuid),

    #[error("Invalid pk \"{0}\" - object does not exist.")]
    UnknownIngredient(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RecipeError {
    /// Request field the error refers to, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            RecipeError::Name(_) => Some("name"),
            RecipeError::InvalidPrice(_) => Some("price"),
            RecipeError::NegativeTime => Some("time_minutes"),
            RecipeError::LinkTooLong => Some("link"),
            RecipeError::UnknownTag(_) => Some("tags"),
            RecipeError::UnknownIngredient(_) => Some("ingredients"),
            RecipeError::Database(_) => None,
        }
    }
}

/// Checks a price fits NUMERIC(5, 2) and rescales it to two places
///
/// ```
/// use recipe_shared::models::recipe::validate_price;
/// use rust_decimal::Decimal;
///
/// assert_eq!(validate_price(Decimal::new(5, 0)).map(|p| p.to_string()).ok(), Some("5.00".to_string()));
/// assert!(validate_price(Decimal::new(1001, 3)).is_err());
/// assert!(validate_price(Decimal::new(1000, 0)).is_err());
/// ```
pub fn validate_price(price: Decimal) -> Result<Decimal, RecipeError> {
    let price = price.normalize();

    if price.scale() > PRICE_DECIMAL_PLACES {
        return Err(RecipeError::InvalidPrice(
            "Ensure that there are no more than 2 decimal places.",
        ));
    }

    if price.abs() >= Decimal::from(PRICE_LIMIT) {
        return Err(RecipeError::InvalidPrice(
            "Ensure that there are no more than 5 digits in total.",
        ));
    }

    Ok(fixed_point(price))
}

/// Rescales a price to two places; NUMERIC zero decodes with scale 0
fn fixed_point(mut price: Decimal) -> Decimal {
    price.rescale(PRICE_DECIMAL_PLACES);
    price
}

fn validate_time(time_minutes: i32) -> Result<i32, RecipeError> {
    if time_minutes < 0 {
        return Err(RecipeError::NegativeTime);
    }
    Ok(time_minutes)
}

/// Trims a link; blank links are stored as NULL
fn validate_link(link: Option<String>) -> Result<Option<String>, RecipeError> {
    let link = link
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    if let Some(ref l) = link {
        if l.chars().count() > MAX_LINK_LENGTH {
            return Err(RecipeError::LinkTooLong);
        }
    }
    Ok(link)
}

/// Drops repeated IDs, keeping first occurrences in order
fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl RecipeInput {
    /// Normalizes every field, failing on the first invalid one
    pub fn validated(self) -> Result<Self, RecipeError> {
        Ok(Self {
            name: validate_name(&self.name)?,
            time_minutes: validate_time(self.time_minutes)?,
            price: validate_price(self.price)?,
            link: validate_link(self.link)?,
            tags: dedup_ids(self.tags),
            ingredients: dedup_ids(self.ingredients),
        })
    }
}

impl RecipePatch {
    /// Normalizes every supplied field
    pub fn validated(self) -> Result<Self, RecipeError> {
        Ok(Self {
            name: self.name.as_deref().map(validate_name).transpose()?,
            time_minutes: self.time_minutes.map(validate_time).transpose()?,
            price: self.price.map(validate_price).transpose()?,
            link: self.link.map(validate_link).transpose()?,
            tags: self.tags.map(dedup_ids),
            ingredients: self.ingredients.map(dedup_ids),
        })
    }
}

/// Which representation a response uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeView {
    /// Related rows as ID lists
    Compact,

    /// Related rows as `{id, name}` objects
    Expanded,
}

/// Recipe with related rows as ID lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactRecipe {
    pub id: Uuid,
    pub name: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

/// Recipe with related rows inlined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedRecipe {
    pub id: Uuid,
    pub name: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

/// Wire form of a recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecipeRepresentation {
    Compact(CompactRecipe),
    Expanded(ExpandedRecipe),
}

fn ids_of<T: Owned>(rows: &[T]) -> Vec<Uuid> {
    rows.iter().map(Owned::id).collect()
}

impl RecipeWithRelations {
    /// Renders the recipe in the requested shape
    pub fn represent(self, view: RecipeView) -> RecipeRepresentation {
        let Recipe {
            id,
            name,
            time_minutes,
            price,
            link,
            ..
        } = self.recipe;
        let price = fixed_point(price);

        match view {
            RecipeView::Compact => RecipeRepresentation::Compact(CompactRecipe {
                id,
                name,
                time_minutes,
                price,
                link,
                tags: ids_of(&self.tags),
                ingredients: ids_of(&self.ingredients),
            }),
            RecipeView::Expanded => RecipeRepresentation::Expanded(ExpandedRecipe {
                id,
                name,
                time_minutes,
                price,
                link,
                tags: self.tags,
                ingredients: self.ingredients,
            }),
        }
    }
}

/// A many-to-many join table between recipes and one related table
struct Link {
    table: &'static str,
    column: &'static str,
    target: &'static str,
}

const TAG_LINK: Link = Link {
    table: "recipe_tags",
    column: "tag_id",
    target: "tags",
};

const INGREDIENT_LINK: Link = Link {
    table: "recipe_ingredients",
    column: "ingredient_id",
    target: "ingredients",
};

/// `(id, user_id, name)` of a related row
type LinkedRow = (Uuid, Uuid, String);

/// Loads the related rows of `recipe_ids`, grouped by recipe
async fn linked_rows(
    conn: &mut PgConnection,
    link: &Link,
    recipe_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<LinkedRow>>, sqlx::Error> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT l.recipe_id, t.id, t.user_id, t.name \
         FROM {} l JOIN {} t ON t.id = l.{} \
         WHERE l.recipe_id = ANY($1) \
         ORDER BY t.name, t.id",
        link.table, link.target, link.column
    );

    let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String)>(&sql)
        .bind(recipe_ids)
        .fetch_all(conn)
        .await?;

    let mut grouped: HashMap<Uuid, Vec<LinkedRow>> = HashMap::new();
    for (recipe_id, id, user_id, name) in rows {
        grouped.entry(recipe_id).or_default().push((id, user_id, name));
    }

    Ok(grouped)
}

/// Replaces the related set of one recipe
async fn replace_links(
    conn: &mut PgConnection,
    link: &Link,
    recipe_id: Uuid,
    ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    let delete = format!("DELETE FROM {} WHERE recipe_id = $1", link.table);
    sqlx::query(&delete)
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if !ids.is_empty() {
        let insert = format!(
            "INSERT INTO {} (recipe_id, {}) SELECT $1, UNNEST($2::uuid[])",
            link.table, link.column
        );
        sqlx::query(&insert)
            .bind(recipe_id)
            .bind(ids)
            .execute(&mut *conn)
            .await?;
    }

    debug!(%recipe_id, table = link.table, count = ids.len(), "Replaced recipe links");
    Ok(())
}

/// Fails with the first referenced ID that does not exist
async fn check_related(
    conn: &mut PgConnection,
    tags: Option<&[Uuid]>,
    ingredients: Option<&[Uuid]>,
) -> Result<(), RecipeError> {
    if let Some(tags) = tags {
        let found = existing_ids::<Tag>(&mut *conn, tags).await?;
        if let Some(missing) = tags.iter().find(|id| !found.contains(id)) {
            return Err(RecipeError::UnknownTag(*missing));
        }
    }

    if let Some(ingredients) = ingredients {
        let found = existing_ids::<Ingredient>(&mut *conn, ingredients).await?;
        if let Some(missing) = ingredients.iter().find(|id| !found.contains(id)) {
            return Err(RecipeError::UnknownIngredient(*missing));
        }
    }

    Ok(())
}

/// Loads tag and ingredient sets for `recipes`, keeping their order
async fn with_relations(
    conn: &mut PgConnection,
    recipes: Vec<Recipe>,
) -> Result<Vec<RecipeWithRelations>, sqlx::Error> {
    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let mut tags = linked_rows(&mut *conn, &TAG_LINK, &ids).await?;
    let mut ingredients = linked_rows(&mut *conn, &INGREDIENT_LINK, &ids).await?;

    let loaded = recipes
        .into_iter()
        .map(|recipe| Recipe {
            price: fixed_point(recipe.price),
            ..recipe
        })
        .map(|recipe| RecipeWithRelations {
            tags: tags
                .remove(&recipe.id)
                .unwrap_or_default()
                .into_iter()
                .map(|(id, user_id, name)| Tag { id, user_id, name })
                .collect(),
            ingredients: ingredients
                .remove(&recipe.id)
                .unwrap_or_default()
                .into_iter()
                .map(|(id, user_id, name)| Ingredient { id, user_id, name })
                .collect(),
            recipe,
        })
        .collect();

    Ok(loaded)
}

async fn with_relations_one(
    conn: &mut PgConnection,
    recipe: Recipe,
) -> Result<RecipeWithRelations, sqlx::Error> {
    with_relations(conn, vec![recipe])
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)
}

impl Recipe {
    /// Lists the recipes of `owner_id`, ordered by name descending
    pub async fn list_for(
        pool: &PgPool,
        owner_id: Uuid,
    ) -> Result<Vec<RecipeWithRelations>, sqlx::Error> {
        let recipes: Vec<Recipe> = list_owned_by(pool, owner_id).await?;
        let mut conn = pool.acquire().await?;
        with_relations(&mut conn, recipes).await
    }

    /// Finds one recipe of `owner_id` with its relations
    pub async fn find_for(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<RecipeWithRelations>, sqlx::Error> {
        let Some(recipe) = find_owned_by::<Recipe>(pool, owner_id, id).await? else {
            return Ok(None);
        };

        let mut conn = pool.acquire().await?;
        with_relations_one(&mut conn, recipe).await.map(Some)
    }

    /// Creates a recipe owned by `owner_id` together with its links
    ///
    /// # Errors
    ///
    /// Any validation error, or `UnknownTag` / `UnknownIngredient` for IDs
    /// that do not exist. Nothing is written on error.
    pub async fn create(
        pool: &PgPool,
        owner_id: Uuid,
        input: RecipeInput,
    ) -> Result<RecipeWithRelations, RecipeError> {
        let input = input.validated()?;

        let mut tx = pool.begin().await?;
        check_related(&mut tx, Some(&input.tags), Some(&input.ingredients)).await?;

        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, name, time_minutes, price, link)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, time_minutes, price, link
            "#,
        )
        .bind(owner_id)
        .bind(&input.name)
        .bind(input.time_minutes)
        .bind(input.price)
        .bind(&input.link)
        .fetch_one(&mut *tx)
        .await?;

        replace_links(&mut tx, &TAG_LINK, recipe.id, &input.tags).await?;
        replace_links(&mut tx, &INGREDIENT_LINK, recipe.id, &input.ingredients).await?;

        let loaded = with_relations_one(&mut tx, recipe).await?;
        tx.commit().await?;

        debug!(recipe_id = %loaded.recipe.id, %owner_id, "Created recipe");
        Ok(loaded)
    }

    /// Replaces every field of a recipe of `owner_id`
    ///
    /// Returns `None` when the recipe is not visible to the owner.
    pub async fn update(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        input: RecipeInput,
    ) -> Result<Option<RecipeWithRelations>, RecipeError> {
        let input = input.validated()?;

        let mut tx = pool.begin().await?;
        if lock_owned_by::<Recipe>(&mut tx, owner_id, id).await?.is_none() {
            return Ok(None);
        }
        check_related(&mut tx, Some(&input.tags), Some(&input.ingredients)).await?;

        let recipe = Self::write_fields(
            &mut tx,
            id,
            &input.name,
            input.time_minutes,
            input.price,
            input.link.as_deref(),
        )
        .await?;

        replace_links(&mut tx, &TAG_LINK, id, &input.tags).await?;
        replace_links(&mut tx, &INGREDIENT_LINK, id, &input.ingredients).await?;

        let loaded = with_relations_one(&mut tx, recipe).await?;
        tx.commit().await?;

        Ok(Some(loaded))
    }

    /// Changes the supplied fields of a recipe of `owner_id`
    ///
    /// Returns `None` when the recipe is not visible to the owner.
    pub async fn patch(
        pool: &PgPool,
        owner_id: Uuid,
        id: Uuid,
        patch: RecipePatch,
    ) -> Result<Option<RecipeWithRelations>, RecipeError> {
        let patch = patch.validated()?;

        let mut tx = pool.begin().await?;
        let Some(current) = lock_owned_by::<Recipe>(&mut tx, owner_id, id).await? else {
            return Ok(None);
        };
        check_related(&mut tx, patch.tags.as_deref(), patch.ingredients.as_deref()).await?;

        let link = match patch.link {
            Some(link) => link,
            None => current.link,
        };
        let recipe = Self::write_fields(
            &mut tx,
            id,
            patch.name.as_deref().unwrap_or(&current.name),
            patch.time_minutes.unwrap_or(current.time_minutes),
            patch.price.unwrap_or(current.price),
            link.as_deref(),
        )
        .await?;

        if let Some(ref tags) = patch.tags {
            replace_links(&mut tx, &TAG_LINK, id, tags).await?;
        }
        if let Some(ref ingredients) = patch.ingredients {
            replace_links(&mut tx, &INGREDIENT_LINK, id, ingredients).await?;
        }

        let loaded = with_relations_one(&mut tx, recipe).await?;
        tx.commit().await?;

        Ok(Some(loaded))
    }

    async fn write_fields(
        conn: &mut PgConnection,
        id: Uuid,
        name: &str,
        time_minutes: i32,
        price: Decimal,
        link: Option<&str>,
    ) -> Result<Recipe, sqlx::Error> {
        sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET name = $2, time_minutes = $3, price = $4, link = $5
            WHERE id = $1
            RETURNING id, user_id, name, time_minutes, price, link
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(time_minutes)
        .bind(price)
        .bind(link)
        .fetch_one(conn)
        .await
    }

    /// Deletes a recipe of `owner_id`; join rows cascade
    pub async fn delete(pool: &PgPool, owner_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        delete_owned_by::<Recipe>(pool, owner_id, id).await
    }
}
