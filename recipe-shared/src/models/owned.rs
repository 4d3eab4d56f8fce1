/// Ownership-scoped storage
///
/// Tags, ingredients and recipes each belong to exactly one account. Every
/// read and write goes through the functions in this module, which take the
/// owner's ID as an explicit parameter and only ever touch rows with a
/// matching `user_id`. A row owned by someone else is indistinguishable from
/// a missing row.
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::owned::{create_named_owned_by, list_owned_by};
/// use recipe_shared::models::tag::Tag;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let vegan: Tag = create_named_owned_by(&pool, owner_id, "Vegan").await?;
/// let tags: Vec<Tag> = list_owned_by(&pool, owner_id).await?;
/// assert!(tags.iter().any(|t| t.id == vegan.id));
/// # Ok(())
/// # }
/// ```

use sqlx::{postgres::PgRow, FromRow, PgConnection, PgPool};
use uuid::Uuid;

/// Maximum length of a name, in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// A row that belongs to one account
///
/// `TABLE` must have `id`, `user_id` and `name` columns; `COLUMNS` is the
/// select list that `FromRow` expects.
pub trait Owned: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
}

/// Invalid entity name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("This field may not be blank.")]
    Blank,

    #[error("Ensure this field has no more than 255 characters.")]
    TooLong,
}

/// Error type for ownership-scoped writes
#[derive(Debug, thiserror::Error)]
pub enum OwnedError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Trims a name and checks it is non-empty and short enough
///
/// ```
/// use recipe_shared::models::owned::{validate_name, NameError};
///
/// assert_eq!(validate_name("  Vegan "), Ok("Vegan".to_string()));
/// assert_eq!(validate_name("   "), Err(NameError::Blank));
/// ```
pub fn validate_name(name: &str) -> Result<String, NameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NameError::Blank);
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(NameError::TooLong);
    }
    Ok(name.to_string())
}

/// Lists the rows owned by `owner_id`, ordered by name descending
pub async fn list_owned_by<T: Owned>(pool: &PgPool, owner_id: Uuid) -> Result<Vec<T>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM {} WHERE user_id = $1 ORDER BY name DESC, id",
        T::COLUMNS,
        T::TABLE
    );

    sqlx::query_as::<_, T>(&sql).bind(owner_id).fetch_all(pool).await
}

/// Finds a row by ID within the rows owned by `owner_id`
pub async fn find_owned_by<T: Owned>(
    pool: &PgPool,
    owner_id: Uuid,
    id: Uuid,
) -> Result<Option<T>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1 AND user_id = $2",
        T::COLUMNS,
        T::TABLE
    );

    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
}

/// Locks and returns an owned row inside a transaction
pub(crate) async fn lock_owned_by<T: Owned>(
    conn: &mut PgConnection,
    owner_id: Uuid,
    id: Uuid,
) -> Result<Option<T>, sqlx::Error> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1 AND user_id = $2 FOR UPDATE",
        T::COLUMNS,
        T::TABLE
    );

    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(conn)
        .await
}

/// Creates a named row owned by `owner_id`
///
/// The owner is always the caller-supplied ID; nothing in the input can
/// change it.
pub async fn create_named_owned_by<T: Owned>(
    pool: &PgPool,
    owner_id: Uuid,
    name: &str,
) -> Result<T, OwnedError> {
    let name = validate_name(name)?;
    let sql = format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2) RETURNING {}",
        T::TABLE,
        T::COLUMNS
    );

    let row = sqlx::query_as::<_, T>(&sql)
        .bind(owner_id)
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Deletes a row owned by `owner_id`
///
/// Returns false when no such row is visible to the owner.
pub async fn delete_owned_by<T: Owned>(
    pool: &PgPool,
    owner_id: Uuid,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", T::TABLE);

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns the subset of `ids` that exist in `T::TABLE`, regardless of owner
pub(crate) async fn existing_ids<T: Owned>(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("SELECT id FROM {} WHERE id = ANY($1)", T::TABLE);

    sqlx::query_scalar::<_, Uuid>(&sql)
        .bind(ids)
        .fetch_all(conn)
        .await
}
