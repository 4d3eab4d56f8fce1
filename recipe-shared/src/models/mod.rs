/// Database models for the recipe service
///
/// # Models
///
/// - `user`: accounts, credentials and admin flags
/// - `auth_token`: opaque tokens issued at login
/// - `owned`: the ownership filter shared by every per-account table
/// - `tag`, `ingredient`: named rows attached to recipes
/// - `recipe`: recipes, their tag/ingredient links and wire representations
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::user::{NewUser, User};
/// use recipe_shared::models::auth_token::AuthToken;
/// use recipe_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::with_url("postgresql://localhost/recipe")).await?;
///
/// let user = User::create(&pool, NewUser {
///     email: "user@example.com".to_string(),
///     password: Some("longenough".to_string()),
///     name: "User".to_string(),
/// }).await?;
///
/// let (_, token) = AuthToken::issue(&pool, user.id).await?;
/// # Ok(())
/// # }
/// ```

pub mod auth_token;
pub mod ingredient;
pub mod owned;
pub mod recipe;
pub mod tag;
pub mod user;
