/// Account model and database operations
///
/// Accounts are identified by their email address. Emails are normalized
/// (trimmed, lower-cased) before every lookup and write, so `A@B.com` and
/// `a@b.com` name the same account. Credentials are stored as Argon2id hashes;
/// an account created without a password gets an unusable credential.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     name VARCHAR(255) NOT NULL DEFAULT '',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_staff BOOLEAN NOT NULL DEFAULT FALSE,
///     is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use recipe_shared::models::user::{NewUser, User};
/// use recipe_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::with_url("postgresql://localhost/recipe")).await?;
///
/// let user = User::create(&pool, NewUser {
///     email: "Cook@Example.com".to_string(),
///     password: Some("longenough".to_string()),
///     name: "Cook".to_string(),
/// }).await?;
/// assert_eq!(user.email, "cook@example.com");
///
/// let same = User::authenticate(&pool, "cook@example.com", "longenough").await?;
/// assert_eq!(same.id, user.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{
    hash_password, is_usable, make_password, verify_dummy_password, verify_password, PasswordError,
};

/// Unique constraint on `users.email`
const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Account model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique account ID
    pub id: Uuid,

    /// Normalized email address, unique across accounts
    pub email: String,

    /// Argon2id hash, or an unusable marker
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name
    pub name: String,

    /// Inactive accounts cannot authenticate
    pub is_active: bool,

    pub is_staff: bool,

    pub is_superuser: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Set on every successful password authentication
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating an account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    /// Email address, normalized before storage
    pub email: String,

    /// Plaintext password; `None` stores an unusable credential
    pub password: Option<String>,

    /// Display name
    #[serde(default)]
    pub name: String,
}

/// Self-service profile changes
///
/// Only `Some` fields are written. A new password is re-hashed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Administrative flag changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFlags {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl AccountFlags {
    /// Whether any flag would change
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.is_staff.is_none() && self.is_superuser.is_none()
    }
}

/// Error type for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Email is empty after normalization
    #[error("User must have an email address")]
    MissingEmail,

    /// Another account already uses this email
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    /// No active account matches the credentials
    #[error("Unable to authenticate with provided credentials")]
    AuthenticationFailed,

    /// Account does not exist
    #[error("User not found")]
    NotFound,

    /// Credential hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Trims and lower-cases an email address
///
/// ```
/// use recipe_shared::models::user::normalize_email;
///
/// assert_eq!(normalize_email("  Cook@Example.COM "), "cook@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalizes `email` and rejects it when nothing is left
fn required_email(email: &str) -> Result<String, AccountError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AccountError::MissingEmail);
    }
    Ok(email)
}

/// Maps a unique violation on the email column to `DuplicateEmail`
fn map_email_conflict(e: sqlx::Error, email: &str) -> AccountError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return AccountError::DuplicateEmail(email.to_string());
        }
    }
    AccountError::Database(e)
}

impl User {
    /// Creates a regular account
    ///
    /// # Errors
    ///
    /// - `MissingEmail` if the email is empty after trimming
    /// - `DuplicateEmail` if the normalized email is taken
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, AccountError> {
        Self::insert(pool, data, false).await
    }

    /// Creates an account with `is_staff` and `is_superuser` set
    pub async fn create_superuser(pool: &PgPool, data: NewUser) -> Result<Self, AccountError> {
        Self::insert(pool, data, true).await
    }

    async fn insert(pool: &PgPool, data: NewUser, privileged: bool) -> Result<Self, AccountError> {
        let email = required_email(&data.email)?;
        let password_hash = make_password(data.password.as_deref())?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, name, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, email, password_hash, name, is_active, is_staff, is_superuser,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(&email)
        .bind(password_hash)
        .bind(data.name.trim())
        .bind(privileged)
        .fetch_one(pool)
        .await
        .map_err(|e| map_email_conflict(e, &email))?;

        info!(user_id = %user.id, privileged, "Created account");
        Ok(user)
    }

    /// Finds an account by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, is_active, is_staff, is_superuser,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds an account by email; the lookup is normalized
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, is_active, is_staff, is_superuser,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Verifies credentials and stamps `last_login_at`
    ///
    /// Unknown emails, inactive accounts, unusable credentials and wrong
    /// passwords all fail with the same `AuthenticationFailed`.
    pub async fn authenticate(
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<Self, AccountError> {
        let user = match Self::find_by_email(pool, email).await? {
            Some(user) if user.is_active => user,
            _ => {
                verify_dummy_password(password);
                warn!("Authentication failed: no active account");
                return Err(AccountError::AuthenticationFailed);
            }
        };

        if !is_usable(&user.password_hash) {
            verify_dummy_password(password);
            warn!(user_id = %user.id, "Authentication failed: no usable password");
            return Err(AccountError::AuthenticationFailed);
        }

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "Authentication failed: wrong password");
            return Err(AccountError::AuthenticationFailed);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, name, is_active, is_staff, is_superuser,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(user.id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Applies a profile update
    ///
    /// # Errors
    ///
    /// - `MissingEmail` / `DuplicateEmail` for a bad new email
    /// - `NotFound` if the account vanished
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: ProfileUpdate,
    ) -> Result<Self, AccountError> {
        let email = data.email.as_deref().map(required_email).transpose()?;
        let password_hash = data.password.as_deref().map(hash_password).transpose()?;
        let name = data.name.as_deref().map(str::trim);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                name = COALESCE($3, name),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, name, is_active, is_staff, is_superuser,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(email.as_deref())
        .bind(name)
        .bind(password_hash)
        .fetch_optional(pool)
        .await
        .map_err(|e| map_email_conflict(e, email.as_deref().unwrap_or_default()))?
        .ok_or(AccountError::NotFound)?;

        Ok(user)
    }

    /// Overwrites the administrative flags that are set in `flags`
    pub async fn set_flags(
        pool: &PgPool,
        id: Uuid,
        flags: AccountFlags,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_active = COALESCE($2, is_active),
                is_staff = COALESCE($3, is_staff),
                is_superuser = COALESCE($4, is_superuser),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, name, is_active, is_staff, is_superuser,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(flags.is_active)
        .bind(flags.is_staff)
        .bind(flags.is_superuser)
        .fetch_optional(pool)
        .await?;

        if let Some(ref user) = user {
            info!(user_id = %user.id, ?flags, "Updated account flags");
        }

        Ok(user)
    }

    /// Lists every account, ordered by email
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, name, is_active, is_staff, is_superuser,
                   created_at, updated_at, last_login_at
            FROM users
            ORDER BY email
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
