/// Authentication token model and database operations
///
/// A token is issued when an account logs in with email and password, and is
/// presented as `Authorization: Token <key>` afterwards.
///
/// # Security
///
/// - Only the SHA-256 hash and a short display prefix are stored
/// - The plaintext is returned once, from [`AuthToken::issue`]
/// - Tokens of inactive accounts do not authenticate
///
/// # Schema
///
/// ```sql
/// CREATE TABLE auth_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     key_prefix VARCHAR(16) NOT NULL,
///     key_hash VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_used_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;
use crate::auth::token::{display_prefix, generate_token, hash_token, verify_token};

/// Issued token record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthToken {
    pub id: Uuid,

    /// Account the token authenticates as
    pub user_id: Uuid,

    /// First characters of the plaintext, for display
    pub key_prefix: String,

    /// SHA-256 hash of the plaintext
    #[serde(skip_serializing)]
    pub key_hash: String,

    pub created_at: DateTime<Utc>,

    pub last_used_at: Option<DateTime<Utc>>,
}

/// Account resolved from a presented token
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenOwner {
    pub token_id: Uuid,

    pub key_hash: String,

    #[sqlx(flatten)]
    pub user: User,
}

impl AuthToken {
    /// Issues a new token for an account
    ///
    /// Returns the stored record and the plaintext token. The plaintext is
    /// not recoverable afterwards.
    ///
    /// ```no_run
    /// # use recipe_shared::models::auth_token::AuthToken;
    /// # use sqlx::PgPool;
    /// # use uuid::Uuid;
    /// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    /// let (record, token) = AuthToken::issue(&pool, user_id).await?;
    /// assert!(token.starts_with(&record.key_prefix));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn issue(pool: &PgPool, user_id: Uuid) -> Result<(Self, String), sqlx::Error> {
        let (plaintext, key_hash) = generate_token();
        let key_prefix = display_prefix(&plaintext);

        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (user_id, key_prefix, key_hash)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, key_prefix, key_hash, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(key_prefix)
        .bind(key_hash)
        .fetch_one(pool)
        .await?;

        Ok((token, plaintext))
    }

    /// Resolves a plaintext token to its active account
    ///
    /// Returns `None` for unknown or revoked tokens and for inactive
    /// accounts. Updates `last_used_at` on success.
    pub async fn authenticate(
        pool: &PgPool,
        plaintext: &str,
    ) -> Result<Option<TokenOwner>, sqlx::Error> {
        let owner = sqlx::query_as::<_, TokenOwner>(
            r#"
            UPDATE auth_tokens t
            SET last_used_at = NOW()
            FROM users u
            WHERE t.key_hash = $1
              AND u.id = t.user_id
              AND u.is_active = TRUE
            RETURNING t.id AS token_id, t.key_hash,
                      u.id, u.email, u.password_hash, u.name, u.is_active, u.is_staff,
                      u.is_superuser, u.created_at, u.updated_at, u.last_login_at
            "#,
        )
        .bind(hash_token(plaintext))
        .fetch_optional(pool)
        .await?;

        Ok(owner.filter(|owner| verify_token(plaintext, &owner.key_hash)))
    }

    /// Deletes a token of `user_id`
    ///
    /// Returns false when the token does not exist or belongs to another
    /// account.
    pub async fn revoke(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
