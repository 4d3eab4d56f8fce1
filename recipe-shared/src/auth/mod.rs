/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing and the unusable-credential marker
/// - [`token`]: opaque token generation, hashing and header parsing
/// - [`middleware`]: resolves a request's token to an [`middleware::AuthContext`]
/// - [`authorization`]: staff and superuser checks
///
/// # Example
///
/// ```no_run
/// use recipe_shared::auth::password::{hash_password, verify_password};
/// use recipe_shared::auth::token::generate_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (token, token_hash) = generate_token();
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod token;
pub mod middleware;
pub mod authorization;
