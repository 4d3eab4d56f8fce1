/// Password hashing module using Argon2id
///
/// Account credentials are stored as Argon2id PHC strings. Accounts created
/// without a password receive an *unusable* credential: a `!`-prefixed random
/// marker that no password can ever verify against.
///
/// # Parameters
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use recipe_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("longenough")?;
/// assert!(verify_password("longenough", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use rand::Rng;
use std::sync::OnceLock;

/// Prefix marking a stored credential that can never verify
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// Length of the random suffix of an unusable credential
const UNUSABLE_SUFFIX_LENGTH: usize = 40;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id
///
/// Returns a PHC string that embeds algorithm, parameters and salt:
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Produces a credential that no password verifies against
pub fn unusable_password() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let suffix: String = (0..UNUSABLE_SUFFIX_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, suffix)
}

/// Whether a stored credential can be used to log in
pub fn is_usable(hash: &str) -> bool {
    !hash.is_empty() && !hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

/// Hashes `password`, or returns an unusable credential when there is none
pub fn make_password(password: Option<&str>) -> Result<String, PasswordError> {
    match password {
        Some(password) => hash_password(password),
        None => Ok(unusable_password()),
    }
}

/// Verifies a password against a stored credential
///
/// Unusable credentials never verify. Comparison of real hashes is
/// constant-time inside `argon2`.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if a usable credential is not a valid
/// PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    if !is_usable(hash) {
        return Ok(false);
    }

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters are embedded in the hash
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Runs one Argon2 verification against a throwaway hash and discards the result
///
/// Login attempts that match no usable credential call this so they cost the
/// same as a wrong password for a real account.
pub fn verify_dummy_password(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let hash = DUMMY_HASH.get_or_init(|| hash_password(&unusable_password()).ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").expect("Hash 1 should succeed");
        let hash2 = hash_password("same_password").expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("correct_password").expect("Hash should succeed");

        assert!(verify_password("correct_password", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("correct_password").expect("Hash should succeed");

        assert!(!verify_password("wrong_password", &hash).expect("Verify should succeed"));
        assert!(!verify_password("", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_malformed_hash() {
        assert!(verify_password("password", "invalid_hash").is_err());
        assert!(verify_password("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_unusable_password_never_verifies() {
        let marker = unusable_password();

        assert!(marker.starts_with(UNUSABLE_PASSWORD_PREFIX));
        assert_eq!(marker.len(), 1 + UNUSABLE_SUFFIX_LENGTH);
        assert!(!is_usable(&marker));
        assert!(!verify_password("", &marker).expect("Verify should succeed"));
        assert!(!verify_password(&marker, &marker).expect("Verify should succeed"));
    }

    #[test]
    fn test_empty_credential_is_unusable() {
        assert!(!is_usable(""));
        assert!(!verify_password("", "").expect("Verify should succeed"));
    }

    #[test]
    fn test_make_password() {
        let hashed = make_password(Some("longenough")).expect("Hash should succeed");
        assert!(is_usable(&hashed));
        assert!(verify_password("longenough", &hashed).expect("Verify should succeed"));

        let unusable = make_password(None).expect("Marker should succeed");
        assert!(!is_usable(&unusable));
    }

    #[test]
    fn test_hash_verify_unicode_and_spaces() {
        for password in ["with spaces", "unicode-密码-パスワード", "new password"] {
            let hash = hash_password(password).expect("Hash should succeed");
            assert!(
                verify_password(password, &hash).expect("Verify should succeed"),
                "Password '{}' should verify",
                password
            );
        }
    }

    #[test]
    fn test_dummy_verification_accepts_any_input() {
        // Second call reuses the cached hash
        verify_dummy_password("whatever");
        verify_dummy_password("");

        let hash = hash_password(&unusable_password()).expect("Hash should succeed");
        assert!(is_usable(&hash));
        assert!(!verify_password("whatever", &hash).expect("Verify should succeed"));
    }
}
