/// Opaque authentication token utilities
///
/// Tokens are issued by the token endpoint and presented on every scoped
/// request. Only their SHA-256 hash is stored; the plaintext is shown once.
/// The `models::auth_token` module handles persistence.
///
/// # Token Format
///
/// `rcp_` followed by 40 base62 characters (44 chars total).
///
/// # Example
///
/// ```
/// use recipe_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let (token, hash) = generate_token();
/// assert!(token.starts_with("rcp_"));
/// assert_eq!(token.len(), 44);
/// assert!(validate_token_format(&token));
/// assert_eq!(hash, hash_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of a token (characters)
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Token prefix
pub const TOKEN_PREFIX: &str = "rcp_";

/// Total length of a token (prefix + random)
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Number of characters kept as a non-secret display prefix
pub const DISPLAY_PREFIX_LENGTH: usize = 12;

/// Authorization schemes accepted in front of a token
const AUTH_SCHEMES: [&str; 2] = ["Token ", "Bearer "];

/// Generates a new token
///
/// Returns `(plaintext_token, sha256_hash)`. Key space is 62^40.
pub fn generate_token() -> (String, String) {
    let random_part = generate_random_string(TOKEN_RANDOM_LENGTH);
    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_token(&token);

    (token, hash)
}

fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hex-encoded SHA-256 hash of a token (64 characters)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Non-secret prefix stored next to the hash to identify a token
pub fn display_prefix(token: &str) -> String {
    token.chars().take(DISPLAY_PREFIX_LENGTH).collect()
}

/// Checks prefix, length and alphabet of a presented token
///
/// ```
/// use recipe_shared::auth::token::validate_token_format;
///
/// assert!(validate_token_format("rcp_abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMN"));
/// assert!(!validate_token_format("rcp_short"));
/// assert!(!validate_token_format("axon_abcdefghijklmnopqrstuvwxyzABCDEFGHIJKL"));
/// ```
pub fn validate_token_format(token: &str) -> bool {
    if token.len() != TOKEN_LENGTH {
        return false;
    }

    match token.strip_prefix(TOKEN_PREFIX) {
        Some(random_part) => random_part.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Extracts the token from an `Authorization` header value
///
/// Accepts `Token <key>` and `Bearer <key>`. Returns `None` for any other
/// scheme or an empty key.
///
/// ```
/// use recipe_shared::auth::token::parse_authorization;
///
/// assert_eq!(parse_authorization("Token abc"), Some("abc"));
/// assert_eq!(parse_authorization("Bearer abc"), Some("abc"));
/// assert_eq!(parse_authorization("Basic abc"), None);
/// ```
pub fn parse_authorization(header_value: &str) -> Option<&str> {
    AUTH_SCHEMES
        .iter()
        .find_map(|scheme| header_value.strip_prefix(scheme))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verifies a token against a stored hash in constant time
pub fn verify_token(token: &str, stored_hash: &str) -> bool {
    let computed_hash = hash_token(token);
    constant_time_compare(&computed_hash, stored_hash)
}

/// Constant-time string comparison
///
/// Compares every byte of equal-length inputs without short-circuiting.
///
/// ```
/// use recipe_shared::auth::token::constant_time_compare;
///
/// assert!(constant_time_compare("hello", "hello"));
/// assert!(!constant_time_compare("hello", "world"));
/// ```
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
