/// Authorization checks
///
/// Recipe data is private to its owner; the ownership filter lives in the
/// store queries (`models::owned`). The checks here cover the account
/// administration surface: staff may list accounts, superusers may change
/// account flags.
///
/// # Example
///
/// ```
/// use recipe_shared::auth::authorization::{require_staff, require_superuser};
/// use recipe_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// let auth = AuthContext {
///     user_id: Uuid::new_v4(),
///     email: "staff@example.com".to_string(),
///     is_staff: true,
///     is_superuser: false,
///     token_id: Uuid::new_v4(),
/// };
///
/// assert!(require_staff(&auth).is_ok());
/// assert!(require_superuser(&auth).is_err());
/// ```

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// Account is not staff
    #[error("Staff access required")]
    StaffRequired,

    /// Account is not a superuser
    #[error("Superuser access required")]
    SuperuserRequired,
}

/// Requires the staff flag
pub fn require_staff(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_staff && !auth.is_superuser {
        return Err(AuthzError::StaffRequired);
    }

    Ok(())
}

/// Requires the superuser flag
pub fn require_superuser(auth: &AuthContext) -> Result<(), AuthzError> {
    if !auth.is_superuser {
        return Err(AuthzError::SuperuserRequired);
    }

    Ok(())
}
