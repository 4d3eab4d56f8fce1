/// Error handling for the API server
///
/// All handlers return `ApiResult<T>`; every library error converts into
/// [`ApiError`], which renders as:
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "Request validation failed",
///   "details": [{ "field": "name", "message": "This field may not be blank." }]
/// }
/// ```
///
/// # Status mapping
///
/// - `400`: validation failures, malformed JSON, duplicate email, unknown related IDs
/// - `401`: missing or invalid token
/// - `403`: bad credentials at the token endpoint, missing staff/superuser flag
/// - `404`: rows outside the caller's owned set
/// - `500`: persistence failures (logged, details hidden)

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recipe_shared::{
    auth::{authorization::AuthzError, middleware::AuthError, password::PasswordError},
    models::{owned::OwnedError, recipe::RecipeError, user::AccountError},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Per-field validation errors (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Single-field validation error
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }

    /// The 404 used for rows outside the caller's owned set
    pub fn not_found() -> Self {
        ApiError::NotFound("Not found.".to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// JSON body extractor whose rejections render as [`ApiError`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Path extractor; a malformed ID cannot name an owned row, so it is a 404
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::not_found()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    ValidationErrorDetail::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found(),
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DatabaseError(e) => e.into(),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::MissingEmail => ApiError::invalid_field("email", "This field may not be blank."),
            AccountError::DuplicateEmail(_) => {
                ApiError::invalid_field("email", "user with this email already exists.")
            }
            AccountError::AuthenticationFailed => ApiError::Forbidden(err.to_string()),
            AccountError::NotFound => ApiError::not_found(),
            AccountError::Password(e) => e.into(),
            AccountError::Database(e) => e.into(),
        }
    }
}

impl From<OwnedError> for ApiError {
    fn from(err: OwnedError) -> Self {
        match err {
            OwnedError::Name(e) => ApiError::invalid_field("name", e.to_string()),
            OwnedError::Database(e) => e.into(),
        }
    }
}

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err.field() {
            Some(field) => ApiError::invalid_field(field, err.to_string()),
            None => match err {
                RecipeError::Database(e) => e.into(),
                other => ApiError::BadRequest(other.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_shared::models::owned::NameError;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::not_found();
        assert_eq!(err.to_string(), "Not found: Not found.");
    }

    #[test]
    fn test_validation_error_is_bad_request() {
        let err = ApiError::ValidationError(vec![
            ValidationErrorDetail::new("email", "Enter a valid email address."),
            ValidationErrorDetail::new("password", "Ensure this field has at least 8 characters."),
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_account_error_mapping() {
        assert_eq!(status_of(AccountError::MissingEmail), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(AccountError::DuplicateEmail("a@b.com".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AccountError::AuthenticationFailed), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AccountError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AccountError::Database(sqlx::Error::PoolTimedOut)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(status_of(AuthError::MissingCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AuthError::InvalidFormat("bad".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::DatabaseError(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(AuthzError::StaffRequired), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_entity_error_mapping() {
        match ApiError::from(OwnedError::Name(NameError::Blank)) {
            ApiError::ValidationError(details) => {
                assert_eq!(details, vec![ValidationErrorDetail::new("name", "This field may not be blank.")]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        match ApiError::from(RecipeError::UnknownTag(Uuid::nil())) {
            ApiError::ValidationError(details) => assert_eq!(details[0].field, "tags"),
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(status_of(sqlx::Error::RowNotFound), StatusCode::NOT_FOUND);
    }
}
