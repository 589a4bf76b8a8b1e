/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; library errors convert through
/// `From`, so handlers can use `?` throughout.
///
/// Every error body has the shape `{"message": "..."}`. Internal errors never
/// put their detail in the message. The detail rides along as an
/// [`ErrorDetail`] response extension, and outside production the
/// `expose_error_detail` middleware copies it into a `stack` field.
///
/// # Example
///
/// ```
/// use taskdesk_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(title: String) -> ApiResult<Json<Value>> {
///     if title.trim().is_empty() {
///         return Err(ApiError::BadRequest("Task title is required".to_string()));
///     }
///     Ok(Json(json!({ "title": title })))
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskdesk_shared::{
    auth::{jwt::TokenError, middleware::AuthError, password::PasswordError},
    credentials::CredentialError,
    store::StoreError,
    task_access::TaskError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Message sent to clients for every 500
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), e.g. validation failures
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict, e.g. duplicate email. Reported as 400.
    Conflict(String),

    /// Internal server error (500); the string is internal detail
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,

    /// Internal detail, development only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Internal detail of a 500, attached to the response extensions
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, detail) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => (msg, None),
            ApiError::InternalError(detail) => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %detail, "Internal error");
                (INTERNAL_ERROR_MESSAGE.to_string(), Some(detail))
            }
        };

        let body = Json(ErrorResponse {
            message,
            stack: None,
        });

        let mut response = (status, body).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// Malformed or mistyped JSON bodies
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::Conflict(CredentialError::DuplicateEmail.to_string()),
            StoreError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Token failures all look alike to the client
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            _ => ApiError::Unauthorized(AuthError::TokenRejected.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(e) => e.into(),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(msg) => ApiError::BadRequest(msg),
            CredentialError::DuplicateEmail => ApiError::Conflict(err.to_string()),
            CredentialError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            CredentialError::UserNotFound => ApiError::NotFound(err.to_string()),
            CredentialError::Password(e) => e.into(),
            CredentialError::Store(e) => e.into(),
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(msg) => ApiError::BadRequest(msg),
            TaskError::NotFound => ApiError::NotFound(err.to_string()),
            TaskError::Store(e) => e.into(),
        }
    }
}
