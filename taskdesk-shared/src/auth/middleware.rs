/// Request identity resolution
///
/// Turns the `Authorization: Bearer <token>` header of an inbound request
/// into an [`AuthContext`]. The token must verify, and its subject must still
/// exist in the user store; a token for a deleted account is rejected even
/// though its signature is fine.
///
/// Resolution reads only. Failing requests are rejected immediately and are
/// never retried.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap};
/// use taskdesk_shared::auth::middleware::{bearer_token, AuthContext};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
/// assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
///
/// async fn handler(axum::Extension(auth): axum::Extension<AuthContext>) -> String {
///     format!("Hello, {}", auth.email)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::Serialize;
use uuid::Uuid;

use super::jwt::TokenService;
use crate::store::{StoreError, UserStore};

/// Authenticated identity attached to request extensions
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Normalized email of the user
    pub email: String,
}

/// Error type for identity resolution
///
/// The messages are what the client sees. Token failures share one message
/// so a caller cannot tell which check failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token on the request
    #[error("Not authorized, no token")]
    MissingToken,

    /// Signature, expiry or format check failed
    #[error("Not authorized, token failed")]
    TokenRejected,

    /// Token is valid but the user no longer exists
    #[error("Not authorized, token failed")]
    UnknownSubject,

    /// User lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// Returns `None` for a missing header, another scheme, or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    (!token.is_empty()).then_some(token)
}

/// Resolves the identity behind a request's bearer token
///
/// # Errors
///
/// - `MissingToken` when no bearer token is present
/// - `TokenRejected` when the token does not verify
/// - `UnknownSubject` when the subject is not a current user
/// - `Store` when the user lookup itself fails
pub async fn resolve_identity(
    headers: &HeaderMap,
    tokens: &TokenService,
    users: &dyn UserStore,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;

    let user_id = tokens.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        AuthError::TokenRejected
    })?;

    let user = users.find_by_id(user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id = %user_id, "Token subject no longer exists");
        AuthError::UnknownSubject
    })?;

    Ok(AuthContext {
        user_id: user.id,
        email: user.email,
    })
}
