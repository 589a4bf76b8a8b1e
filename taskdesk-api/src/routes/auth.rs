/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
///
/// Both answer with the user's ID, normalized email, and a fresh bearer
/// token valid for 30 days.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get a token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::models::user::User;

/// Register and login request
///
/// Missing fields deserialize as empty strings so they fail validation with
/// a readable message instead of a JSON error.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    /// Email address
    #[serde(default)]
    pub email: String,

    /// Password
    #[serde(default)]
    pub password: String,
}

/// Register and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// User ID
    pub id: String,

    /// Normalized email
    pub email: String,

    /// Bearer token
    pub token: String,
}

impl AuthResponse {
    fn new(user: User, token: String) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            token,
        }
    }
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": "uuid",
///   "email": "user@example.com",
///   "token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Invalid email, short password, or email already registered
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let Json(req) = body?;

    let user = state.credentials.register(&req.email, &req.password).await?;
    let token = state.tokens.issue(user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(user, token))))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "secret1"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (same message for both)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(req) = body?;

    let user = state.credentials.authenticate(&req.email, &req.password).await?;
    let token = state.tokens.issue(user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse::new(user, token)))
}
