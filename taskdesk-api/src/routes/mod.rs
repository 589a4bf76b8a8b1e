/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Liveness text and health check
/// - `auth`: Authentication endpoints (register, login)
/// - `tasks`: Owner-scoped task CRUD (authenticated)

pub mod auth;
pub mod health;
pub mod tasks;

use crate::error::ApiError;
use axum::extract::OriginalUri;

/// Fallback for unmatched routes
///
/// Uses the original URI so paths under nested routers keep their prefix.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Not found - {}", uri.path()))
}
