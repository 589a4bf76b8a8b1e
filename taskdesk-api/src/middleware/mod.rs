/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Bearer token authentication on protected routes
/// - Development-only internal error detail

pub mod auth;
pub mod errors;
