/// Authentication gate for protected routes
///
/// Resolves the bearer token on every request before the handler runs and
/// inserts the resulting [`AuthContext`] into request extensions. Handlers
/// read it with `Extension<AuthContext>`; they never see a request that
/// failed resolution.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskdesk_shared::auth::middleware::{resolve_identity, AuthContext};

/// JWT authentication middleware layer
///
/// Install with `axum::middleware::from_fn_with_state(state, require_auth)`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: AuthContext =
        resolve_identity(req.headers(), &state.tokens, state.credentials.users().as_ref()).await?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
