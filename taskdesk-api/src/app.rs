/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_api::{app::AppState, config::Config};
/// use taskdesk_shared::auth::password::HashCost;
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskdesk_shared::store::postgres::{PgTaskStore, PgUserStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
///
/// let state = AppState::new(
///     Arc::new(PgUserStore::new(pool.clone())),
///     Arc::new(PgTaskStore::new(pool)),
///     config,
///     HashCost::default(),
/// );
/// let app = taskdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::require_auth, errors::ErrorDetailLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskdesk_shared::{
    auth::{jwt::TokenService, password::HashCost},
    credentials::CredentialService,
    store::{TaskStore, UserStore},
    task_access::TaskAccess,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and user lookup
    pub credentials: CredentialService,

    /// Owner-scoped task operations
    pub tasks: TaskAccess,

    /// Bearer token issuing and verification
    pub tokens: TokenService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state over the given stores
    ///
    /// `cost` sets the Argon2 parameters for new password hashes.
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        config: Config,
        cost: HashCost,
    ) -> Self {
        Self {
            credentials: CredentialService::new(users, cost),
            tasks: TaskAccess::new(tasks),
            tokens: TokenService::new(&config.jwt.secret),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── GET /                     # Liveness text (public)
/// ├── GET /health               # Health check (public)
/// └── /api/
///     ├── /auth/                # Authentication endpoints (public)
///     │   ├── POST /register
///     │   └── POST /login
///     └── /tasks/               # Task CRUD (authenticated)
///         ├── GET    /
///         ├── POST   /
///         ├── GET    /:id
///         ├── PUT    /:id
///         └── DELETE /:id
/// ```
///
/// Anything else answers 404 `{"message": "Not found - <path>"}`.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Internal error detail (development only)
/// 4. Authentication (task routes only)
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new()
        .route("/", get(routes::health::index))
        .route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Task routes (require JWT authentication). route_layer keeps unknown
    // paths answering 404 rather than 401.
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes);

    let cors = cors_layer(&state.config);
    let expose_error_detail = !state.config.is_production();

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(ErrorDetailLayer::new(expose_error_detail))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Configure CORS based on environment
fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
