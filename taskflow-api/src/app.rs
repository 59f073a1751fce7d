/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskflow_api::{app::{build_router, AppState}, config::Config};
/// use taskflow_shared::store::InMemoryStore;
///
/// let config = Config::from_vars(|_| None).unwrap();
/// let state = AppState::new(Arc::new(InMemoryStore::new()), config);
/// let app = build_router(state);
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskflow_shared::{
    auth::middleware::{authenticate, extract_token},
    services::{tasks::TaskService, users::UserService},
    store::Store,
};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{debug, info_span, Level, Span};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,

    pub tasks: TaskService,
    pub users: UserService,
}

impl AppState {
    /// Creates new application state over a store
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            tasks: TaskService::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public)
/// ├── /users/
/// │   ├── POST /register        # Create account, returns token (public)
/// │   └── POST /login           # Exchange credentials for token (public)
/// └── /tasks/                   # Authenticated
///     ├── POST /                # Create task
///     ├── GET  /                # List tasks assigned to requester
///     ├── GET  /:id             # Get task
///     └── POST /:id             # Advance task one status
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer) around everything, see [`request_span`]
/// 2. Token authentication on `/tasks`
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/login", post(routes::users::login));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task).post(routes::tasks::advance_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(health_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Span for one HTTP request
///
/// Records the path only. The query string can carry a session token.
fn request_span(req: &Request) -> Span {
    info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        version = ?req.version(),
    )
}

/// Token authentication middleware layer
///
/// Reads the token from the `Authorization` header or the `token` query
/// parameter, validates it, confirms the user exists and injects
/// `AuthContext` into request extensions. Every rejection yields the same
/// 401 body.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers(), req.uri());

    let auth_context = authenticate(state.store.as_ref(), state.jwt_secret(), token.as_deref())
        .await
        .map_err(|err| {
            debug!(error = %err, path = %req.uri().path(), "Rejected request");
            ApiError::from(err)
        })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
