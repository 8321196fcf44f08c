/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use kanbanfs_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = kanbanfs_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::identity::identity_layer, routes};
use axum::{
    routing::{get, patch, post},
    Router,
};
use kanbanfs_shared::ordering::OrderMaintainer;
use kanbanfs_shared::paths::PathResolver;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Path resolution and node mutations
    pub paths: PathResolver,

    /// Board and task ordering
    pub order: OrderMaintainer,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let paths = PathResolver::with_reserved(db.clone(), config.reserved());
        let order = OrderMaintainer::with_offset(db.clone(), config.ordering.reindex_offset);
        tracing::debug!(offset = order.offset(), "Reindex offset");

        Self {
            db,
            paths,
            order,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/                             # Requires x-user-id
///     ├── GET    /nodes?path=&children=
///     ├── POST   /nodes
///     ├── GET    /nodes/:id/path
///     ├── PATCH  /nodes/:id
///     ├── DELETE /nodes/:id
///     ├── GET    /nodes/:id/boards
///     ├── POST   /nodes/:id/boards
///     ├── PATCH  /boards/:id
///     ├── DELETE /boards/:id
///     ├── POST   /boards/:id/shift
///     ├── POST   /boards/:id/move
///     ├── GET    /boards/:id/tasks
///     ├── POST   /boards/:id/tasks
///     ├── PATCH  /tasks/:id
///     ├── DELETE /tasks/:id
///     ├── POST   /tasks/:id/shift
///     └── POST   /tasks/:id/move
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Identity (`/v1` only)
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no identity)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let v1_routes = Router::new()
        .route(
            "/nodes",
            get(routes::nodes::resolve_node).post(routes::nodes::create_node),
        )
        .route("/nodes/:id/path", get(routes::nodes::node_path))
        .route(
            "/nodes/:id",
            patch(routes::nodes::update_node).delete(routes::nodes::delete_node),
        )
        .route(
            "/nodes/:id/boards",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route(
            "/boards/:id",
            patch(routes::boards::update_board).delete(routes::boards::delete_board),
        )
        .route("/boards/:id/shift", post(routes::boards::shift_board))
        .route("/boards/:id/move", post(routes::boards::move_board))
        .route(
            "/boards/:id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            patch(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/shift", post(routes::tasks::shift_task))
        .route("/tasks/:id/move", post(routes::tasks::move_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            identity_layer,
        ));

    let cors = CorsLayer::permissive();

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
