//! Router configuration.

use crate::handlers::{health_check, live, readiness_check, todos};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::{Method, header},
    routing::{get, patch, post},
};
use todoflow_core::TodoStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `/health`, `/ready`: liveness and readiness (no caller required)
/// - `/api/todos...`: todo CRUD
/// - `/api/live/todos`: live list WebSocket
///
/// Every response carries `X-Correlation-ID`.
pub fn build_router<S: TodoStore + 'static>(state: AppState<S>) -> Router {
    let api_routes = Router::new()
        .route("/todos", get(todos::list_todos::<S>).post(todos::create_todo::<S>))
        .route(
            "/todos/:id",
            patch(todos::update_todo::<S>).delete(todos::remove_todo::<S>),
        )
        .route("/todos/:id/toggle", post(todos::toggle_todo::<S>))
        .route("/live/todos", get(live::live_todos::<S>));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::HeaderName::from_static("x-correlation-id")]);

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check::<S>))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
