pub mod ideas;
pub mod workflow_log;

use axum::Router;

use ideaflow_core::state::AppState;

/// Build the complete API router with all sub-routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(ideas::router())
        .nest("/api/decode-workflow", workflow_log::router())
}
