use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use ideaflow_core::error::{PipelineError, ServerError};
use ideaflow_core::state::AppState;
use ideaflow_core::workflow::PipelineStatus;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api", get(backend_status))
        .route("/process-idea", post(process_idea))
        .route("/api/process-idea", post(process_idea))
}

#[derive(Debug, Deserialize)]
struct ProcessIdeaRequest {
    #[serde(default)]
    idea: Option<String>,
}

/// GET /api — Liveness message for the frontend.
async fn backend_status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "backend is running" }))
}

/// POST /process-idea — Run the idea through every agent in order.
///
/// The run is spawned so it survives independently of the connection task;
/// if the client goes away the drop guard cancels it before the next agent.
async fn process_idea(
    State(state): State<AppState>,
    body: Result<Json<ProcessIdeaRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(body) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let idea = body.idea.unwrap_or_default();
    if idea.trim().is_empty() {
        return Err(PipelineError::EmptyIdea.into());
    }

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let task_state = state.clone();
    let handle = tokio::spawn(async move {
        task_state
            .executor
            .run_until_cancelled(&idea, &cancel)
            .await
    });

    let joined = handle.await;
    guard.disarm();

    let result = joined
        .map_err(|e| ServerError::Internal(format!("Pipeline task failed: {}", e)))??;

    let status = match result.status {
        PipelineStatus::Success => StatusCode::OK,
        PipelineStatus::PartialFailure | PipelineStatus::Failure => StatusCode::BAD_GATEWAY,
        PipelineStatus::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    };

    if status != StatusCode::OK {
        tracing::warn!(
            "[process-idea] Run {} ended with {:?} (failed at {:?})",
            result.run_id,
            result.status,
            result.failed_at
        );
    }

    Ok((status, Json(result.to_response_body())).into_response())
}
