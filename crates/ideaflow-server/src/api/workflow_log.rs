use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use ideaflow_core::error::ServerError;
use ideaflow_core::state::AppState;
use ideaflow_core::workflow::codec::{decode_lines, DecodedStep};
use ideaflow_core::workflow::decoder::{match_role, responses_by_agent, AgentPanel};
use ideaflow_core::workflow::Direction;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(decode_workflow))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DecodeRequest {
    workflow: Vec<String>,
    #[serde(default)]
    include_received: bool,
}

#[derive(Debug, Serialize)]
struct DecodeResponse {
    steps: Vec<DecodedStep>,
    agents: Vec<RoutedPanel>,
}

/// A panel plus the pipeline agent it is displayed under, if any.
#[derive(Debug, Serialize)]
struct RoutedPanel {
    #[serde(flatten)]
    panel: AgentPanel,
    role: Option<String>,
}

/// POST /api/decode-workflow — Decode a delivered `workflow` array.
///
/// Only `response` steps are returned unless `includeReceived` is set;
/// `agents` always groups the responses per agent, routed onto this
/// server's pipeline roles.
async fn decode_workflow(
    State(state): State<AppState>,
    body: Result<Json<DecodeRequest>, JsonRejection>,
) -> Result<Json<DecodeResponse>, ServerError> {
    let Json(body) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let all = decode_lines(&body.workflow);
    let responses: Vec<DecodedStep> = all
        .iter()
        .filter(|s| s.step_type == Direction::Response)
        .cloned()
        .collect();
    let roles: Vec<&str> = state
        .executor
        .agents()
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    let agents = responses_by_agent(&responses)
        .into_iter()
        .map(|panel| RoutedPanel {
            role: match_role(&panel.agent_name, &roles).map(str::to_string),
            panel,
        })
        .collect();

    let steps = if body.include_received { all } else { responses };
    Ok(Json(DecodeResponse { steps, agents }))
}
