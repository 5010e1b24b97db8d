//! Core error types for the Ideaflow pipeline.
//!
//! `PipelineError` covers everything that prevents a run from producing a
//! `PipelineResult` (bad input, bad definitions, codec violations).
//! `ServerError` is the boundary error; when the `axum` feature is enabled it
//! implements `IntoResponse` so HTTP handlers can return it directly.

use crate::workflow::codec::EncodeError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Empty idea provided")]
    EmptyIdea,

    #[error("Invalid pipeline definition: {0}")]
    InvalidDefinition(String),

    #[error("Specialist error: {0}")]
    Specialist(String),

    #[error("Workflow log encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::EmptyIdea => ServerError::BadRequest(err.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// axum integration (opt-in via feature flag)
// ---------------------------------------------------------------------------

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match &self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        // Clients always get a `workflow` array, even when no agent ran.
        let body = serde_json::json!({ "workflow": [], "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_idea_maps_to_bad_request() {
        let err: ServerError = PipelineError::EmptyIdea.into();
        assert!(matches!(err, ServerError::BadRequest(ref msg) if msg == "Empty idea provided"));
    }

    #[test]
    fn test_definition_error_maps_to_internal() {
        let err: ServerError = PipelineError::InvalidDefinition("no agents".to_string()).into();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
