//! Ideaflow Core — transport-agnostic domain logic for the idea pipeline.
//!
//! This crate contains the pipeline executor, the workflow log codec and
//! decoder, specialist definitions, and the agent capability seam. It has
//! **no HTTP framework dependency** by default, making it suitable for use in:
//!
//! - HTTP servers (via `ideaflow-server`)
//! - CLI tools (via `ideaflow-cli`)
//!
//! # Feature Flags
//!
//! - `axum` — Enables `IntoResponse` impl on `ServerError` for use in axum handlers.

pub mod error;
pub mod state;
pub mod workflow;

// Convenience re-exports
pub use error::{PipelineError, ServerError};
pub use state::{AppState, AppStateInner};
