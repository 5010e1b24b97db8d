//! Shared application state for the HTTP adapter.

use std::sync::Arc;

use crate::workflow::PipelineExecutor;

/// Shared state accessible by all API handlers.
///
/// Holds nothing that changes between runs; every request gets its own log.
pub struct AppStateInner {
    pub executor: PipelineExecutor,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn new(executor: PipelineExecutor) -> Self {
        Self { executor }
    }
}
