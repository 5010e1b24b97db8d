//! Ideaflow Server - HTTP adapter for the idea pipeline
//!
//! A thin axum layer over `ideaflow-core`, providing:
//! - `POST /process-idea` (and `/api/process-idea`) to run the pipeline
//! - `POST /api/decode-workflow` to decode a delivered workflow log
//! - `GET /api` and `GET /api/health` liveness probes
//!
//! This crate can be used standalone or embedded in other applications
//! (e.g., the `ideaflow` CLI).

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use ideaflow_core::state::{AppState, AppStateInner};
use ideaflow_core::workflow::{
    AgentCapability, EchoCapability, LlmAgentCaller, PipelineDefinition, PipelineExecutor,
    SpecialistLoader,
};

/// Configuration for the Ideaflow backend server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Pipeline YAML file; the built-in four-agent strategy when unset
    pub pipeline_file: Option<String>,
    /// Extra specialist definitions directory
    pub specialist_dir: Option<String>,
    /// Answer with `EchoCapability` instead of calling an LLM
    pub dry_run: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3210,
            pipeline_file: None,
            specialist_dir: None,
            dry_run: false,
        }
    }
}

/// Build the pipeline executor described by `config`.
pub fn build_executor(config: &ServerConfig) -> Result<PipelineExecutor, String> {
    let definition = match config.pipeline_file {
        Some(ref path) => PipelineDefinition::from_file(path).map_err(|e| e.to_string())?,
        None => PipelineDefinition::default_strategy(),
    };

    let mut specialists = SpecialistLoader::new();
    match config.specialist_dir {
        Some(ref dir) => {
            specialists.load_dir(dir).map_err(|e| e.to_string())?;
        }
        None => {
            specialists.load_default_dirs();
        }
    }
    specialists.add_builtins();

    let capability: Arc<dyn AgentCapability> = if config.dry_run {
        tracing::warn!("Dry run: agents answer with canned responses");
        Arc::new(EchoCapability)
    } else {
        Arc::new(LlmAgentCaller::from_env().map_err(|e| e.to_string())?)
    };

    PipelineExecutor::new(&definition, &specialists, capability).map_err(|e| e.to_string())
}

/// Create a shared `AppState` from the server configuration.
pub fn create_app_state(config: &ServerConfig) -> Result<AppState, String> {
    let executor = build_executor(config)?;
    tracing::info!(
        "Pipeline '{}' ready: {}",
        executor.name(),
        executor
            .agents()
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    );
    Ok(Arc::new(AppStateInner::new(executor)))
}

/// Build the complete router (API routes, health check, CORS, tracing).
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router())
        .route("/api/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Ideaflow backend server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr, String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ideaflow_core=info,ideaflow_server=info,tower_http=info".into()),
        )
        .try_init()
        .ok();

    tracing::info!(
        "Starting Ideaflow backend server on {}:{}",
        config.host,
        config.port
    );

    let state = create_app_state(&config)?;

    start_server_with_state(config, state).await
}

/// Start the HTTP server with a pre-built `AppState`.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = app_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("Ideaflow backend server listening on {}", local_addr);

    // Spawn the server in a background task
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "server": "ideaflow-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
