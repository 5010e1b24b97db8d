//! `ideaflow run` / `ideaflow -p` — Run the pipeline on a single idea.

use tokio_util::sync::CancellationToken;

use ideaflow_core::workflow::{OnFailure, PipelineExecutor, PipelineStatus};
use ideaflow_server::ServerConfig;

/// Options shared by `-p` and `run`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PipelineOptions {
    /// Pipeline YAML file (defaults to the built-in strategy pipeline)
    #[arg(long, env = "IDEAFLOW_PIPELINE")]
    pub pipeline: Option<String>,

    /// Custom specialist definitions directory
    #[arg(long)]
    pub specialist_dir: Option<String>,

    /// Answer with canned responses instead of calling an LLM
    #[arg(long)]
    pub dry_run: bool,

    /// Keep going when an agent fails, overriding the pipeline's policy
    #[arg(long)]
    pub continue_on_failure: bool,

    /// Print the `{"workflow": [...]}` response body instead of the raw log
    #[arg(long)]
    pub json: bool,
}

/// Build the executor described by the options.
pub fn build_executor(options: &PipelineOptions) -> Result<PipelineExecutor, String> {
    let config = ServerConfig {
        pipeline_file: options.pipeline.clone(),
        specialist_dir: options.specialist_dir.clone(),
        dry_run: options.dry_run,
        ..ServerConfig::default()
    };
    let executor = ideaflow_server::build_executor(&config)?;

    Ok(if options.continue_on_failure {
        executor.with_failure_policy(OnFailure::Continue)
    } else {
        executor
    })
}

pub async fn run(idea: &str, options: &PipelineOptions) -> Result<(), String> {
    let executor = build_executor(options)?;

    tracing::info!(
        "Running '{}' ({} agents)",
        executor.name(),
        executor.agents().len()
    );

    // Ctrl+C stops the run before the next agent starts.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, stopping after the current agent...");
            interrupt.cancel();
        }
    });

    let outcome = executor.run_until_cancelled(idea, &cancel).await;
    watcher.abort();
    let result = outcome.map_err(|e| e.to_string())?;

    if options.json {
        super::print_json(&result.to_response_body());
    } else {
        println!("{}", result.log.to_text());
    }

    match result.status {
        PipelineStatus::Success => Ok(()),
        status => Err(format!(
            "Pipeline ended with status {:?}{}: {}",
            status,
            result
                .failed_at
                .as_deref()
                .map(|agent| format!(" at agent '{}'", agent))
                .unwrap_or_default(),
            result.error.as_deref().unwrap_or("no error reported")
        )),
    }
}
