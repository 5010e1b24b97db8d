//! Ideaflow CLI — run the idea strategy pipeline from the command line.
//!
//! Reuses the same core domain logic (ideaflow-core) and server bootstrap
//! (ideaflow-server) that back the HTTP API.

mod commands;

use clap::{Parser, Subcommand};

use commands::run::PipelineOptions;

/// Ideaflow CLI — Design → Marketing → Sales → Support idea pipeline
#[derive(Parser)]
#[command(name = "ideaflow", version, about = "Ideaflow CLI — multi-agent idea strategy pipeline")]
pub struct Cli {
    /// Quick prompt mode: run the pipeline on an idea.
    /// Example: ideaflow -p "eco-friendly water bottle"
    #[arg(short = 'p', long = "prompt")]
    prompt: Option<String>,

    #[command(flatten)]
    options: PipelineOptions,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline on an idea and print the workflow log
    Run {
        /// The product idea
        idea: String,
        #[command(flatten)]
        options: PipelineOptions,
    },

    /// Start the Ideaflow HTTP backend server
    Server {
        /// Host to bind to
        #[arg(long, env = "IDEAFLOW_HOST", default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(long, env = "IDEAFLOW_PORT", default_value_t = 3210)]
        port: u16,
        /// Pipeline YAML file (defaults to the built-in strategy pipeline)
        #[arg(long)]
        pipeline: Option<String>,
        /// Custom specialist definitions directory
        #[arg(long)]
        specialist_dir: Option<String>,
        /// Answer with canned responses instead of calling an LLM
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate a pipeline YAML file without executing it
    Validate {
        /// Path to the pipeline YAML file
        file: String,
    },

    /// List available specialist definitions
    Specialists {
        /// Custom specialist definitions directory
        #[arg(long)]
        specialist_dir: Option<String>,
    },

    /// Decode a serialized workflow log and print the agent responses
    Decode {
        /// Log file (plain text, or a JSON `{workflow}` body / array); `-` for stdin
        #[arg(default_value = "-")]
        file: String,
        /// Print received steps too
        #[arg(long)]
        all: bool,
        /// Print the decoded steps as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Some(Commands::Server { .. }) => "ideaflow_core=info,ideaflow_server=info,tower_http=info",
        _ => "ideaflow_core=warn,ideaflow_cli=info",
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::load_dotenv();

    let result = if let Some(idea) = cli.prompt {
        // ── Quick prompt mode: ideaflow -p "idea" ───────────────────
        commands::run::run(&idea, &cli.options).await
    } else if let Some(command) = cli.command {
        match command {
            Commands::Run { idea, options } => commands::run::run(&idea, &options).await,

            Commands::Server {
                host,
                port,
                pipeline,
                specialist_dir,
                dry_run,
            } => {
                let config = ideaflow_server::ServerConfig {
                    host,
                    port,
                    pipeline_file: pipeline,
                    specialist_dir,
                    dry_run,
                };
                commands::server::run(config).await
            }

            Commands::Validate { file } => commands::workflow::validate(&file),

            Commands::Specialists { specialist_dir } => {
                commands::workflow::list_specialists(specialist_dir.as_deref())
            }

            Commands::Decode { file, all, json } => commands::decode::run(&file, all, json),
        }
    } else {
        // No prompt and no subcommand — show help
        use clap::CommandFactory;
        Cli::command().print_help().ok();
        println!();
        Ok(())
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
