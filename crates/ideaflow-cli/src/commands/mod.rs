//! CLI command implementations.
//!
//! Each submodule corresponds to a top-level CLI command and reuses
//! the ideaflow-core domain logic.

pub mod decode;
pub mod run;
pub mod server;
pub mod workflow;

/// Load `.env.local` and `.env` from the working directory.
///
/// Variables already set in the environment win, and `.env.local` is read
/// first so it takes priority over `.env`.
pub fn load_dotenv() {
    for filename in [".env.local", ".env"] {
        if let Ok(path) = dotenv::from_filename(filename) {
            tracing::debug!("Loaded environment from '{}'", path.display());
        }
    }
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    );
}
