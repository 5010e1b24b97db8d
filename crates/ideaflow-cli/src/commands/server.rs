//! `ideaflow server` — Start the Ideaflow HTTP backend server.

pub async fn run(config: ideaflow_server::ServerConfig) -> Result<(), String> {
    println!("Starting Ideaflow server on {}:{}...", config.host, config.port);

    let addr = ideaflow_server::start_server(config).await?;
    println!("Ideaflow server listening on http://{}", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
