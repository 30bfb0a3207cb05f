use sync_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv is optional, ignore a missing file)
    dotenv::dotenv().ok();

    // 2. Logging first: Config::from_env logs when it generates a key
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let json_logs = std::env::var("ENVIRONMENT").as_deref() == Ok("production");
    init_logger(&log_level, json_logs);

    // 3. Configuration
    let config = Config::from_env();
    tracing::info!(environment = %config.environment, "Order sync server starting...");

    // 4. State (database + migrations)
    let state = ServerState::initialize(&config).await?;

    // 5. HTTP server
    Server::with_state(config, state).run().await
}
