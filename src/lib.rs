pub mod analysis_service;
pub mod api;
pub mod config;
pub mod core_state;
pub mod models;
pub mod pipeline;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Fatal startup failures.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("State initialization failed: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the service and block until ctrl-c.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::AppConfig::from_env()?;
    let core = Arc::new(core_state::CoreState::new(&config)?);
    let mut server = api::start_api_server(core, config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown();
    server.stopped().await;
    Ok(())
}
