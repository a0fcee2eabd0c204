pub mod api;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prediction;

#[cfg(test)]
mod test_support;

use tracing_subscriber::EnvFilter;

use api::{start_api_server, ApiContext, ServerError};
use config::ServiceConfig;

/// Start the service and block until Ctrl-C.
pub async fn run() -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        addr = %config.addr,
        data_dir = %config.data_dir.display(),
        prediction = ?config.prediction,
        chat_enabled = config.groq_api_key.is_some(),
        "Configuration loaded"
    );

    let ctx = ApiContext::from_config(&config)?;
    let mut server = start_api_server(ctx, config.addr).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
    }
    server.shutdown();
    server.wait().await
}
