use tracing::info;
use waste_ingest::config::AppConfig;
use waste_ingest::{db, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting waste ingestion service...");

    // Init store
    let store = db::open_store(&config).await?;
    info!("Store ready ({})", config.store_backend.as_str());

    server::run_server(config, store).await
}
