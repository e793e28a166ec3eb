use anyhow::Result;
use ledger::config::AppConfig;
use ledger::server::ServerBuilder;
use ledger::storage::Storage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("project_ledger=info,ledger=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::load()?;
    std::fs::create_dir_all(&config.interchange.transient_dir)?;

    let storage = Storage::open(&config.storage).await?;
    let result = ServerBuilder::from_config(&config, storage.clone())?
        .serve(&config.server.bind_addr)
        .await;

    storage.close().await;
    result
}
