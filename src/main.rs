mod collector;
mod config;
mod error;
mod geo;
mod gyunggi;
mod openapi;
mod seoul;
mod station;
mod store;

#[cfg(test)]
mod test_utils;

use std::env;

use collector::Collector;
use config::CollectorConfig;
use error::{CollectorError, CollectorResult};
use openapi::client::OpenApiClient;
use store::sqlite::SqliteStationStore;

async fn collect() -> CollectorResult<()> {
    let config = CollectorConfig::from_env()?;

    log::info!("Opening station store at {}", config.database_path.display());
    let mut store = SqliteStationStore::open(&config.database_path)?;

    let client = OpenApiClient::new(config.request_timeout).map_err(CollectorError::Client)?;
    let collector = Collector::new(client, config);

    let summary = collector.run(&mut store).await?;
    log::info!(
        "Collection finished: {}",
        serde_json::to_string(&summary).unwrap_or_else(|_| format!("{:?}", summary))
    );

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> std::io::Result<()> {
    dotenvy::from_filename(".env").ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::try_init().ok();

    log::debug!("Debug logging enabled");

    if let Err(e) = collect().await {
        log::error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}
