//! Telemed CGM Backend - Main Entry Point

use api::{config, init_logging, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = config::load()?;

    info!("=== Telemed CGM backend v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Starting glucose monitoring service...");

    run_server(config).await
}
