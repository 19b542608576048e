//! `storewise serve`: start the web chat and HTTP API.

use std::path::Path;
use tracing::warn;

use super::load_config;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🛒 Storewise");
    println!("   Web chat:  http://{}:{}/", config.gateway.host, config.gateway.port);
    let missing = config.missing_keys();
    if !missing.is_empty() {
        warn!(missing = ?missing, "Some tools are unavailable; run `storewise doctor`");
    }

    storewise_gateway::start(config).await?;

    Ok(())
}
