//! Ordnance Server - HTTP REST API for Ordnance Survey address lookups
//!
//! Configuration comes from `.env`, an optional `ordnance.{toml,yaml,json}`
//! file and `ORDNANCE__*` environment variables.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
