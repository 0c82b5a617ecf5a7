//! crosswiki server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use crosswiki_core::{AppConfig, PageRenderer, WikiDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(db_path = %config.db_path.display(), "Starting crosswiki server on stdio transport");

    let db = WikiDb::open_with_config(&config).await?;
    let renderer = PageRenderer::from_config(&config);

    if config.seed_index {
        db.ensure_index_page(&renderer).await?;
    }

    let handler = handler::CrosswikiServer::new(db, renderer);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
