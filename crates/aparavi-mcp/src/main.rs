//! Aparavi gateway MCP server.
//!
//! Exposes AQL query execution, query generation, and file tagging as MCP
//! tools over stdio. All logging goes to stderr; stdout carries the
//! protocol.
//!
//! ## Configuration
//!
//! Set `APARAVI_USERNAME` and `APARAVI_PASSWORD` (plus `APARAVI_HOST` /
//! `APARAVI_PORT` for non-local instances), directly or through a `.env`
//! file. See `aparavi_core::config` for the full variable list.

use std::sync::Arc;

use anyhow::Context;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tracing::info;

use aparavi_client::AparaviClient;
use aparavi_core::{init_logging, AparaviConfig};

mod tools;

use tools::AparaviService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging("aparavi_mcp=info,aparavi_client=info,aparavi_query=info");

    let config = AparaviConfig::from_env();
    config.validate().context("invalid configuration")?;

    info!(
        host = %config.host,
        port = config.port,
        "starting Aparavi gateway MCP server"
    );

    let client = Arc::new(AparaviClient::new(config).context("failed to create API client")?);
    let service = AparaviService::new(client);

    let server = service.serve(stdio()).await?;
    server.waiting().await?;

    info!("Aparavi gateway MCP server stopped");
    Ok(())
}
