//! Ordena MCP Server Binary
//!
//! ## Usage
//!
//! ```bash
//! # Webhook target comes from the environment
//! N8N_BASE_URL=https://n8n.example.com N8N_WEBHOOK_PATH=webhook/odoo ordena-mcp
//!
//! # Optional: config file and log tuning
//! ORDENA_CONFIG=ordena.toml ORDENA_LOG_LEVEL=debug ORDENA_LOG_FORMAT=json ordena-mcp
//! ```

use anyhow::Result;
use ordena_core::config::{AppConfig, LoadOptions, LogFormat};
use ordena_mcp::{OrdenaMcpServer, WebhookClient};
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;

fn init_logging(config: &AppConfig) {
    // stdout carries the MCP protocol stream; all diagnostics go to stderr.
    let level = config
        .logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing webhook variables fail here, before the transport comes up.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let webhook = WebhookClient::new(&config.webhook)?;
    info!(endpoint = webhook.endpoint(), "starting Ordena MCP server on stdio");

    let service = OrdenaMcpServer::new(webhook).serve(stdio()).await?;
    service.waiting().await?;

    info!("Ordena MCP server shutdown complete");
    Ok(())
}
