pub mod api;
pub mod config;
pub mod errors;
pub mod mcp;
pub mod router;

use std::sync::Arc;

use crate::config::Config;
use crate::errors::WhippyResult;
use crate::mcp::server::McpServer;
use crate::router::dispatcher::Dispatcher;
use crate::router::routes::Resource;

/// Starts the MCP server on stdio. Fails only when the configuration is unusable.
pub async fn run() -> WhippyResult<()> {
    // stdout carries the protocol stream, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let config = Arc::new(Config::from_env()?);
    log_banner(&config);

    let server = Arc::new(McpServer::new(Dispatcher::from_config(config)));
    mcp::stdio_transport::serve_stdio(server).await
}

fn log_banner(config: &Config) {
    tracing::info!(
        api_base = %config.base_url,
        api_key = "set",
        "starting Whippy AI MCP server"
    );
    let resources: Vec<&str> = Resource::ALL.iter().map(|r| r.as_str()).collect();
    tracing::info!(
        tool = mcp::tools::TOOL_NAME,
        resources = ?resources,
        "serving on stdio"
    );
}
