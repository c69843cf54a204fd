#[tokio::main]
async fn main() {
    if let Err(e) = whippy_mcp_lib::run().await {
        tracing::error!(error = %e, "Whippy MCP server stopped");
        eprintln!("whippy-mcp: {e}");
        std::process::exit(1);
    }
}
