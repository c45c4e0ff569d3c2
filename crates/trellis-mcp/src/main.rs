//! Trellis MCP server binary.
//!
//! This binary runs the MCP server using stdio transport.

use tracing_subscriber::EnvFilter;
use trellis_mcp::TrellisMcpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Stdout carries the MCP protocol; logs must go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let server = TrellisMcpServer::new();
    server.run().await?;

    Ok(())
}
