use rmcp::transport::stdio;
use rmcp::ServiceExt;

use crate::server::ReforgeService;

/// Run the MCP server on stdio until the client disconnects. Stdout belongs
/// to the protocol; all logging goes to stderr.
pub async fn run() -> anyhow::Result<()> {
    tracing::info!("starting reforge MCP server");

    let service = ReforgeService::new();
    let server = service.serve(stdio()).await?;
    server.waiting().await?;

    tracing::info!("reforge MCP server stopped");
    Ok(())
}
