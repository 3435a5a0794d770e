//! MCP over stdin/stdout. Logs must stay on stderr.

use anyhow::Context;
use rmcp::ServiceExt;

use crate::server::ZohoBooksMcp;

pub async fn serve(server: ZohoBooksMcp) -> anyhow::Result<()> {
    tracing::info!("Starting MCP server on stdio transport");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP server on stdio")?;

    let reason = service.waiting().await.context("MCP server error")?;
    tracing::info!("MCP session ended: {reason:?}");
    Ok(())
}
