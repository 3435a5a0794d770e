//! Wire adapters. Each one serves the same [`ZohoBooksMcp`] handler.

pub mod http;
pub mod stdio;
pub mod ws;

use std::net::SocketAddr;

use crate::server::ZohoBooksMcp;

/// The transport a process serves; exactly one per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    /// Streamable HTTP at `/mcp`.
    Http { addr: SocketAddr, cors: bool },
    /// One MCP session per connection at `/ws`.
    WebSocket { addr: SocketAddr },
}

pub async fn run(transport: Transport, server: ZohoBooksMcp) -> anyhow::Result<()> {
    match transport {
        Transport::Stdio => stdio::serve(server).await,
        Transport::Http { addr, cors } => http::serve(addr, server, cors).await,
        Transport::WebSocket { addr } => ws::serve(addr, server).await,
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                ctrl_c.await;
            }
        }
    }
    #[cfg(not(unix))]
    ctrl_c.await;

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
