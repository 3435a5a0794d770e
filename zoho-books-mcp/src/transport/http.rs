//! MCP Streamable HTTP (POST + server-sent events) on an axum router.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{Json, Router, routing::get};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use super::shutdown_signal;
use crate::server::ZohoBooksMcp;

/// `/mcp` for the protocol, `/health` for liveness probes.
pub fn router(server: ZohoBooksMcp, cors: bool) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    let router = Router::new()
        .nest_service("/mcp", mcp)
        .route("/health", get(health));

    if cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "server": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn serve(addr: SocketAddr, server: ZohoBooksMcp, cors: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        "MCP Streamable HTTP endpoint at http://{}/mcp (CORS {})",
        listener.local_addr()?,
        if cors { "enabled" } else { "disabled" }
    );

    axum::serve(listener, router(server, cors))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::server::test_mocks::build_server;

    /// Serve `router` on an ephemeral port and send one raw HTTP/1.1 request.
    async fn roundtrip(router: Router, request: &str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    const HEALTH: &str = "GET /health HTTP/1.1\r\nHost: localhost\r\n\
                          Origin: http://localhost:5173\r\nConnection: close\r\n\r\n";

    #[tokio::test]
    async fn health_reports_ok_with_cors() {
        let t = build_server().await;
        let response = roundtrip(router(t.server, true), HEALTH).await;

        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains(r#""status":"ok""#));
        assert!(
            response
                .to_ascii_lowercase()
                .contains("access-control-allow-origin: *")
        );
    }

    #[tokio::test]
    async fn cors_can_be_disabled() {
        let t = build_server().await;
        let response = roundtrip(router(t.server, false), HEALTH).await;

        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(
            !response
                .to_ascii_lowercase()
                .contains("access-control-allow-origin")
        );
    }
}
