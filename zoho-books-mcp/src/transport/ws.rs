//! MCP over WebSocket at `/ws`.
//!
//! Each text frame carries one JSON-RPC message; every connection is an
//! independent MCP session with its own handshake.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt, future};
use rmcp::ServiceExt;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};

use super::shutdown_signal;
use crate::server::ZohoBooksMcp;

pub fn router(server: ZohoBooksMcp) -> Router {
    Router::new().route("/ws", get(upgrade)).with_state(server)
}

async fn upgrade(ws: WebSocketUpgrade, State(server): State<ZohoBooksMcp>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_session(socket, server))
}

async fn run_session(socket: WebSocket, server: ZohoBooksMcp) {
    let (sink, stream) = socket.split();

    let sink = Box::pin(sink.with(|message: ServerJsonRpcMessage| async move {
        serde_json::to_string(&message)
            .map(|text| Message::Text(text.into()))
            .map_err(axum::Error::new)
    }));

    let stream = Box::pin(
        stream
            .take_while(|frame| {
                future::ready(matches!(frame, Ok(message) if !matches!(message, Message::Close(_))))
            })
            .filter_map(|frame| async move {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ClientJsonRpcMessage>(text.as_str()) {
                            Ok(message) => Some(message),
                            Err(e) => {
                                tracing::warn!("Dropping malformed WebSocket frame: {e}");
                                None
                            }
                        }
                    }
                    _ => None,
                }
            }),
    );

    tracing::debug!("WebSocket session opened");
    match server.serve((sink, stream)).await {
        Ok(service) => match service.waiting().await {
            Ok(reason) => tracing::debug!("WebSocket session closed: {reason:?}"),
            Err(e) => tracing::warn!("WebSocket session task failed: {e}"),
        },
        Err(e) => tracing::warn!("WebSocket session failed to initialize: {e}"),
    }
}

pub async fn serve(addr: SocketAddr, server: ZohoBooksMcp) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        "MCP WebSocket endpoint at ws://{}/ws",
        listener.local_addr()?
    );

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("WebSocket server error")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::{Value, json};
    use tokio_tungstenite::tungstenite::Message as Frame;

    use super::*;
    use crate::server::test_mocks::build_server;

    type Socket =
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

    async fn connect() -> Socket {
        let t = build_server().await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(t.server)).await });

        let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .unwrap();
        socket
    }

    async fn send(socket: &mut Socket, message: &Value) {
        socket
            .send(Frame::Text(message.to_string().into()))
            .await
            .unwrap();
    }

    async fn receive(socket: &mut Socket) -> Value {
        loop {
            match socket.next().await {
                Some(Ok(Frame::Text(text))) => return serde_json::from_str(text.as_str()).unwrap(),
                Some(Ok(Frame::Ping(_) | Frame::Pong(_))) => {}
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    async fn initialize(socket: &mut Socket) -> Value {
        send(
            socket,
            &json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "initialize",
                "params": {
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": {"name": "ws-test", "version": "0.0.1"}
                }
            }),
        )
        .await;
        let response = receive(socket).await;
        send(
            socket,
            &json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        )
        .await;
        response
    }

    #[tokio::test]
    async fn session_handshake_and_tool_listing() {
        let mut socket = connect().await;

        let init = initialize(&mut socket).await;
        assert_eq!(init["id"], 1);
        assert!(init["result"]["serverInfo"]["name"].is_string());
        assert!(init["result"]["capabilities"]["tools"].is_object());

        send(
            &mut socket,
            &json!({"jsonrpc": "2.0", "id": "tools-1", "method": "tools/list", "params": {}}),
        )
        .await;
        let listed = receive(&mut socket).await;
        assert_eq!(listed["id"], "tools-1");
        assert_eq!(listed["result"]["tools"].as_array().unwrap().len(), 31);
    }

    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let mut socket = connect().await;
        initialize(&mut socket).await;

        socket
            .send(Frame::Text("{not json".to_string().into()))
            .await
            .unwrap();
        send(
            &mut socket,
            &json!({"jsonrpc": "2.0", "id": 7, "method": "prompts/list", "params": {}}),
        )
        .await;

        let listed = receive(&mut socket).await;
        assert_eq!(listed["id"], 7);
        assert_eq!(listed["result"]["prompts"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn connections_are_independent_sessions() {
        let mut first = connect().await;
        let mut second = connect().await;

        assert_eq!(initialize(&mut first).await["id"], 1);
        assert_eq!(initialize(&mut second).await["id"], 1);
    }
}
