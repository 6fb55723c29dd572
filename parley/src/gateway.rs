//! Websocket transport for [`Session`]s.
//!
//! Each upgraded socket gets its own session, an outbound forwarder task that
//! serializes [`ServerMessage`]s as text frames, and a reader loop feeding inbound
//! text frames to the session in arrival order. Dropping the socket closes the
//! session sink; a round already in flight still runs to completion.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use psession::{ServerMessage, Session, SessionSink};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::GatewayRuntime;

pub const QA_AGENT_PATH: &str = "/ws/qa-agent";

#[derive(Clone)]
pub struct GatewayState {
    runtime: GatewayRuntime,
}

impl GatewayState {
    pub fn new(runtime: GatewayRuntime) -> Self {
        Self { runtime }
    }

    pub fn runtime(&self) -> &GatewayRuntime {
        &self.runtime
    }
}

pub fn router(runtime: GatewayRuntime) -> Router {
    Router::new()
        .route(QA_AGENT_PATH, get(qa_agent_ws))
        .with_state(GatewayState::new(runtime))
}

/// Serves the gateway until ctrl-c.
pub async fn serve(listener: TcpListener, runtime: GatewayRuntime) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, path = QA_AGENT_PATH, "gateway listening");
    }

    axum::serve(listener, router(runtime))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

async fn qa_agent_ws(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: GatewayState) {
    let session_id = Uuid::new_v4().to_string();
    let (sink, outbound) = SessionSink::channel();
    let session = Session::new(
        session_id.clone(),
        &state.runtime.orchestrator,
        Arc::clone(&state.runtime.store),
        sink.clone(),
    );

    tracing::info!(session_id = %session_id, "websocket connected");

    let (sender, mut receiver) = socket.split();
    let (inbound, frames) = mpsc::unbounded_channel::<String>();

    let forwarder = tokio::spawn(forward_frames(sender, outbound, sink.clone()));
    let session_task = tokio::spawn(session.run(frames));

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if inbound.send(text).is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                tracing::debug!(session_id = %session_id, error = %error, "websocket read failed");
                break;
            }
        }
    }

    sink.close();
    drop(inbound);
    tracing::info!(session_id = %session_id, "websocket disconnected");

    if let Err(error) = session_task.await {
        tracing::warn!(session_id = %session_id, error = %error, "session task failed");
    }
    forwarder.abort();
}

async fn forward_frames(
    mut sender: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::UnboundedReceiver<ServerMessage>,
    sink: SessionSink,
) {
    while let Some(message) = outbound.recv().await {
        let text = match message.to_json() {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(frame = message.type_name(), error = %error, "dropping frame");
                continue;
            }
        };

        if sender.send(Message::Text(text)).await.is_err() {
            sink.close();
            break;
        }
    }
}
