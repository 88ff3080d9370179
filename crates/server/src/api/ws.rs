//! WebSocket stream of catalog and search changes.
//!
//! A client first receives a `status` message with the full engine status,
//! then one `catalog` message per [`CatalogEvent`]. If the client falls far
//! enough behind that events were dropped, it gets a fresh `status` instead
//! of the missing events.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use gamehub_core::{CatalogEvent, EngineStatus};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// Interval between heartbeats.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Message pushed to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Full engine status; sent on connect and after a lag.
    Status { status: EngineStatus },
    /// Something changed in the catalog or the active search.
    Catalog { event: CatalogEvent },
    /// Keep-alive.
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    /// Label for the sent-messages metric.
    pub fn message_type(&self) -> &'static str {
        match self {
            WsMessage::Status { .. } => "status",
            WsMessage::Catalog { event } => event.event_type(),
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// GET /api/v1/ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sink, mut stream) = socket.split();

    // Subscribe before reading the status so no event slips between the two.
    let events = state.engine().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("WebSocket client connected");

    let forward = tokio::spawn(forward_events(sink, events, state));

    // Clients only ever close or ping; anything else is logged and ignored.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => debug!("Ignoring client message: {}", text),
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    forward.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

/// Push the initial status, then events and heartbeats until the client goes
/// away or the engine is dropped.
async fn forward_events(
    mut sink: SplitSink<WebSocket, Message>,
    mut events: broadcast::Receiver<CatalogEvent>,
    state: Arc<AppState>,
) {
    let status = state.engine().status().await;
    if send(&mut sink, WsMessage::Status { status }).await.is_err() {
        return;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        let msg = tokio::select! {
            result = events.recv() => match result {
                Ok(event) => WsMessage::Catalog { event },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("WebSocket client lagged, skipped {} events; resyncing", skipped);
                    WS_LAG_EVENTS.inc();
                    WsMessage::Status {
                        status: state.engine().status().await,
                    }
                }
                Err(RecvError::Closed) => {
                    debug!("Catalog event channel closed");
                    return;
                }
            },
            _ = heartbeat.tick() => WsMessage::Heartbeat {
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        if send(&mut sink, msg).await.is_err() {
            debug!("WebSocket send failed, client disconnected");
            return;
        }
    }
}

/// Serialize and send one message. Only a closed socket is an error;
/// a message that fails to serialize is logged and skipped.
async fn send(sink: &mut SplitSink<WebSocket, Message>, msg: WsMessage) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(&msg) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize {} message: {}", msg.message_type(), e);
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await?;
    WS_MESSAGES_SENT
        .with_label_values(&[msg.message_type()])
        .inc();
    Ok(())
}
