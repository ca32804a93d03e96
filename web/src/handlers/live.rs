//! Live todo list over WebSocket.
//!
//! ```text
//! Client          live handler             TodoService
//!   │                  │                        │
//!   ├─ Connect ───────>│                        │
//!   │                  ├─ watch(caller) ───────>│
//!   │<─ snapshot ──────┤<─ list(caller) ────────┤
//!   │                  │                        │
//!   │                  │<── change (owner) ─────┤
//!   │<─ snapshot ──────┤<─ list(caller) ────────┤
//! ```
//!
//! **Server → Client:**
//! ```json
//! { "type": "snapshot", "todos": [ ... ] }
//! { "type": "error", "message": "..." }
//! ```
//!
//! Anonymous connections receive one empty snapshot and are closed.

use crate::extractors::{CorrelationId, CurrentCaller};
use crate::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::Serialize;
use todoflow_core::{Caller, Todo, TodoService, TodoStore};
use tokio::sync::broadcast::error::RecvError;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Server-to-client live message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LiveMessage {
    /// The caller's full list, newest first
    Snapshot {
        /// Current todos
        todos: Vec<Todo>,
    },
    /// The list could not be read
    Error {
        /// Error description
        message: String,
    },
}

impl LiveMessage {
    fn to_ws(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(json) => Some(Message::Text(json)),
            Err(e) => {
                error!(error = %e, "Failed to serialize live message");
                None
            }
        }
    }
}

/// Upgrade to a live list connection for the caller.
///
/// The socket outlives the request span, so the connection gets its own
/// `live_todos` span carrying the upgrade request's correlation ID.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn live_todos<S: TodoStore + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<S>>,
    CorrelationId(correlation_id): CorrelationId,
    CurrentCaller(caller): CurrentCaller,
) -> Response {
    info!(authenticated = caller.is_authenticated(), "Live list connection requested");
    let span = info_span!(
        "live_todos",
        correlation_id = %correlation_id,
        user_id = caller.user_id().map(tracing::field::display),
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state.todos, caller).instrument(span))
}

async fn snapshot<S: TodoStore>(todos: &TodoService<S>, caller: &Caller) -> LiveMessage {
    match todos.list(caller).await {
        Ok(todos) => LiveMessage::Snapshot { todos },
        Err(e) => {
            error!(error = %e, "Failed to read live list");
            LiveMessage::Error {
                message: "Failed to load todos".to_string(),
            }
        }
    }
}

async fn handle_socket<S: TodoStore + 'static>(
    socket: WebSocket,
    todos: TodoService<S>,
    caller: Caller,
) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the first read so no change falls between the two.
    let Some(mut changes) = todos.watch(&caller).await else {
        if let Some(message) = (LiveMessage::Snapshot { todos: Vec::new() }).to_ws() {
            let _ = sender.send(message).await;
        }
        let _ = sender.close().await;
        debug!("Closed anonymous live connection");
        return;
    };

    let mut send_task = tokio::spawn(async move {
        let mut pending = Some(snapshot(&todos, &caller).await);

        while let Some(message) = pending.take() {
            let Some(frame) = message.to_ws() else { break };
            if sender.send(frame).await.is_err() {
                break;
            }

            match changes.recv().await {
                Ok(change) => {
                    debug!(todo_id = %change.todo_id(), "Pushing snapshot after change");
                    pending = Some(snapshot(&todos, &caller).await);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live subscriber lagged, resending snapshot");
                    pending = Some(snapshot(&todos, &caller).await);
                }
                Err(RecvError::Closed) => {}
            }
        }

        debug!("Live send task terminated");
    }
    .in_current_span());

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                info!("Client requested close");
                break;
            }
        }

        debug!("Live receive task terminated");
    }
    .in_current_span());

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!("Live list connection closed");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_with_type_tag() {
        let json = serde_json::to_string(&LiveMessage::Snapshot { todos: Vec::new() }).unwrap();
        assert_eq!(json, r#"{"type":"snapshot","todos":[]}"#);

        let json = serde_json::to_string(&LiveMessage::Error {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"error","message":"boom"}"#);
    }
}
