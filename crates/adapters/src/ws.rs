//! WebSocket ingest endpoint
//!
//! Each text frame is one reading. The reply mirrors the ingest outcome on
//! the same connection; a frame that fails never closes the session.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use serde_json::json;
use tracing::{debug, instrument};

use contracts::{IngestResult, RawReading, ReadingStore};
use ingestion::IngestionPipeline;

use crate::state::AppState;

/// Handle GET /ws - upgrade and run the per-connection loop
pub async fn handle_upgrade<S>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<S>>,
) -> Response
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    ws.on_upgrade(move |socket| session(socket, state))
}

#[instrument(name = "ws_session", skip(socket, state))]
async fn session<S>(mut socket: WebSocket, state: AppState<S>)
where
    S: ReadingStore + Clone + Send + Sync + 'static,
{
    debug!("WebSocket session opened");

    while let Some(Ok(message)) = socket.recv().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by axum; binary frames are not part of
            // the protocol.
            _ => continue,
        };

        let reply = frame_reply(&state.pipeline, text.as_str()).await;
        if socket.send(Message::Text(reply.into())).await.is_err() {
            break;
        }
    }

    debug!("WebSocket session closed");
}

/// Ingest one text frame and shape the reply.
///
/// A frame that is not JSON gets a distinct message from one that decoded
/// but failed validation.
async fn frame_reply<S>(pipeline: &IngestionPipeline<S>, text: &str) -> String
where
    S: ReadingStore + Send + Sync,
{
    let raw: RawReading = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(_) => {
            return json!({ "status": "error", "message": "invalid JSON payload" }).to_string();
        }
    };

    let started = std::time::Instant::now();
    let result = pipeline.ingest(raw).await;
    observability::record_ingest("ws", &result);
    observability::record_ingest_latency_ms(started.elapsed().as_secs_f64() * 1000.0);

    match result {
        IngestResult::Accepted(reading) => json!({
            "status": "success",
            "id": reading.id,
            "timestamp": reading.timestamp,
        })
        .to_string(),
        IngestResult::Rejected { reason } => {
            json!({ "status": "error", "message": reason.to_string() }).to_string()
        }
        IngestResult::Failed { .. } => {
            json!({ "status": "error", "message": "storage failure" }).to_string()
        }
    }
}
