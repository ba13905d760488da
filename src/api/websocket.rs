//! WebSocket push of live telemetry.
//!
//! Connection lifecycle:
//! 1. UI opens `GET /ws/telemetry`, the server subscribes to the feed
//! 2. The current snapshot, if any, is sent immediately
//! 3. Every feed update is pushed as a `TelemetrySnapshot` text frame
//! 4. Ping every 30s; the subscription is released when the socket closes

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};

use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Keep-alive ping interval.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(ctx): State<ApiContext>) -> impl IntoResponse {
    let core = ctx.core.clone();
    ws.on_upgrade(move |socket| handle_ws(socket, core))
}

async fn handle_ws(socket: WebSocket, core: Arc<CoreState>) {
    let session_id = uuid::Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();
    let mut subscription = core.subscribe_telemetry();
    tracing::info!(%session_id, "Telemetry socket opened");

    if push_snapshot(&core, &mut sink).await.is_err() {
        return;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // Consume initial immediate tick

    loop {
        tokio::select! {
            update = subscription.next() => {
                if update.is_none() || push_snapshot(&core, &mut sink).await.is_err() {
                    break;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {} // Client frames carry no commands
                }
            }
            _ = heartbeat.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    drop(subscription);
    let _ = sink.close().await;
    tracing::info!(%session_id, "Telemetry socket closed");
}

/// Send the tracker's current snapshot. Nothing is sent before the first reading.
async fn push_snapshot(
    core: &CoreState,
    sink: &mut SplitSink<WebSocket, Message>,
) -> Result<(), axum::Error> {
    let snapshot = match core.telemetry_snapshot() {
        Ok(Some(snapshot)) => snapshot,
        Ok(None) => return Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "Telemetry snapshot unavailable");
            return Ok(());
        }
    };
    match serde_json::to_string(&snapshot) {
        Ok(json) => sink.send(Message::Text(json)).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize telemetry snapshot");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite;

    use crate::api::router::api_router;
    use crate::models::SensorReading;
    use crate::pipeline::analysis::MockLlmClient;
    use crate::pipeline::telemetry::HEALTH_DATA_KEY;

    async fn setup_ws_server() -> (String, Arc<CoreState>, tokio::task::JoinHandle<()>) {
        let core = Arc::new(CoreState::with_client(
            Arc::new(MockLlmClient::new("{}")),
            Duration::from_secs(1),
        ));
        let app = api_router(core.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("ws://127.0.0.1:{}/ws/telemetry", addr.port()), core, handle)
    }

    async fn wait_for_subscribers(core: &CoreState, expected: usize) {
        for _ in 0..100 {
            if core.feed().subscriber_count(HEALTH_DATA_KEY) == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("subscriber count never reached {expected}");
    }

    async fn next_json(
        ws: &mut tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
    ) -> serde_json::Value {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream ended")
            .expect("WS error");
        serde_json::from_str(&msg.into_text().expect("not text")).unwrap()
    }

    #[tokio::test]
    async fn ws_pushes_snapshot_on_ingest() {
        let (url, core, server) = setup_ws_server().await;
        let (mut ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("WS connect failed");
        wait_for_subscribers(&core, 1).await;

        core.ingest(SensorReading::new(70.0, 98.0, 1.0, 1)).unwrap();
        let first = next_json(&mut ws).await;
        assert_eq!(first["current"]["timestamp"], 1);
        assert!(first["previous"].is_null());

        core.ingest(SensorReading::new(95.0, 98.0, 1.0, 2)).unwrap();
        let second = next_json(&mut ws).await;
        assert_eq!(second["current"]["timestamp"], 2);
        assert_eq!(second["metrics"][0]["trend"], "up");

        let _ = ws.close(None).await;
        server.abort();
    }

    #[tokio::test]
    async fn ws_sends_existing_snapshot_on_connect() {
        let (url, core, server) = setup_ws_server().await;
        core.ingest(SensorReading::new(70.0, 98.0, 1.0, 42)).unwrap();

        let (mut ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        let json = next_json(&mut ws).await;
        assert_eq!(json["current"]["timestamp"], 42);

        let _ = ws.close(None).await;
        server.abort();
    }

    #[tokio::test]
    async fn ws_close_releases_subscription() {
        let (url, core, server) = setup_ws_server().await;
        let (mut ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
        wait_for_subscribers(&core, 1).await;

        ws.send(tungstenite::Message::Close(None)).await.unwrap();
        wait_for_subscribers(&core, 0).await;

        server.abort();
    }
}
