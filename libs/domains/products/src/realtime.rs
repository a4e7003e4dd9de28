//! Realtime push of catalogue changes to connected WebSocket clients

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Events pushed to subscribers after a successful mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum ProductEvent {
    /// Sent after a product is created
    UpdateProducts,
    /// Sent after a product is deleted
    DeleteProducts,
}

/// Frame written to each WebSocket client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub event: ProductEvent,
    pub payload: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("no subscribers connected")]
    NoListeners,

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Fan-out of product events to all connected clients
#[cfg_attr(test, mockall::automock)]
pub trait EventBroadcaster: Send + Sync {
    /// Push `payload` under `event`, returning how many subscribers were reached
    fn emit(&self, event: ProductEvent, payload: serde_json::Value) -> Result<usize, BroadcastError>;
}

/// Broadcaster backed by a `tokio::sync::broadcast` channel of encoded frames
#[derive(Debug, Clone)]
pub struct ChannelBroadcaster {
    sender: broadcast::Sender<String>,
}

pub const DEFAULT_CAPACITY: usize = 64;

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventBroadcaster for ChannelBroadcaster {
    fn emit(&self, event: ProductEvent, payload: serde_json::Value) -> Result<usize, BroadcastError> {
        let frame = serde_json::to_string(&EventMessage { event, payload })?;
        let reached = self
            .sender
            .send(frame)
            .map_err(|_| BroadcastError::NoListeners)?;

        debug!(event = %event, subscribers = reached, "Product event emitted");
        Ok(reached)
    }
}

/// Router exposing the WebSocket endpoint
pub fn router(broadcaster: Arc<ChannelBroadcaster>) -> Router {
    Router::new()
        .route("/", get(subscribe))
        .with_state(broadcaster)
}

async fn subscribe(
    ws: WebSocketUpgrade,
    State(broadcaster): State<Arc<ChannelBroadcaster>>,
) -> impl IntoResponse {
    let rx = broadcaster.subscribe();
    ws.on_upgrade(move |socket| forward_events(socket, rx))
}

async fn forward_events(mut socket: WebSocket, mut rx: broadcast::Receiver<String>) {
    debug!("Realtime client connected");

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Ok(frame) => {
                    if socket.send(Message::Text(frame.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Realtime client lagged, skipping events");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }

    debug!("Realtime client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use serde_json::json;
    use std::str::FromStr;
    use tower::ServiceExt;

    #[test]
    fn test_event_names() {
        assert_eq!(ProductEvent::UpdateProducts.to_string(), "updateProducts");
        assert_eq!(ProductEvent::DeleteProducts.to_string(), "deleteProducts");
        assert_eq!(
            ProductEvent::from_str("deleteProducts").unwrap(),
            ProductEvent::DeleteProducts
        );
    }

    #[test]
    fn test_emit_without_subscribers() {
        let broadcaster = ChannelBroadcaster::default();
        let result = broadcaster.emit(ProductEvent::UpdateProducts, json!([]));
        assert!(matches!(result, Err(BroadcastError::NoListeners)));
    }

    #[test]
    fn test_every_subscriber_receives_frame() {
        let broadcaster = ChannelBroadcaster::new(8);
        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        let reached = broadcaster
            .emit(ProductEvent::DeleteProducts, json!({"totalDocs": 0}))
            .unwrap();
        assert_eq!(reached, 2);

        for rx in [&mut rx1, &mut rx2] {
            let frame: serde_json::Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
            assert_eq!(frame["event"], "deleteProducts");
            assert_eq!(frame["payload"]["totalDocs"], 0);
        }
    }

    #[test]
    fn test_clone_shares_channel() {
        let broadcaster = ChannelBroadcaster::default();
        let clone = broadcaster.clone();
        let mut rx = broadcaster.subscribe();

        clone.emit(ProductEvent::UpdateProducts, json!(null)).unwrap();
        assert!(rx.try_recv().is_ok());
        assert_eq!(clone.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_plain_get_is_not_upgraded() {
        let app = router(Arc::new(ChannelBroadcaster::default()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }
}
