//! Realtime event client.
//!
//! Maintains exactly one websocket connection to the backend's realtime
//! namespace. Handlers are registered per event kind, and registering again
//! replaces the previous handler so a reconnect can never double-deliver.
//! Transport failures are logged, not propagated: the REST path remains the
//! authoritative source callers reconcile against.

use crate::protocol;
use board_core::config::{BoardConfig, EventNames};
use board_core::error::{BoardError, Result};
use board_core::event::{ClientEvent, EventKind, RoomEvent, ServerEvent};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Callback invoked for each decoded server event of a registered kind.
pub type EventHandler = Box<dyn Fn(ServerEvent) + Send + Sync>;

struct Connection {
    /// Logical channel this connection serves (full realtime URL).
    channel: String,
    connected: Arc<AtomicBool>,
    outbound: mpsc::UnboundedSender<WsMessage>,
    cancel: CancellationToken,
}

/// Client for the backend's realtime namespace.
pub struct RealtimeClient {
    url: String,
    event_names: EventNames,
    connection: Mutex<Option<Connection>>,
    handlers: Arc<RwLock<HashMap<EventKind, EventHandler>>>,
}

impl RealtimeClient {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            url: config.realtime_url(),
            event_names: config.event_names.clone(),
            connection: Mutex::new(None),
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Establishes the connection, attaching `token` as a bearer credential
    /// when present (absence means guest mode, not an error).
    ///
    /// Idempotent: if a live connection to the same logical channel exists it
    /// is reused; otherwise any previous connection is torn down first.
    pub async fn connect(&self, token: Option<&str>) -> Result<()> {
        let mut slot = self.connection.lock().await;
        if let Some(connection) = slot.as_ref()
            && connection.connected.load(Ordering::SeqCst)
            && connection.channel == self.url
        {
            return Ok(());
        }
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
        }

        let mut request = self
            .url
            .clone()
            .into_client_request()
            .map_err(|err| BoardError::realtime(err.to_string()))?;
        if let Some(token) = token {
            let value = format!("Bearer {token}")
                .parse()
                .map_err(|_| BoardError::realtime("invalid token header"))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        let (stream, _) = connect_async(request).await.map_err(|err| {
            warn!("realtime connection failed: {err}");
            BoardError::realtime(err.to_string())
        })?;
        info!("realtime connected: {}", self.url);

        let (mut sink, mut source) = stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<WsMessage>();
        let connected = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();

        // Writer: forward queued frames until cancelled or the sink dies.
        let writer_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = writer_cancel.cancelled() => break,
                    frame = outbound_rx.recv() => {
                        let Some(frame) = frame else { break };
                        if let Err(err) = sink.send(frame).await {
                            debug!("realtime send failed: {err}");
                            break;
                        }
                    }
                }
            }
        });

        // Reader: decode frames and dispatch to the registered handler.
        let reader_cancel = cancel.clone();
        let reader_connected = connected.clone();
        let handlers = self.handlers.clone();
        let event_names = self.event_names.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = reader_cancel.cancelled() => break,
                    frame = source.next() => {
                        match frame {
                            Some(Ok(WsMessage::Text(text))) => {
                                dispatch(&handlers, &event_names, text.as_str()).await;
                            }
                            Some(Ok(WsMessage::Close(_))) | None => {
                                info!("realtime disconnected");
                                break;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(err)) => {
                                warn!("realtime read error: {err}");
                                break;
                            }
                        }
                    }
                }
            }
            reader_connected.store(false, Ordering::SeqCst);
        });

        *slot = Some(Connection {
            channel: self.url.clone(),
            connected,
            outbound,
            cancel,
        });
        Ok(())
    }

    /// Terminates the connection. Safe to call when already disconnected.
    pub async fn disconnect(&self) {
        let mut slot = self.connection.lock().await;
        if let Some(connection) = slot.take() {
            connection.cancel.cancel();
            connection.connected.store(false, Ordering::SeqCst);
        }
    }

    /// True while the underlying connection is up.
    pub async fn is_connected(&self) -> bool {
        let slot = self.connection.lock().await;
        slot.as_ref()
            .is_some_and(|c| c.connected.load(Ordering::SeqCst))
    }

    /// Announces membership in a conversation room. No-op when not connected.
    pub async fn join_conversation(&self, conversation_id: &str) {
        self.emit(ClientEvent::JoinConversation(RoomEvent {
            conversation_id: conversation_id.to_string(),
            user_id: None,
        }))
        .await;
    }

    /// Leaves a conversation room. No-op when not connected.
    pub async fn leave_conversation(&self, conversation_id: &str) {
        self.emit(ClientEvent::LeaveConversation(RoomEvent {
            conversation_id: conversation_id.to_string(),
            user_id: None,
        }))
        .await;
    }

    async fn emit(&self, event: ClientEvent) {
        let slot = self.connection.lock().await;
        let Some(connection) = slot.as_ref() else {
            debug!("emit skipped, not connected");
            return;
        };
        if !connection.connected.load(Ordering::SeqCst) {
            debug!("emit skipped, not connected");
            return;
        }
        match protocol::encode(&self.event_names, &event) {
            Ok(frame) => {
                let _ = connection.outbound.send(WsMessage::Text(frame.into()));
            }
            Err(err) => warn!("failed to encode client event: {err}"),
        }
    }

    /// Registers the handler for an event kind, replacing any existing one.
    pub async fn on<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(ServerEvent) + Send + Sync + 'static,
    {
        self.handlers.write().await.insert(kind, Box::new(handler));
    }

    /// Removes the handler for an event kind.
    pub async fn off(&self, kind: EventKind) {
        self.handlers.write().await.remove(&kind);
    }

    /// Feeds one raw frame through decode-and-dispatch, exactly as the read
    /// loop does. Exposed for tests and for transports that deliver frames
    /// out of band.
    pub async fn ingest_frame(&self, raw: &str) {
        dispatch(&self.handlers, &self.event_names, raw).await;
    }
}

async fn dispatch(
    handlers: &Arc<RwLock<HashMap<EventKind, EventHandler>>>,
    names: &EventNames,
    raw: &str,
) {
    let event = match protocol::decode(names, raw) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!("ignoring unknown realtime event");
            return;
        }
        Err(err) => {
            warn!("dropping malformed realtime frame: {err}");
            return;
        }
    };
    let handlers = handlers.read().await;
    if let Some(handler) = handlers.get(&event.kind()) {
        handler(event);
    }
}
