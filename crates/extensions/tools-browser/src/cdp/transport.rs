//! Shared WebSocket transport: command correlation and event routing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{CdpEvent, CdpMessage, CdpRequest};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type Reply = oneshot::Sender<Result<Value, CdpError>>;

/// One browser WebSocket shared by the client and every page session.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Mutex<HashMap<u64, Reply>>,
    routes: Mutex<HashMap<String, mpsc::UnboundedSender<CdpEvent>>>,
    command_timeout: Duration,
}

impl Transport {
    /// Split the stream and start the receive loop.
    pub(crate) fn start(
        stream: WsStream,
        command_timeout: Duration,
    ) -> (Arc<Self>, tokio::task::JoinHandle<()>) {
        let (sink, source) = stream.split();
        let transport = Arc::new(Self {
            ws_tx: tokio::sync::Mutex::new(sink),
            request_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            routes: Mutex::new(HashMap::new()),
            command_timeout,
        });
        let task = tokio::spawn(Self::receive_loop(Arc::downgrade(&transport), source));
        (transport, task)
    }

    async fn receive_loop(transport: std::sync::Weak<Self>, mut source: WsSource) {
        while let Some(msg) = source.next().await {
            let Some(this) = transport.upgrade() else {
                break;
            };
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpMessage>(&text) {
                        Ok(message) => this.dispatch(message),
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        if let Some(this) = transport.upgrade() {
            // Dropping the senders fails every waiter with SessionClosed.
            this.pending.lock().clear();
            this.routes.lock().clear();
        }
    }

    fn dispatch(&self, message: CdpMessage) {
        if let Some(id) = message.id {
            let Some(reply) = self.pending.lock().remove(&id) else {
                return;
            };
            let result = match message.error {
                Some(err) => Err(CdpError::Protocol {
                    code: err.code,
                    message: err.message,
                }),
                None => Ok(message.result.unwrap_or(Value::Null)),
            };
            let _ = reply.send(result);
        } else if let Some(method) = message.method {
            let session_id = message.session_id.unwrap_or_default();
            let routes = self.routes.lock();
            if let Some(tx) = routes.get(&session_id) {
                let _ = tx.send(CdpEvent {
                    method,
                    params: message.params.unwrap_or(Value::Null),
                });
            }
        }
    }

    /// Send a command and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };
        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(self.command_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::Closed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Route events for `session_id` to a fresh channel.
    pub(crate) fn subscribe(&self, session_id: &str) -> mpsc::UnboundedReceiver<CdpEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes.lock().insert(session_id.to_string(), tx);
        rx
    }

    pub(crate) fn unsubscribe(&self, session_id: &str) {
        self.routes.lock().remove(session_id);
    }
}
