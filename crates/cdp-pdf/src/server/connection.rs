//! JSON-RPC connection layer for the DevTools protocol

use crate::error::{Error, Result};
use crate::server::events::EventListeners;
use crate::server::transport::{TransportReceiver, TransportSender};
use parking_lot::Mutex as ParkingLotMutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex as TokioMutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;

use std::future::Future;
use std::pin::Pin;

/// Trait defining the interface that sessions and channels need from a Connection
pub trait ConnectionLike: Send + Sync {
    /// Send a command to the browser and await its correlated response
    fn send_message(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>>;

    /// Registry that incoming events are dispatched to
    fn listeners(&self) -> &Arc<EventListeners>;

    /// Gracefully close the transport, then release everything pending
    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Release everything pending without touching the transport
    fn shutdown(&self);

    fn is_closed(&self) -> bool;
}

/// Command sent to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "is_value_null", default)]
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

fn is_value_null(v: &Value) -> bool {
    v.is_null()
}

/// Response to a command, correlated by `id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Unsolicited notification from the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    Response(Response),
    Event(Event),
}

type Callbacks = HashMap<u64, oneshot::Sender<Result<Value>>>;

/// JSON-RPC connection to a DevTools endpoint
pub struct Connection {
    last_id: AtomicU64,
    callbacks: Arc<ParkingLotMutex<Callbacks>>,
    sender: Arc<TokioMutex<Box<dyn TransportSender>>>,
    message_rx: Arc<TokioMutex<Option<mpsc::UnboundedReceiver<Value>>>>,
    transport_receiver: Arc<TokioMutex<Option<Box<dyn TransportReceiver>>>>,
    transport_task: ParkingLotMutex<Option<AbortHandle>>,
    listeners: Arc<EventListeners>,
    closed: AtomicBool,
}

impl Connection {
    pub fn new(
        sender: impl TransportSender + 'static,
        receiver: impl TransportReceiver + 'static,
        message_rx: mpsc::UnboundedReceiver<Value>,
    ) -> Self {
        Self {
            last_id: AtomicU64::new(1),
            callbacks: Arc::new(ParkingLotMutex::new(HashMap::new())),
            sender: Arc::new(TokioMutex::new(Box::new(sender))),
            message_rx: Arc::new(TokioMutex::new(Some(message_rx))),
            transport_receiver: Arc::new(TokioMutex::new(Some(Box::new(receiver)))),
            transport_task: ParkingLotMutex::new(None),
            listeners: Arc::new(EventListeners::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub async fn send_message(
        &self,
        session_id: Option<String>,
        method: String,
        params: Value,
    ) -> Result<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::ChannelClosed);
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            "Sending message: id={}, session={:?}, method='{}'",
            id,
            session_id,
            method
        );

        let (tx, rx) = oneshot::channel();
        self.callbacks.lock().insert(id, tx);

        let request = Request {
            id,
            method,
            params,
            session_id,
        };

        let request_value = serde_json::to_value(&request)?;
        tracing::trace!("Request JSON: {}", request_value);

        if let Err(e) = self.sender.lock().await.send(request_value).await {
            tracing::error!("Failed to send message: {}", e);
            self.callbacks.lock().remove(&id);
            return Err(e);
        }

        tracing::debug!("Waiting for response to ID {}", id);
        rx.await
            .map_err(|_| Error::ChannelClosed)
            .and_then(|result| result)
    }

    /// Drives the connection until the transport closes.
    ///
    /// Spawns the transport receive loop, then dispatches every incoming
    /// message. When the stream ends all pending commands fail and all
    /// listeners are released.
    pub async fn run(self: &Arc<Self>) {
        let Some(mut transport_receiver) = self.transport_receiver.lock().await.take() else {
            tracing::warn!("Connection::run called more than once; ignoring");
            return;
        };

        let transport_handle = tokio::spawn(async move {
            if let Err(e) = transport_receiver.run().await {
                tracing::error!("Transport error: {}", e);
            }
        });
        *self.transport_task.lock() = Some(transport_handle.abort_handle());

        let Some(mut message_rx) = self.message_rx.lock().await.take() else {
            tracing::warn!("Connection message receiver already taken");
            transport_handle.abort();
            return;
        };

        while let Some(message_value) = message_rx.recv().await {
            match serde_json::from_value::<Message>(message_value) {
                Ok(message) => {
                    if let Err(e) = self.dispatch_internal(message) {
                        tracing::error!("Error dispatching message: {}", e);
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to parse message: {}", e);
                }
            }
        }

        tracing::debug!("Message loop ended (transport closed)");
        let _ = transport_handle.await;
        self.shutdown_internal();
    }

    #[cfg(test)]
    pub fn dispatch(&self, message: Message) -> Result<()> {
        self.dispatch_internal(message)
    }

    fn dispatch_internal(&self, message: Message) -> Result<()> {
        match message {
            Message::Response(response) => {
                tracing::debug!("Processing response for ID: {}", response.id);
                let callback = self.callbacks.lock().remove(&response.id).ok_or_else(|| {
                    Error::ProtocolError(format!(
                        "Cannot find request to respond: id={}",
                        response.id
                    ))
                })?;

                let result = match response.error {
                    Some(error) => Err(parse_protocol_error(error)),
                    None => Ok(response.result.unwrap_or(Value::Null)),
                };

                // The caller may have stopped waiting (timeout); that is not an error here.
                let _ = callback.send(result);
                Ok(())
            }
            Message::Event(event) => {
                let delivered = self.listeners.dispatch(
                    event.session_id.as_deref(),
                    &event.method,
                    &event.params,
                );
                tracing::trace!(
                    "Event '{}' (session={:?}) delivered to {} listener(s)",
                    event.method,
                    event.session_id,
                    delivered
                );
                Ok(())
            }
        }
    }

    fn shutdown_internal(&self) {
        let was_closed = self.closed.swap(true, Ordering::SeqCst);

        if let Some(task) = self.transport_task.lock().take() {
            task.abort();
        }

        let pending: Vec<_> = self.callbacks.lock().drain().collect();
        if !pending.is_empty() {
            tracing::debug!("Failing {} pending request(s) on shutdown", pending.len());
        }
        for (_, callback) in pending {
            let _ = callback.send(Err(Error::TransportError(
                "connection closed before a response arrived".to_string(),
            )));
        }

        self.listeners.close();

        if !was_closed {
            tracing::debug!("Connection shut down");
        }
    }
}

impl ConnectionLike for Connection {
    fn send_message(
        &self,
        session_id: Option<&str>,
        method: &str,
        params: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + '_>> {
        let session_id = session_id.map(str::to_string);
        let method = method.to_string();
        Box::pin(self.send_message(session_id, method, params))
    }

    fn listeners(&self) -> &Arc<EventListeners> {
        &self.listeners
    }

    fn close(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if !self.closed.load(Ordering::SeqCst) {
                if let Err(e) = self.sender.lock().await.close().await {
                    tracing::debug!("Ignoring error while closing transport: {}", e);
                }
            }
            self.shutdown_internal();
        })
    }

    fn shutdown(&self) {
        self.shutdown_internal();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn parse_protocol_error(payload: ErrorPayload) -> Error {
    match payload.data {
        Some(Value::String(data)) if !data.is_empty() => Error::ProtocolError(format!(
            "{} (code {}): {}",
            payload.message, payload.code, data
        )),
        _ => Error::ProtocolError(format!("{} (code {})", payload.message, payload.code)),
    }
}
