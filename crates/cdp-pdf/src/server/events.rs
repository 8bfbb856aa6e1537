// Event listener registry
//
// Events arrive on the connection's reader task. Delivery is a channel send,
// so the reader never runs caller code and never blocks command traffic.
//
// Two listener shapes:
// - EventWaiter: one-shot. Retired as soon as it fires, or when dropped.
// - EventSubscription: persistent. Receives every matching event until dropped.
//
// Listeners are keyed by (sessionId, method). Page-level endpoints carry no
// sessionId; flattened target sessions do.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, oneshot};

enum Sink {
    Once(Option<oneshot::Sender<Value>>),
    Persistent(mpsc::UnboundedSender<Value>),
}

struct Listener {
    id: u64,
    session_id: Option<Arc<str>>,
    method: String,
    sink: Sink,
}

impl Listener {
    fn matches(&self, session_id: Option<&str>, method: &str) -> bool {
        self.method == method && self.session_id.as_deref() == session_id
    }
}

/// Registry of event listeners for one connection
#[derive(Default)]
pub struct EventListeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<Listener>>,
    closed: AtomicBool,
}

impl EventListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a one-shot listener for `method`.
    ///
    /// The listener is registered before this returns, so any event
    /// dispatched afterwards is captured even if nobody is awaiting yet.
    pub fn once(self: &Arc<Self>, session_id: Option<&str>, method: &str) -> EventWaiter {
        let (tx, rx) = oneshot::channel();
        let id = self.register(session_id, method, Sink::Once(Some(tx)));
        EventWaiter {
            id,
            method: method.to_string(),
            rx,
            registry: Arc::downgrade(self),
        }
    }

    /// Registers a persistent listener for `method`.
    pub fn subscribe(self: &Arc<Self>, session_id: Option<&str>, method: &str) -> EventSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.register(session_id, method, Sink::Persistent(tx));
        EventSubscription {
            id,
            method: method.to_string(),
            rx,
            registry: Arc::downgrade(self),
        }
    }

    fn register(&self, session_id: Option<&str>, method: &str, sink: Sink) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if self.closed.load(Ordering::SeqCst) {
            // Dropping the sink here hands the caller an already-closed receiver.
            tracing::debug!("Listener for '{}' registered after close", method);
            return id;
        }
        self.entries.lock().push(Listener {
            id,
            session_id: session_id.map(Arc::from),
            method: method.to_string(),
            sink,
        });
        id
    }

    /// Delivers an event to every matching listener.
    ///
    /// Returns the number of listeners that received it. One-shot listeners
    /// are retired; persistent listeners whose receiver is gone are pruned.
    pub fn dispatch(&self, session_id: Option<&str>, method: &str, params: &Value) -> usize {
        let mut delivered = 0;
        self.entries.lock().retain_mut(|listener| {
            if !listener.matches(session_id, method) {
                return true;
            }
            match &mut listener.sink {
                Sink::Once(tx) => {
                    if let Some(tx) = tx.take() {
                        if tx.send(params.clone()).is_ok() {
                            delivered += 1;
                        }
                    }
                    false
                }
                Sink::Persistent(tx) => {
                    if tx.send(params.clone()).is_ok() {
                        delivered += 1;
                        true
                    } else {
                        false
                    }
                }
            }
        });
        delivered
    }

    /// Releases every listener. Pending waiters observe a closed channel.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.entries.lock().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        self.entries.lock().retain(|listener| listener.id != id);
    }
}

/// Single-use signal for one protocol event
///
/// Created fresh for each wait. Dropping the waiter retires the listener.
pub struct EventWaiter {
    id: u64,
    method: String,
    rx: oneshot::Receiver<Value>,
    registry: Weak<EventListeners>,
}

impl EventWaiter {
    /// The event this waiter listens for
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Waits for the event and returns its params.
    ///
    /// Fails with `ChannelClosed` if the connection goes away first.
    pub async fn recv(&mut self) -> Result<Value> {
        (&mut self.rx).await.map_err(|_| Error::ChannelClosed)
    }
}

impl Drop for EventWaiter {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl std::fmt::Debug for EventWaiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventWaiter")
            .field("id", &self.id)
            .field("method", &self.method)
            .finish()
    }
}

/// Persistent listener for one protocol event
pub struct EventSubscription {
    id: u64,
    method: String,
    rx: mpsc::UnboundedReceiver<Value>,
    registry: Weak<EventListeners>,
}

impl EventSubscription {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Next event params, or `None` once the connection is closed.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    /// Next already-delivered event params, without waiting.
    pub fn try_recv(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
