// DevTools transport layer
//
// Handles bidirectional communication with the browser's debugging endpoint.
// The transport is split in two halves so the connection can write commands
// while a background task drains incoming frames.
// - WebSocketTransport: the `ws://host:port/devtools/...` endpoint

use crate::Result;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::pin::Pin;

pub mod websocket;

pub use websocket::{WebSocketTransport, WebSocketTransportReceiver, WebSocketTransportSender};

/// Trait for the sending half of a transport
pub trait TransportSender: Send + Unpin {
    fn send(&mut self, message: JsonValue)
    -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Initiates a graceful close of the underlying stream
    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Trait for the receiving half of a transport
pub trait TransportReceiver: Send + Unpin {
    /// Run the receive loop, forwarding each parsed message until the stream ends
    fn run(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
