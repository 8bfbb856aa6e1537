use super::{TransportReceiver, TransportSender};
use crate::{Error, Result};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport to a DevTools endpoint
pub struct WebSocketTransport {
    message_tx: mpsc::UnboundedSender<JsonValue>,
    sender: SplitSink<WsStream, WsMessage>,
    receiver: SplitStream<WsStream>,
}

pub struct WebSocketTransportReceiver {
    receiver: SplitStream<WsStream>,
    message_tx: mpsc::UnboundedSender<JsonValue>,
}

impl WebSocketTransport {
    /// Performs the WebSocket handshake with `url`.
    ///
    /// Returns the transport and the channel on which the receiver half will
    /// forward every incoming JSON message.
    pub async fn connect(
        url: &str,
        headers: Option<HashMap<String, String>>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<JsonValue>)> {
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        // Parse URL to ensure validity
        let _parsed_url =
            Url::parse(url).map_err(|e| Error::TransportError(format!("Invalid URL: {}", e)))?;

        // Create base request from URL string (adds Sec-WebSocket-Key, etc.)
        use tokio_tungstenite::tungstenite::client::IntoClientRequest;
        let mut request = url
            .into_client_request()
            .map_err(|e| Error::TransportError(format!("Failed to build request: {}", e)))?;

        if let Some(headers_map) = headers {
            use std::str::FromStr;
            use tokio_tungstenite::tungstenite::http::header::{HeaderName, HeaderValue};
            let headers = request.headers_mut();
            for (k, v) in headers_map {
                let name = HeaderName::from_str(&k)
                    .map_err(|e| Error::TransportError(format!("Invalid header name: {}", e)))?;
                let value = HeaderValue::from_str(&v)
                    .map_err(|e| Error::TransportError(format!("Invalid header value: {}", e)))?;
                headers.insert(name, value);
            }
        }

        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| Error::TransportError(format!("WebSocket connection failed: {}", e)))?;

        tracing::debug!("WebSocket handshake with {} complete", url);

        let (sender, receiver) = ws_stream.split();

        Ok((
            Self {
                message_tx,
                sender,
                receiver,
            },
            message_rx,
        ))
    }

    pub fn into_parts(self) -> (WebSocketTransportSender, WebSocketTransportReceiver) {
        let sender = WebSocketTransportSender {
            sender: self.sender,
        };

        let receiver = WebSocketTransportReceiver {
            receiver: self.receiver,
            message_tx: self.message_tx,
        };

        (sender, receiver)
    }
}

// Wrapper for the sender part
pub struct WebSocketTransportSender {
    sender: SplitSink<WsStream, WsMessage>,
}

impl TransportSender for WebSocketTransportSender {
    fn send(
        &mut self,
        message: JsonValue,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let json_str = serde_json::to_string(&message)
                .map_err(|e| Error::TransportError(format!("Failed to serialize JSON: {}", e)))?;

            self.sender
                .send(WsMessage::Text(json_str.into()))
                .await
                .map_err(|e| {
                    Error::TransportError(format!("Failed to send WebSocket message: {}", e))
                })
        })
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.sender
                .close()
                .await
                .map_err(|e| Error::TransportError(format!("Failed to close WebSocket: {}", e)))
        })
    }
}

impl TransportReceiver for WebSocketTransportReceiver {
    fn run(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            while let Some(msg_result) = self.receiver.next().await {
                let msg = msg_result.map_err(|e| {
                    Error::TransportError(format!("WebSocket read error: {}", e))
                })?;

                let message: JsonValue = match msg {
                    WsMessage::Text(text) => serde_json::from_str(&text).map_err(|e| {
                        Error::ProtocolError(format!("Failed to parse JSON: {}", e))
                    })?,
                    // DevTools speaks text frames; tolerate JSON in binary frames.
                    WsMessage::Binary(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                        Error::ProtocolError(format!("Failed to parse JSON: {}", e))
                    })?,
                    WsMessage::Close(frame) => {
                        tracing::debug!("WebSocket closed by remote: {:?}", frame);
                        break;
                    }
                    _ => continue,
                };

                if self.message_tx.send(message).is_err() {
                    break;
                }
            }
            Ok(())
        })
    }
}
