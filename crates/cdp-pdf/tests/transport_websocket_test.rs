use cdp_pdf::server::transport::WebSocketTransport;
use cdp_pdf::server::transport::{TransportReceiver, TransportSender};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

mod common;

#[tokio::test]
async fn test_websocket_transport_communication() {
    common::init_tracing();

    // 1. Start a mock WebSocket server
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server_task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws_stream = accept_async(stream).await.unwrap();

        // Echo server: receive message, send it back
        while let Some(msg) = ws_stream.next().await {
            let msg = msg.unwrap();
            if msg.is_text() || msg.is_binary() {
                ws_stream.send(msg).await.unwrap();
            }
        }
    });

    // 2. Connect using WebSocketTransport
    let url = format!("ws://{}/devtools/page/ECHO", addr);
    let (transport, mut message_rx) = WebSocketTransport::connect(&url, None).await.unwrap();

    // 3. Split transport (simulating Connection usage)
    let (mut sender, mut receiver) = transport.into_parts();

    // 4. Spawn receiver loop
    let receiver_task = tokio::spawn(async move {
        receiver.run().await.unwrap();
    });

    // 5. Send a command
    let test_message = json!({
        "id": 1,
        "method": "Page.navigate",
        "params": {
            "url": "about:blank"
        },
        "sessionId": "S1"
    });

    sender.send(test_message.clone()).await.unwrap();

    // 6. Verify we receive it back (echo)
    let received = message_rx.recv().await.unwrap();
    assert_eq!(received, test_message);

    // Cleanup
    server_task.abort();
    receiver_task.abort();
}

#[tokio::test]
async fn test_handshake_carries_custom_headers() {
    common::init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server_task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut seen = None;
        let callback = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
            seen = request
                .headers()
                .get("x-devtools-token")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok(response)
        };
        let _ws = accept_hdr_async(stream, callback).await.unwrap();
        seen
    });

    let url = format!("ws://{}/devtools/page/HDR", addr);
    let headers = HashMap::from([("x-devtools-token".to_string(), "secret".to_string())]);
    let (_transport, _rx) = WebSocketTransport::connect(&url, Some(headers))
        .await
        .expect("Failed to connect");

    let seen = server_task.await.unwrap();
    assert_eq!(seen.as_deref(), Some("secret"));
}

#[tokio::test]
async fn test_receiver_ends_when_remote_closes() {
    common::init_tracing();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws_stream = accept_async(stream).await.unwrap();
        ws_stream
            .send(tokio_tungstenite::tungstenite::Message::Text(
                r#"{"method":"Page.loadEventFired","params":{}}"#.into(),
            ))
            .await
            .unwrap();
        ws_stream.close(None).await.unwrap();
    });

    let url = format!("ws://{}/devtools/page/CLOSE", addr);
    let (transport, mut message_rx) = WebSocketTransport::connect(&url, None).await.unwrap();
    let (_sender, mut receiver) = transport.into_parts();

    let run = tokio::time::timeout(Duration::from_secs(5), receiver.run())
        .await
        .expect("receiver should stop once the remote closes");
    assert!(run.is_ok());

    let event = message_rx.recv().await.unwrap();
    assert_eq!(event["method"], "Page.loadEventFired");
}
