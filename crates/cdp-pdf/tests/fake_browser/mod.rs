// Fake DevTools endpoint for integration tests
//
// Speaks just enough of the protocol over a real WebSocket to exercise the
// crate end to end without a browser. Load events are written to the socket
// before the response of the command that triggered them, which is the
// ordering a real browser can produce.

// Note: Functions appear "unused" because each test binary compiles separately,
// but they ARE used across multiple test files. Suppress false-positive warnings.
#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// One-page document, uncompressed
pub const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n\
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n\
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >> endobj\n\
trailer << /Root 1 0 R >>\n\
%%EOF\n";

pub const TARGET_ID: &str = "TARGET-1";
pub const SESSION_ID: &str = "SESSION-1";
pub const FRAME_ID: &str = "MAIN-FRAME";

/// Behavior switches for the fake endpoint
#[derive(Debug, Clone)]
pub struct FakeBrowserConfig {
    /// Emit DOMContentLoaded and load after navigation and content injection
    pub fire_load_events: bool,
    /// `errorText` reported for every navigation except `about:blank`
    pub navigate_error: Option<String>,
    /// Raw `result` of `Page.printToPDF`
    pub print_result: Value,
    /// Methods answered with a protocol error
    pub failing_methods: Vec<String>,
    /// Methods that are never answered
    pub silent_methods: Vec<String>,
    /// Drop the socket on receiving this method, without answering
    pub hang_up_before: Option<String>,
    /// Drop the socket right after answering this method
    pub hang_up_after: Option<String>,
}

impl Default for FakeBrowserConfig {
    fn default() -> Self {
        Self {
            fire_load_events: true,
            navigate_error: None,
            print_result: json!({ "data": BASE64.encode(MINIMAL_PDF) }),
            failing_methods: Vec::new(),
            silent_methods: Vec::new(),
            hang_up_before: None,
            hang_up_after: None,
        }
    }
}

/// Fake browser handle
pub struct FakeBrowser {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Value>>>,
    handle: JoinHandle<()>,
}

impl FakeBrowser {
    /// Start with default behavior on a random available port
    pub async fn start() -> Self {
        Self::start_with(FakeBrowserConfig::default()).await
    }

    pub async fn start_with(config: FakeBrowserConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake browser");
        let addr = listener.local_addr().expect("Failed to get local address");
        let received = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let received = Arc::clone(&received);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, config.clone(), Arc::clone(&received)));
                }
            })
        };

        Self {
            addr,
            received,
            handle,
        }
    }

    /// Page-level endpoint: commands are sent without a session id
    pub fn page_endpoint(&self) -> String {
        format!("ws://{}/devtools/page/{}", self.addr, TARGET_ID)
    }

    /// Browser-level endpoint: the client must create and attach a target
    pub fn browser_endpoint(&self) -> String {
        format!("ws://{}/devtools/browser/FAKE-BROWSER", self.addr)
    }

    /// Every request received so far, in arrival order
    pub fn requests(&self) -> Vec<Value> {
        self.received.lock().expect("request log poisoned").clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r["method"].as_str().map(str::to_string))
            .collect()
    }

    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r["method"] == method)
            .collect()
    }
}

impl Drop for FakeBrowser {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(stream: TcpStream, config: FakeBrowserConfig, received: Arc<Mutex<Vec<Value>>>) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };

    while let Some(Ok(frame)) = ws.next().await {
        let text = match frame {
            Message::Text(text) => text.as_str().to_string(),
            Message::Close(_) => break,
            _ => continue,
        };
        let request: Value = serde_json::from_str(&text).expect("client sent invalid JSON");
        received
            .lock()
            .expect("request log poisoned")
            .push(request.clone());

        let method = request["method"].as_str().unwrap_or_default().to_string();
        if config.hang_up_before.as_deref() == Some(method.as_str()) {
            return;
        }
        if config.silent_methods.contains(&method) {
            continue;
        }

        let session_id = request.get("sessionId").cloned();
        let (result, fire_events) = answer(&config, &method, &request["params"]);

        if fire_events && config.fire_load_events {
            for event in ["Page.domContentEventFired", "Page.loadEventFired"] {
                let mut message = json!({ "method": event, "params": { "timestamp": 1.0 } });
                if let Some(session_id) = &session_id {
                    message["sessionId"] = session_id.clone();
                }
                if send(&mut ws, &message).await.is_err() {
                    return;
                }
            }
        }

        let mut response = match result {
            Ok(result) => json!({ "id": request["id"], "result": result }),
            Err(message) => json!({
                "id": request["id"],
                "error": { "code": -32000, "message": message }
            }),
        };
        if let Some(session_id) = &session_id {
            response["sessionId"] = session_id.clone();
        }
        if send(&mut ws, &response).await.is_err() {
            return;
        }

        if config.hang_up_after.as_deref() == Some(method.as_str()) {
            return;
        }
    }
}

/// Result of `method`, and whether load events follow it
fn answer(config: &FakeBrowserConfig, method: &str, params: &Value) -> (Result<Value, String>, bool) {
    if config.failing_methods.iter().any(|m| m == method) {
        return (Err(format!("{} failed on purpose", method)), false);
    }

    match method {
        "Target.createTarget" => (Ok(json!({ "targetId": TARGET_ID })), false),
        "Target.attachToTarget" => (Ok(json!({ "sessionId": SESSION_ID })), false),
        "Target.closeTarget" => (Ok(json!({ "success": true })), false),
        "Page.enable" => (Ok(json!({})), false),
        "Page.navigate" => {
            let url = params["url"].as_str().unwrap_or_default();
            match &config.navigate_error {
                Some(text) if url != "about:blank" => (
                    Ok(json!({ "frameId": FRAME_ID, "errorText": text })),
                    false,
                ),
                _ => (Ok(json!({ "frameId": FRAME_ID, "loaderId": "LOADER-1" })), true),
            }
        }
        "Page.getFrameTree" => (
            Ok(json!({
                "frameTree": {
                    "frame": { "id": FRAME_ID, "loaderId": "LOADER-1", "url": "about:blank" },
                    "childFrames": []
                }
            })),
            false,
        ),
        "Page.setDocumentContent" => (Ok(json!({})), true),
        "Page.printToPDF" => (Ok(config.print_result.clone()), false),
        other => (Err(format!("'{}' wasn't found", other)), false),
    }
}

async fn send(
    ws: &mut tokio_tungstenite::WebSocketStream<TcpStream>,
    message: &Value,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    ws.send(Message::Text(message.to_string().into())).await
}
