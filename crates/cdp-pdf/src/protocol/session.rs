// Protocol session - one WebSocket connection to a DevTools endpoint
//
// Lifecycle: Disconnected -> Connecting -> Connected -> Closed. A closed
// session is not reusable.
//
// Page-level endpoints (/devtools/page/<id>) are driven directly. For a
// browser-level endpoint (/devtools/browser/<id>) the session creates a
// blank page target and attaches to it with a flattened session, so every
// page command carries that sessionId.

use crate::api::connect_options::ConnectOptions;
use crate::error::{Error, Result};
use crate::protocol::page::PageDomain;
use crate::server::channel::Channel;
use crate::server::connection::{Connection, ConnectionLike};
use crate::server::transport::WebSocketTransport;
use serde::Deserialize;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// Connection state of a [`ProtocolSession`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What the endpoint URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// `/devtools/browser/<id>`: a page target is created on connect
    Browser,
    /// Any other path, normally `/devtools/page/<id>`
    Page,
}

impl EndpointKind {
    fn of(url: &Url) -> Self {
        if url.path().starts_with("/devtools/browser/") {
            EndpointKind::Browser
        } else {
            EndpointKind::Page
        }
    }
}

#[derive(Debug, Clone)]
struct AttachedTarget {
    target_id: String,
    session_id: Arc<str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTargetResult {
    target_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachToTargetResult {
    session_id: String,
}

/// A connection to a browser's remote-debugging endpoint.
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::ProtocolSession;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut session = ProtocolSession::connect_to("ws://127.0.0.1:9222/devtools/browser/abc").await?;
///     session.page()?.enable().await?;
///     session.close().await;
///     Ok(())
/// }
/// ```
pub struct ProtocolSession {
    endpoint: Url,
    kind: EndpointKind,
    options: ConnectOptions,
    state: SessionState,
    connection: Option<Arc<dyn ConnectionLike>>,
    run_handle: Option<JoinHandle<()>>,
    target: Option<AttachedTarget>,
}

impl ProtocolSession {
    /// Creates a disconnected session for `endpoint`.
    ///
    /// The endpoint must be a `ws://` or `wss://` URL.
    pub fn new(endpoint: &str, options: ConnectOptions) -> Result<Self> {
        let url = Url::parse(endpoint).map_err(|e| {
            Error::InvalidArgument(format!("invalid endpoint '{}': {}", endpoint, e))
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::InvalidArgument(format!(
                "invalid endpoint '{}': expected a ws:// or wss:// URL",
                endpoint
            )));
        }

        Ok(Self {
            kind: EndpointKind::of(&url),
            endpoint: url,
            options,
            state: SessionState::Disconnected,
            connection: None,
            run_handle: None,
            target: None,
        })
    }

    /// Creates a session with default options and connects it.
    pub async fn connect_to(endpoint: &str) -> Result<Self> {
        let mut session = Self::new(endpoint, ConnectOptions::default())?;
        session.connect().await?;
        Ok(session)
    }

    /// Wraps an already-running connection to a page target.
    #[doc(hidden)]
    pub fn from_connection(endpoint: &str, connection: Arc<dyn ConnectionLike>) -> Result<Self> {
        let mut session = Self::new(endpoint, ConnectOptions::default())?;
        session.kind = EndpointKind::Page;
        session.connection = Some(connection);
        session.state = SessionState::Connected;
        Ok(session)
    }

    /// Establishes the WebSocket connection.
    ///
    /// Connecting a connected session is a no-op; connecting a closed one fails.
    pub async fn connect(&mut self) -> Result<()> {
        match self.state() {
            SessionState::Connected => return Ok(()),
            SessionState::Closed => return Err(Error::NotConnected(SessionState::Closed)),
            SessionState::Disconnected | SessionState::Connecting => {}
        }

        self.state = SessionState::Connecting;
        let limit = self.options.effective_timeout();
        tracing::debug!("Connecting to {} (timeout {}ms)", self.endpoint, limit.as_millis());

        let handshake =
            WebSocketTransport::connect(self.endpoint.as_str(), self.options.headers.clone());
        let (transport, message_rx) = match tokio::time::timeout(limit, handshake).await {
            Ok(Ok(parts)) => parts,
            Ok(Err(e)) => {
                self.state = SessionState::Disconnected;
                return Err(self.connection_failed(e.to_string()));
            }
            Err(_) => {
                self.state = SessionState::Disconnected;
                return Err(self.connection_failed(format!(
                    "handshake did not complete within {}ms",
                    limit.as_millis()
                )));
            }
        };

        let (sender, receiver) = transport.into_parts();
        let connection = Arc::new(Connection::new(sender, receiver, message_rx));
        let runner = Arc::clone(&connection);
        self.run_handle = Some(tokio::spawn(async move {
            runner.run().await;
        }));
        self.connection = Some(connection);

        if self.kind == EndpointKind::Browser {
            if let Err(e) = self.attach_page_target().await {
                self.teardown().await;
                self.state = SessionState::Disconnected;
                return Err(self.connection_failed(format!("failed to attach page target: {}", e)));
            }
        }

        self.state = SessionState::Connected;
        tracing::info!("Connected to {}", self.endpoint);
        Ok(())
    }

    async fn attach_page_target(&mut self) -> Result<()> {
        let browser = self.channel_for(None)?;

        let created: CreateTargetResult = browser
            .send("Target.createTarget", json!({ "url": "about:blank" }))
            .await?;
        let attached: AttachToTargetResult = browser
            .send(
                "Target.attachToTarget",
                json!({ "targetId": created.target_id, "flatten": true }),
            )
            .await?;

        tracing::debug!(
            "Attached to target {} (session {})",
            created.target_id,
            attached.session_id
        );
        self.target = Some(AttachedTarget {
            target_id: created.target_id,
            session_id: Arc::from(attached.session_id),
        });
        Ok(())
    }

    /// Releases the connection. Idempotent.
    ///
    /// A page target created on connect is closed first, best effort.
    pub async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Some(target) = self.target.take() {
            if let Ok(browser) = self.channel_for(None) {
                let closed = browser
                    .send_no_result(
                        "Target.closeTarget",
                        json!({ "targetId": target.target_id }),
                    )
                    .await;
                if let Err(e) = closed {
                    tracing::warn!("Failed to close target {}: {}", target.target_id, e);
                }
            }
        }

        self.teardown().await;
        self.state = SessionState::Closed;
        tracing::debug!("Session for {} closed", self.endpoint);
    }

    async fn teardown(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
        }
        if let Some(handle) = self.run_handle.take() {
            handle.abort();
        }
    }

    /// Typed page-domain commands for the attached page.
    ///
    /// Fails unless the session is connected.
    pub fn page(&self) -> Result<PageDomain> {
        let state = self.state();
        if state != SessionState::Connected {
            return Err(Error::NotConnected(state));
        }
        let session_id = self.target.as_ref().map(|t| Arc::clone(&t.session_id));
        Ok(PageDomain::new(self.channel_for(session_id)?))
    }

    fn channel_for(&self, session_id: Option<Arc<str>>) -> Result<Channel> {
        let connection = self
            .connection
            .as_ref()
            .ok_or(Error::NotConnected(self.state))?;
        Ok(Channel::new(session_id, Arc::clone(connection)))
    }

    fn connection_failed(&self, reason: String) -> Error {
        Error::ConnectionFailed {
            endpoint: self.endpoint.to_string(),
            reason,
        }
    }

    /// Current state, downgraded to `Closed` if the transport has dropped.
    pub fn state(&self) -> SessionState {
        match (&self.connection, self.state) {
            (Some(connection), SessionState::Connected) if connection.is_closed() => {
                SessionState::Closed
            }
            (_, state) => state,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn endpoint_kind(&self) -> EndpointKind {
        self.kind
    }

    /// Flattened session id of the attached page target, if any
    pub fn target_session_id(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.session_id.as_ref())
    }
}

impl Drop for ProtocolSession {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.shutdown();
        }
        if let Some(handle) = self.run_handle.take() {
            handle.abort();
        }
    }
}

impl fmt::Debug for ProtocolSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolSession")
            .field("endpoint", &self.endpoint.as_str())
            .field("kind", &self.kind)
            .field("state", &self.state)
            .field("target", &self.target)
            .finish()
    }
}
