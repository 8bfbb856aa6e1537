// Error types for cdp-pdf
//
// A single closed enum. Every variant reports one of five kinds through
// `Error::kind()`, so callers can match exhaustively on the failure category
// without caring which layer raised it.

use crate::protocol::session::SessionState;
use thiserror::Error;

/// Result type alias for cdp-pdf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The transport could not be established, dropped, or the session is not usable
    Connection,
    /// A bounded wait (page load or print) exceeded its limit
    Timeout,
    /// Navigation reported an error or content injection failed
    PageLoad,
    /// The print command failed or produced an unusable document
    Generation,
    /// Invalid input to a constructor or builder, raised before any protocol activity
    InvalidArgument,
}

/// Errors that can occur when converting documents
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to establish the WebSocket connection to the debugging endpoint
    ///
    /// Common causes: the browser is not running with `--remote-debugging-port`,
    /// the endpoint id is stale, or a proxy rejects the upgrade.
    #[error("Failed to connect to browser at '{endpoint}': {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// Transport-level error (WebSocket read/write)
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Channel closed unexpectedly (the connection dropped while a caller was waiting)
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    /// The session is not in a state that allows protocol traffic
    #[error("Session is not connected (state: {0})")]
    NotConnected(SessionState),

    /// Protocol-level error returned by the browser for a command
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Timeout waiting for an operation
    ///
    /// Carries the bound that elapsed so the message reports it.
    #[error("Timeout after {duration_ms}ms waiting for {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// Navigation or content injection failed
    #[error("Page load failed: {message}")]
    PageLoadFailed {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// The print command failed or returned an unusable payload
    #[error("PDF generation failed: {message}")]
    GenerationFailed {
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Invalid argument provided to a constructor or builder
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error with additional context
    #[error("{0}: {1}")]
    Context(String, #[source] Box<Error>),
}

impl Error {
    /// Adds context to the error
    pub fn context(self, msg: impl Into<String>) -> Self {
        Error::Context(msg.into(), Box::new(self))
    }

    /// Returns the failure category.
    ///
    /// Context wrappers report the kind of the error they wrap.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConnectionFailed { .. }
            | Error::TransportError(_)
            | Error::ChannelClosed
            | Error::NotConnected(_) => ErrorKind::Connection,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::PageLoadFailed { .. } => ErrorKind::PageLoad,
            Error::GenerationFailed { .. } | Error::ProtocolError(_) | Error::Json(_) => {
                ErrorKind::Generation
            }
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Context(_, inner) => inner.kind(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    pub(crate) fn timeout(operation: impl Into<String>, duration: std::time::Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub(crate) fn page_load(message: impl Into<String>, source: Option<Error>) -> Self {
        Error::PageLoadFailed {
            message: message.into(),
            source: source.map(Box::new),
        }
    }

    pub(crate) fn generation(message: impl Into<String>, source: Option<Error>) -> Self {
        Error::GenerationFailed {
            message: message.into(),
            source: source.map(Box::new),
        }
    }
}
