// Converter configuration
//
// Settings for the `Converter` facade: where the browser lives and how long
// each phase of a conversion may take. Built in code with the fluent setters
// or read from `CDP_PDF_*` environment variables.

use crate::api::connect_options::ConnectOptions;
use crate::error::{Error, Result};
use crate::protocol::page::WaitUntil;
use std::str::FromStr;
use std::time::Duration;

/// Default bound on waiting for the page-ready event.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(crate::DEFAULT_TIMEOUT_MS);

/// Default bound on the print command.
pub const DEFAULT_PRINT_TIMEOUT: Duration = Duration::from_secs(60);

/// HTML up to this many bytes is loaded through a `data:` URL; larger
/// documents are injected directly into the main frame.
pub const DEFAULT_INLINE_HTML_LIMIT: usize = 64 * 1024;

/// Debugging endpoint (`ws://host:port/devtools/...`). Required by `from_env`.
pub const ENV_ENDPOINT: &str = "CDP_PDF_ENDPOINT";
/// Load timeout in milliseconds.
pub const ENV_LOAD_TIMEOUT_MS: &str = "CDP_PDF_LOAD_TIMEOUT_MS";
/// Print timeout in milliseconds; `0` disables the bound.
pub const ENV_PRINT_TIMEOUT_MS: &str = "CDP_PDF_PRINT_TIMEOUT_MS";
/// WebSocket handshake timeout in milliseconds.
pub const ENV_CONNECT_TIMEOUT_MS: &str = "CDP_PDF_CONNECT_TIMEOUT_MS";
/// Inline HTML size limit in bytes.
pub const ENV_INLINE_LIMIT_BYTES: &str = "CDP_PDF_INLINE_LIMIT_BYTES";
/// Readiness event: `domcontentloaded` or `load`.
pub const ENV_WAIT_UNTIL: &str = "CDP_PDF_WAIT_UNTIL";

/// Configuration for [`Converter`](crate::Converter)
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::ConverterConfig;
/// use std::time::Duration;
///
/// let config = ConverterConfig::new("ws://127.0.0.1:9222/devtools/browser/abc")
///     .load_timeout(Duration::from_secs(10))
///     .print_timeout(None);
/// ```
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// WebSocket debugging endpoint of a running browser
    pub endpoint: String,
    /// Handshake options
    pub connect: ConnectOptions,
    /// Bound on waiting for the page-ready event
    pub load_timeout: Duration,
    /// Bound on the print command; `None` waits indefinitely
    pub print_timeout: Option<Duration>,
    /// Which page event counts as "ready"
    pub wait_until: WaitUntil,
    /// Size threshold between data-URL loading and direct content injection
    pub inline_html_limit: usize,
}

impl ConverterConfig {
    /// Creates a configuration for `endpoint` with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect: ConnectOptions::default(),
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            print_timeout: Some(DEFAULT_PRINT_TIMEOUT),
            wait_until: WaitUntil::default(),
            inline_html_limit: DEFAULT_INLINE_HTML_LIMIT,
        }
    }

    /// Reads the configuration from `CDP_PDF_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENV_ENDPOINT)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::InvalidArgument(format!("{} is not set", ENV_ENDPOINT))
            })?;

        let mut config = Self::new(endpoint.trim());

        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_LOAD_TIMEOUT_MS)? {
            config.load_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_PRINT_TIMEOUT_MS)? {
            config.print_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_CONNECT_TIMEOUT_MS)? {
            config.connect = config.connect.timeout(Duration::from_millis(ms));
        }
        if let Some(bytes) = parse_var::<usize, _>(&lookup, ENV_INLINE_LIMIT_BYTES)? {
            config.inline_html_limit = bytes;
        }
        if let Some(raw) = lookup(ENV_WAIT_UNTIL) {
            config.wait_until = WaitUntil::from_name(raw.trim()).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "{} must be 'domcontentloaded' or 'load', got '{}'",
                    ENV_WAIT_UNTIL, raw
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set handshake options.
    pub fn connect_options(mut self, connect: ConnectOptions) -> Self {
        self.connect = connect;
        self
    }

    /// Set the page-ready timeout.
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Set the print timeout; `None` disables it.
    pub fn print_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.print_timeout = timeout;
        self
    }

    /// Set which page event marks the document as ready.
    pub fn wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    /// Set the inline HTML size threshold in bytes.
    pub fn inline_html_limit(mut self, bytes: usize) -> Self {
        self.inline_html_limit = bytes;
        self
    }

    /// Checks that every bound is usable.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "endpoint must not be empty".to_string(),
            ));
        }
        if self.load_timeout.is_zero() {
            return Err(Error::InvalidArgument(
                "load timeout must be positive".to_string(),
            ));
        }
        if self.print_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidArgument(
                "print timeout must be positive when set".to_string(),
            ));
        }
        if self.connect.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::InvalidArgument(
                "connect timeout must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reads `key` as an unsigned integer; values out of range for `T` fail.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::InvalidArgument(format!(
                "{} must be a non-negative integer, got '{}'",
                key, raw
            ))
        }),
    }
}
