// Conversion context
//
// Bundles what a single conversion needs: the session it runs on, the print
// options, the load bound and a diagnostic source name. Start and completion
// times are recorded by explicit calls; nothing is timed implicitly.

use crate::api::pdf_options::PdfOptions;
use crate::error::{Error, Result};
use crate::protocol::session::ProtocolSession;
use std::time::{Duration, SystemTime};

/// Source name used when none is given
pub const DEFAULT_SOURCE: &str = "<inline html>";

/// State of one conversion
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::{ConversionContext, PdfOptions};
///
/// let mut context = ConversionContext::builder(&mut session)
///     .options(PdfOptions::default())
///     .load_timeout_ms(10_000)
///     .source("invoice-42.html")
///     .build()?;
///
/// context.mark_started();
/// // ... convert ...
/// context.mark_completed();
/// println!("{} took {}ms", context.source(), context.duration_ms());
/// ```
#[derive(Debug)]
pub struct ConversionContext<'s> {
    session: &'s mut ProtocolSession,
    options: PdfOptions,
    load_timeout: Duration,
    source: String,
    started_at: Option<SystemTime>,
    completed_at: Option<SystemTime>,
}

impl<'s> ConversionContext<'s> {
    /// Starts a builder for a context running on `session`.
    pub fn builder(session: &'s mut ProtocolSession) -> ConversionContextBuilder<'s> {
        ConversionContextBuilder {
            session,
            options: PdfOptions::default(),
            load_timeout: Duration::from_millis(crate::DEFAULT_TIMEOUT_MS),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    pub fn session(&self) -> &ProtocolSession {
        self.session
    }

    pub fn session_mut(&mut self) -> &mut ProtocolSession {
        self.session
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    pub fn load_timeout(&self) -> Duration {
        self.load_timeout
    }

    pub fn load_timeout_ms(&self) -> u64 {
        self.load_timeout.as_millis() as u64
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn started_at(&self) -> Option<SystemTime> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<SystemTime> {
        self.completed_at
    }

    /// Records the start time.
    pub fn mark_started(&mut self) {
        self.started_at = Some(SystemTime::now());
    }

    /// Records the completion time.
    pub fn mark_completed(&mut self) {
        self.completed_at = Some(SystemTime::now());
    }

    /// Milliseconds between start and completion.
    ///
    /// Zero unless both are recorded and completion is not earlier than start.
    pub fn duration_ms(&self) -> u64 {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => end
                .duration_since(start)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0),
            _ => 0,
        }
    }
}

/// Builder for [`ConversionContext`]
#[derive(Debug)]
pub struct ConversionContextBuilder<'s> {
    session: &'s mut ProtocolSession,
    options: PdfOptions,
    load_timeout: Duration,
    source: String,
}

impl<'s> ConversionContextBuilder<'s> {
    pub fn options(mut self, options: PdfOptions) -> Self {
        self.options = options;
        self
    }

    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn load_timeout_ms(mut self, millis: u64) -> Self {
        self.load_timeout = Duration::from_millis(millis);
        self
    }

    /// Diagnostic name of the document being converted
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Builds the context. Fails for a zero load timeout.
    pub fn build(self) -> Result<ConversionContext<'s>> {
        if self.load_timeout.is_zero() {
            return Err(Error::InvalidArgument(
                "load timeout must be positive".to_string(),
            ));
        }
        Ok(ConversionContext {
            session: self.session,
            options: self.options,
            load_timeout: self.load_timeout,
            source: self.source,
            started_at: None,
            completed_at: None,
        })
    }
}
