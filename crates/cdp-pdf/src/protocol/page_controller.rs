// Page controller - loads a document and prints it, one operation at a time
//
// Every load follows the same order: enable page events, arm a one-shot
// listener for the readiness event, issue the command that starts loading,
// then wait on the listener. Arming before issuing is what makes an event
// that beats the command response observable. One load timeout bounds the
// whole sequence, so a command the browser never answers cannot hang it.
//
// The controller holds the session by `&mut`, so a second navigation or
// print on the same session cannot start while one is in flight.

use crate::api::pdf_options::PdfOptions;
use crate::error::{Error, Result};
use crate::pdf;
use crate::protocol::page::{PageDomain, PrintToPdfParams, WaitUntil};
use crate::protocol::session::ProtocolSession;
use crate::server::events::EventWaiter;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::error::Elapsed;

/// Longest data URL Chromium accepts for navigation.
pub const MAX_DATA_URL_BYTES: usize = 2 * 1024 * 1024;

const DATA_URL_PREFIX: &str = "data:text/html;charset=utf-8;base64,";

/// Progress of the most recent load operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No operation started yet
    Idle,
    /// Page events being enabled or the load command being issued
    Navigating,
    /// Load command accepted, waiting for the readiness event
    AwaitingLoad,
    /// Readiness event observed
    Loaded,
    /// Load timeout elapsed first
    TimedOut,
    /// Navigation was refused or the command failed
    LoadError,
}

/// Length of the data URL [`html_data_url`] would build for `html`.
pub fn data_url_len(html: &str) -> usize {
    DATA_URL_PREFIX.len() + html.len().div_ceil(3) * 4
}

/// Encodes `html` as a base64 `data:text/html` URL.
pub fn html_data_url(html: &str) -> String {
    let mut url = String::with_capacity(data_url_len(html));
    url.push_str(DATA_URL_PREFIX);
    BASE64.encode_string(html.as_bytes(), &mut url);
    url
}

fn display_url(url: &str) -> Cow<'_, str> {
    if url.starts_with("data:") {
        Cow::Owned(format!("data URL ({} bytes)", url.len()))
    } else {
        Cow::Borrowed(url)
    }
}

/// Drives page loading and PDF generation on a connected session.
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::{PageController, PdfOptions, ProtocolSession};
/// use std::time::Duration;
///
/// # async fn example(session: &mut ProtocolSession) -> cdp_pdf::Result<Vec<u8>> {
/// let mut controller = PageController::new(session, Duration::from_secs(30))?;
/// controller.load_html_content("<h1>Report</h1>").await?;
/// controller.generate_pdf(&PdfOptions::default()).await
/// # }
/// ```
pub struct PageController<'s> {
    session: &'s mut ProtocolSession,
    load_timeout: Duration,
    wait_until: WaitUntil,
    print_timeout: Option<Duration>,
    state: LoadState,
}

impl<'s> PageController<'s> {
    /// Creates a controller bounded by `load_timeout`, which must be positive.
    ///
    /// The print command is unbounded until [`with_print_timeout`](Self::with_print_timeout)
    /// sets a limit.
    pub fn new(session: &'s mut ProtocolSession, load_timeout: Duration) -> Result<Self> {
        if load_timeout.is_zero() {
            return Err(Error::InvalidArgument(
                "page load timeout must be positive".to_string(),
            ));
        }
        Ok(Self {
            session,
            load_timeout,
            wait_until: WaitUntil::default(),
            print_timeout: None,
            state: LoadState::Idle,
        })
    }

    /// Selects the event that marks the document as ready.
    pub fn with_wait_until(mut self, wait_until: WaitUntil) -> Self {
        self.wait_until = wait_until;
        self
    }

    /// Bounds the print command; `None` waits indefinitely.
    pub fn with_print_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.print_timeout = timeout;
        self
    }

    pub fn page_load_timeout_ms(&self) -> u64 {
        self.load_timeout.as_millis() as u64
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn wait_until(&self) -> WaitUntil {
        self.wait_until
    }

    pub fn session(&self) -> &ProtocolSession {
        self.session
    }

    /// Navigates to `url` and waits for the readiness event.
    ///
    /// The load timeout bounds the whole sequence, from enabling page events
    /// to the readiness event. A navigation refused by the browser fails
    /// immediately without waiting.
    pub async fn navigate_to_url(&mut self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(Error::InvalidArgument("url must not be empty".to_string()));
        }

        let page = self.session.page()?;
        let event = self.wait_until.event_name();
        let outcome = tokio::time::timeout(
            self.load_timeout,
            navigate_and_wait(&page, url, event, &mut self.state),
        )
        .await;
        self.finish_load(outcome, event)
    }

    /// Loads `html` through a base64 `data:` URL.
    ///
    /// Content whose URL would exceed [`MAX_DATA_URL_BYTES`] is rejected
    /// before any protocol traffic; use
    /// [`set_document_content`](Self::set_document_content) for it.
    pub async fn load_html_content(&mut self, html: &str) -> Result<()> {
        let len = data_url_len(html);
        if len > MAX_DATA_URL_BYTES {
            return Err(Error::InvalidArgument(format!(
                "HTML content encodes to a {}-byte data URL, over the {}-byte limit; \
                 use set_document_content instead",
                len, MAX_DATA_URL_BYTES
            )));
        }
        self.navigate_to_url(&html_data_url(html)).await
    }

    /// Injects `html` into the main frame of a blank page and waits for the
    /// readiness event.
    ///
    /// The blank page's own readiness event is consumed before the frame is
    /// looked up, so it cannot be mistaken for the injected document's. The
    /// load timeout bounds the whole sequence.
    pub async fn set_document_content(&mut self, html: &str) -> Result<()> {
        let page = self.session.page()?;
        let event = self.wait_until.event_name();
        let outcome = tokio::time::timeout(
            self.load_timeout,
            inject_and_wait(&page, html, event, &mut self.state),
        )
        .await;
        self.finish_load(outcome, event)
    }

    /// Prints the current document and returns the decoded PDF bytes.
    pub async fn generate_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>> {
        let page = self.session.page()?;
        let params = PrintToPdfParams::from(options);

        tracing::debug!(
            "Printing {}x{}in at scale {}",
            params.paper_width,
            params.paper_height,
            params.scale
        );

        let result = match page.print_to_pdf(&params, self.print_timeout).await {
            Ok(result) => result,
            Err(e) if e.is_timeout() => return Err(e),
            Err(e) => return Err(Error::generation("Page.printToPDF failed", Some(e))),
        };

        let Some(result) = result else {
            return Err(Error::generation(
                "Page.printToPDF returned no result",
                None,
            ));
        };

        let data = result.data.unwrap_or_default();
        if data.is_empty() {
            return Err(Error::generation(
                "Page.printToPDF returned empty data",
                None,
            ));
        }

        let bytes = BASE64.decode(data.as_bytes()).map_err(|e| {
            Error::generation(format!("failed to decode PDF payload: {}", e), None)
        })?;

        if !pdf::is_pdf(&bytes) {
            return Err(Error::generation(
                "decoded payload is not a PDF document",
                None,
            ));
        }

        tracing::debug!("Generated PDF of {} bytes", bytes.len());
        Ok(bytes)
    }

    fn finish_load(
        &mut self,
        outcome: std::result::Result<Result<()>, Elapsed>,
        event: &str,
    ) -> Result<()> {
        match outcome {
            Ok(Ok(())) => {
                self.state = LoadState::Loaded;
                Ok(())
            }
            Ok(Err(e)) => {
                self.state = LoadState::LoadError;
                Err(e)
            }
            Err(_) => {
                self.state = LoadState::TimedOut;
                tracing::warn!("No {} within {}ms", event, self.load_timeout.as_millis());
                Err(Error::timeout("page load", self.load_timeout))
            }
        }
    }
}

async fn navigate_and_wait(
    page: &PageDomain,
    url: &str,
    event: &str,
    state: &mut LoadState,
) -> Result<()> {
    *state = LoadState::Navigating;
    enable(page).await?;

    let waiter = page.once(event);
    tracing::debug!("Navigating to {}", display_url(url));
    navigate(page, url).await?;

    wait_for(waiter, state).await
}

async fn inject_and_wait(
    page: &PageDomain,
    html: &str,
    event: &str,
    state: &mut LoadState,
) -> Result<()> {
    *state = LoadState::Navigating;
    enable(page).await?;

    let blank = page.once(event);
    navigate(page, "about:blank").await?;
    wait_for(blank, state).await?;
    *state = LoadState::Navigating;

    let tree = page
        .get_frame_tree()
        .await
        .map_err(|e| Error::page_load("failed to read the frame tree", Some(e)))?;
    let frame_id = tree.frame.id;

    let waiter = page.once(event);
    tracing::debug!(
        "Setting document content of frame {} ({} bytes)",
        frame_id,
        html.len()
    );
    page.set_document_content(&frame_id, html)
        .await
        .map_err(|e| Error::page_load("failed to set document content", Some(e)))?;

    wait_for(waiter, state).await
}

async fn enable(page: &PageDomain) -> Result<()> {
    page.enable()
        .await
        .map_err(|e| Error::page_load("failed to enable page events", Some(e)))
}

async fn navigate(page: &PageDomain, url: &str) -> Result<()> {
    let result = page.navigate(url).await.map_err(|e| {
        Error::page_load(format!("navigation to {} failed", display_url(url)), Some(e))
    })?;
    match result.error() {
        Some(text) => Err(Error::page_load(
            format!("{} while loading {}", text, display_url(url)),
            None,
        )),
        None => Ok(()),
    }
}

async fn wait_for(mut waiter: EventWaiter, state: &mut LoadState) -> Result<()> {
    *state = LoadState::AwaitingLoad;
    waiter.recv().await.map_err(|e| {
        Error::page_load(
            format!("connection lost while waiting for {}", waiter.method()),
            Some(e),
        )
    })?;
    tracing::debug!("Observed {}", waiter.method());
    Ok(())
}

impl std::fmt::Debug for PageController<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageController")
            .field("load_timeout", &self.load_timeout)
            .field("wait_until", &self.wait_until)
            .field("print_timeout", &self.print_timeout)
            .field("state", &self.state)
            .finish()
    }
}
