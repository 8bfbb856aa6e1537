// Page domain - typed DevTools commands for one page target
//
// Thin wrappers over the Page.* commands used to load a document and print
// it. No synchronization happens here; see page_controller for that.

use crate::api::pdf_options::PdfOptions;
use crate::error::Result;
use crate::server::channel::Channel;
use crate::server::events::{EventSubscription, EventWaiter};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

/// Fired once the main document has been parsed
pub const DOM_CONTENT_EVENT_FIRED: &str = "Page.domContentEventFired";
/// Fired once the page and its subresources have loaded
pub const LOAD_EVENT_FIRED: &str = "Page.loadEventFired";

/// When to consider navigation succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitUntil {
    /// Consider operation to be finished when the `DOMContentLoaded` event is fired
    #[default]
    DomContentLoaded,
    /// Consider operation to be finished when the `load` event is fired
    Load,
}

impl WaitUntil {
    /// Protocol event that signals readiness
    pub fn event_name(&self) -> &'static str {
        match self {
            WaitUntil::DomContentLoaded => DOM_CONTENT_EVENT_FIRED,
            WaitUntil::Load => LOAD_EVENT_FIRED,
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "domcontentloaded" => Some(WaitUntil::DomContentLoaded),
            "load" => Some(WaitUntil::Load),
            _ => None,
        }
    }
}

/// Result of `Page.navigate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResult {
    #[serde(default)]
    pub frame_id: String,
    pub loader_id: Option<String>,
    pub error_text: Option<String>,
}

impl NavigateResult {
    /// The navigation error, if the browser reported a non-empty one
    pub fn error(&self) -> Option<&str> {
        self.error_text.as_deref().filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: String,
    pub parent_id: Option<String>,
    pub loader_id: Option<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTree {
    pub frame: Frame,
    #[serde(default)]
    pub child_frames: Vec<FrameTree>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetFrameTreeResult {
    frame_tree: FrameTree,
}

/// Parameters of `Page.printToPDF`
///
/// Every field is sent on every call, in protocol order. Lengths are inches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintToPdfParams {
    pub landscape: bool,
    pub display_header_footer: bool,
    pub print_background: bool,
    pub scale: f64,
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub page_ranges: String,
    pub ignore_invalid_page_ranges: bool,
    pub header_template: String,
    pub footer_template: String,
    #[serde(rename = "preferCSSPageSize")]
    pub prefer_css_page_size: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_mode: Option<String>,
}

impl From<&PdfOptions> for PrintToPdfParams {
    fn from(options: &PdfOptions) -> Self {
        Self {
            landscape: options.landscape(),
            display_header_footer: options.display_header_footer(),
            print_background: options.print_background(),
            scale: options.scale(),
            paper_width: options.paper_width(),
            paper_height: options.paper_height(),
            margin_top: options.margin_top(),
            margin_bottom: options.margin_bottom(),
            margin_left: options.margin_left(),
            margin_right: options.margin_right(),
            page_ranges: options.page_ranges().to_string(),
            ignore_invalid_page_ranges: false,
            header_template: options.header_template().to_string(),
            footer_template: options.footer_template().to_string(),
            prefer_css_page_size: options.prefer_css_page_size(),
            transfer_mode: None,
        }
    }
}

/// Result of `Page.printToPDF`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrintToPdfResult {
    /// Base64-encoded document
    #[serde(default)]
    pub data: Option<String>,
    /// Stream handle, only with `transferMode: ReturnAsStream`
    #[serde(default)]
    pub stream: Option<String>,
}

/// Page-domain commands for one target
///
/// Obtained from [`ProtocolSession::page`](crate::ProtocolSession::page).
#[derive(Debug, Clone)]
pub struct PageDomain {
    channel: Channel,
}

impl PageDomain {
    pub(crate) fn new(channel: Channel) -> Self {
        Self { channel }
    }

    /// `Page.enable`: turns on page lifecycle events
    pub async fn enable(&self) -> Result<()> {
        self.channel.send_no_result("Page.enable", json!({})).await
    }

    /// `Page.navigate`. Returns as soon as navigation is committed or refused.
    pub async fn navigate(&self, url: &str) -> Result<NavigateResult> {
        self.channel.send("Page.navigate", json!({ "url": url })).await
    }

    /// `Page.getFrameTree`
    pub async fn get_frame_tree(&self) -> Result<FrameTree> {
        let result: GetFrameTreeResult = self.channel.send("Page.getFrameTree", json!({})).await?;
        Ok(result.frame_tree)
    }

    /// `Page.setDocumentContent`: replaces the document of `frame_id`
    pub async fn set_document_content(&self, frame_id: &str, html: &str) -> Result<()> {
        self.channel
            .send_no_result(
                "Page.setDocumentContent",
                json!({ "frameId": frame_id, "html": html }),
            )
            .await
    }

    /// `Page.printToPDF`, bounded by `timeout` when set.
    ///
    /// A `null` result is returned as `None`.
    pub async fn print_to_pdf(
        &self,
        params: &PrintToPdfParams,
        timeout: Option<Duration>,
    ) -> Result<Option<PrintToPdfResult>> {
        let value: Value = self
            .channel
            .send_with_timeout("Page.printToPDF", params, timeout)
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Arms a one-shot listener for a page event.
    pub fn once(&self, event: &str) -> EventWaiter {
        self.channel.once(event)
    }

    /// Registers a persistent listener for a page event.
    pub fn subscribe(&self, event: &str) -> EventSubscription {
        self.channel.subscribe(event)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.channel.session_id()
    }
}
