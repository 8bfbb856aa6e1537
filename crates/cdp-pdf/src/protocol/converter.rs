// Converter - HTML/URL to PDF in one call
//
// Composes session, context and page controller. Holds no protocol logic of
// its own.

use crate::api::converter_config::ConverterConfig;
use crate::api::pdf_options::PdfOptions;
use crate::error::Result;
use crate::pdf;
use crate::protocol::context::{ConversionContext, DEFAULT_SOURCE};
use crate::protocol::page_controller::{MAX_DATA_URL_BYTES, PageController, data_url_len};
use crate::protocol::session::ProtocolSession;

#[derive(Debug, Clone, Copy)]
enum Document<'a> {
    Html(&'a str),
    Url(&'a str),
}

impl Document<'_> {
    fn source(&self) -> &str {
        match self {
            Document::Html(_) => DEFAULT_SOURCE,
            Document::Url(url) => url,
        }
    }
}

/// Converts HTML documents to PDF through a running browser.
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::{Converter, ConverterConfig, PdfOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let converter = Converter::new(ConverterConfig::from_env()?);
///     let pdf = converter
///         .convert("<h1>Hello</h1>", &PdfOptions::default())
///         .await?;
///     std::fs::write("hello.pdf", pdf)?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter configured from `CDP_PDF_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(ConverterConfig::from_env()?))
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Converts `html` on a fresh session that is closed afterwards.
    pub async fn convert(&self, html: &str, options: &PdfOptions) -> Result<Vec<u8>> {
        self.convert_on_fresh_session(Document::Html(html), options)
            .await
    }

    /// Navigates to `url` on a fresh session and prints it.
    pub async fn convert_url(&self, url: &str, options: &PdfOptions) -> Result<Vec<u8>> {
        self.convert_on_fresh_session(Document::Url(url), options)
            .await
    }

    /// Converts `html` on a session owned by the caller.
    ///
    /// After a timeout the page may still be busy, so the session is closed
    /// and the caller must open a new one.
    pub async fn convert_with_session(
        &self,
        session: &mut ProtocolSession,
        html: &str,
        options: &PdfOptions,
    ) -> Result<Vec<u8>> {
        self.convert_document(session, Document::Html(html), options)
            .await
    }

    async fn convert_on_fresh_session(
        &self,
        document: Document<'_>,
        options: &PdfOptions,
    ) -> Result<Vec<u8>> {
        self.config.validate()?;

        let mut session =
            ProtocolSession::new(&self.config.endpoint, self.config.connect.clone())?;
        session.connect().await?;

        let result = self.convert_document(&mut session, document, options).await;
        session.close().await;
        result
    }

    async fn convert_document(
        &self,
        session: &mut ProtocolSession,
        document: Document<'_>,
        options: &PdfOptions,
    ) -> Result<Vec<u8>> {
        let mut context = ConversionContext::builder(session)
            .options(options.clone())
            .load_timeout(self.config.load_timeout)
            .source(document.source())
            .build()?;

        let result = self.run(&mut context, document).await;

        match &result {
            Ok(bytes) => tracing::info!(
                "Converted {} to PDF: {} bytes, {} page(s) in {}ms",
                context.source(),
                bytes.len(),
                pdf::page_count(bytes),
                context.duration_ms()
            ),
            Err(e) if e.is_timeout() => {
                tracing::warn!(
                    "Conversion of {} timed out; closing session: {}",
                    context.source(),
                    e
                );
                context.session_mut().close().await;
            }
            Err(e) => tracing::warn!("Conversion of {} failed: {}", context.source(), e),
        }

        result
    }

    async fn run(
        &self,
        context: &mut ConversionContext<'_>,
        document: Document<'_>,
    ) -> Result<Vec<u8>> {
        let options = context.options().clone();
        let load_timeout = context.load_timeout();
        context.mark_started();

        let mut controller = PageController::new(context.session_mut(), load_timeout)?
            .with_wait_until(self.config.wait_until)
            .with_print_timeout(self.config.print_timeout);

        match document {
            Document::Url(url) => controller.navigate_to_url(url).await?,
            Document::Html(html) if self.fits_inline(html) => {
                controller.load_html_content(html).await?
            }
            Document::Html(html) => controller.set_document_content(html).await?,
        }
        let bytes = controller.generate_pdf(&options).await?;

        context.mark_completed();
        Ok(bytes)
    }

    fn fits_inline(&self, html: &str) -> bool {
        html.len() <= self.config.inline_html_limit && data_url_len(html) <= MAX_DATA_URL_BYTES
    }
}
