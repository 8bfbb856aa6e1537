//! cdp-pdf: HTML to PDF through the Chrome DevTools Protocol
//!
//! This crate drives an already-running Chromium-family browser over its
//! remote-debugging WebSocket: it loads a document, waits for the page to be
//! ready with a bounded wait, and prints it with `Page.printToPDF`.
//!
//! # Examples
//!
//! ## One-shot conversion
//!
//! ```ignore
//! use cdp_pdf::{Converter, ConverterConfig, PaperFormat, PdfOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(ConverterConfig::new(
//!         "ws://127.0.0.1:9222/devtools/browser/0c5f3d0e",
//!     ));
//!
//!     let options = PdfOptions::builder()
//!         .paper_format(PaperFormat::A4)
//!         .margins("1cm")?
//!         .print_background(true)
//!         .build();
//!
//!     let pdf = converter.convert("<h1>Invoice</h1>", &options).await?;
//!     assert!(cdp_pdf::pdf::is_pdf(&pdf));
//!     std::fs::write("invoice.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Driving a session directly
//!
//! ```ignore
//! use cdp_pdf::{PageController, PdfOptions, ProtocolSession, WaitUntil};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session =
//!         ProtocolSession::connect_to("ws://127.0.0.1:9222/devtools/page/8F1C").await?;
//!
//!     let pdf = {
//!         let mut controller = PageController::new(&mut session, Duration::from_secs(10))?
//!             .with_wait_until(WaitUntil::Load)
//!             .with_print_timeout(Some(Duration::from_secs(30)));
//!         controller.navigate_to_url("https://example.com").await?;
//!         controller.generate_pdf(&PdfOptions::default()).await?
//!     };
//!
//!     session.close().await;
//!     std::fs::write("example.pdf", pdf)?;
//!     Ok(())
//! }
//! ```

// Internal modules (exposed for integration tests)
#[doc(hidden)]
pub mod server;

pub mod api;
mod error;
pub mod pdf;
pub mod protocol;

/// Default timeout in milliseconds for waiting on page readiness.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// Re-export error types
pub use error::{Error, ErrorKind, Result};

// Re-export configuration and options
pub use api::{ConnectOptions, ConverterConfig, Length, PaperFormat, PdfOptions, PdfOptionsBuilder};

// Re-export protocol entry points
pub use protocol::{
    ConversionContext, Converter, LoadState, PageController, ProtocolSession, SessionState,
    WaitUntil,
};
