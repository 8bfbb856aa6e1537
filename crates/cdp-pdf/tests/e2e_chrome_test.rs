//! End-to-end tests against a real browser
//!
//! Opt-in: set `CDP_PDF_TEST_ENDPOINT` to the WebSocket debugging URL of a
//! running Chromium, e.g.
//!
//! ```bash
//! chromium --headless=new --remote-debugging-port=9222 &
//! export CDP_PDF_TEST_ENDPOINT=$(curl -s localhost:9222/json/version | jq -r .webSocketDebuggerUrl)
//! cargo test --test e2e_chrome_test
//! ```
//!
//! Without it every test returns early.

use cdp_pdf::pdf;
use cdp_pdf::{Converter, ConverterConfig, ErrorKind, PaperFormat, PdfOptions};
use std::time::Duration;

mod common;

const ENDPOINT_VAR: &str = "CDP_PDF_TEST_ENDPOINT";

fn endpoint() -> Option<String> {
    match std::env::var(ENDPOINT_VAR) {
        Ok(endpoint) if !endpoint.trim().is_empty() => Some(endpoint),
        _ => {
            eprintln!("Skipping: {} is not set", ENDPOINT_VAR);
            None
        }
    }
}

#[tokio::test]
async fn test_minimal_html_to_pdf() {
    common::init_tracing();
    let Some(endpoint) = endpoint() else {
        return;
    };

    let converter = Converter::new(ConverterConfig::new(endpoint));
    let bytes = converter
        .convert("<h1>Minimal</h1>", &PdfOptions::default())
        .await
        .expect("Failed to convert minimal document");

    assert!(pdf::is_pdf(&bytes));
    assert!(pdf::page_count(&bytes) >= 1);
}

#[tokio::test]
async fn test_large_document_through_content_injection() {
    common::init_tracing();
    let Some(endpoint) = endpoint() else {
        return;
    };

    let rows = (0..5000)
        .map(|n| format!("<tr><td>{}</td><td>row {}</td></tr>", n, n))
        .collect::<String>();
    let html = format!("<table>{}</table>", rows);

    let converter = Converter::new(ConverterConfig::new(endpoint).inline_html_limit(1024));
    let options = PdfOptions::builder()
        .paper_format(PaperFormat::A4)
        .margins("10mm")
        .expect("valid margin")
        .build();
    let bytes = converter
        .convert(&html, &options)
        .await
        .expect("Failed to convert large document");

    assert!(pdf::is_pdf(&bytes));
    assert!(pdf::page_count(&bytes) > 1);
}

#[tokio::test]
async fn test_page_ranges_limit_output() {
    common::init_tracing();
    let Some(endpoint) = endpoint() else {
        return;
    };

    let html = (1..=4)
        .map(|n| format!("<section style='page-break-after: always'>Page {}</section>", n))
        .collect::<String>();
    let options = PdfOptions::builder()
        .page_ranges("2-3")
        .expect("valid page ranges")
        .build();

    let bytes = Converter::new(ConverterConfig::new(endpoint))
        .convert(&html, &options)
        .await
        .expect("Failed to convert paged document");
    assert_eq!(pdf::page_count(&bytes), 2);
}

#[tokio::test]
async fn test_unresolvable_url_is_page_load_failure() {
    common::init_tracing();
    let Some(endpoint) = endpoint() else {
        return;
    };

    let converter = Converter::new(
        ConverterConfig::new(endpoint).load_timeout(Duration::from_secs(10)),
    );
    let err = converter
        .convert_url("http://nonexistent.invalid/", &PdfOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PageLoad, "{}", err);
}
