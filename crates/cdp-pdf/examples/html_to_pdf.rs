// Example: HTML to PDF
//
// Converts an HTML file (or a built-in sample) to PDF through a running
// Chromium started with remote debugging enabled.
//
// To run this example:
// chromium --headless=new --remote-debugging-port=9222 &
// export CDP_PDF_ENDPOINT=$(curl -s localhost:9222/json/version | jq -r .webSocketDebuggerUrl)
// cargo run --example html_to_pdf -- report.html report.pdf

use cdp_pdf::{Converter, PaperFormat, PdfOptions, pdf};

const SAMPLE: &str = "<html><body>\
    <h1>cdp-pdf</h1>\
    <p>Printed through the DevTools protocol.</p>\
</body></html>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let html = match args.next() {
        Some(path) => std::fs::read_to_string(&path)?,
        None => SAMPLE.to_string(),
    };
    let output = args.next().unwrap_or_else(|| "output.pdf".to_string());

    let converter = Converter::from_env()?;

    let options = PdfOptions::builder()
        .paper_format(PaperFormat::A4)
        .margins("15mm")?
        .print_background(true)
        .display_header_footer(true)
        .footer_template(
            "<div style='font-size:8px;width:100%;text-align:center'>\
             <span class='pageNumber'></span> / <span class='totalPages'></span></div>",
        )
        .build();

    let bytes = converter.convert(&html, &options).await?;
    std::fs::write(&output, &bytes)?;

    println!(
        "Wrote {} ({} bytes, {} page(s))",
        output,
        bytes.len(),
        pdf::page_count(&bytes)
    );
    Ok(())
}
