// PDF print options
//
// Immutable, validated parameters for `Page.printToPDF`. Values are built
// through `PdfOptionsBuilder`, whose fallible setters reject invalid input
// immediately, so a `PdfOptions` value can never hold an out-of-range field.

use crate::api::page_ranges::normalize_page_ranges;
use crate::api::paper_format::PaperFormat;
use crate::api::units::Length;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Smallest accepted scale factor
pub const MIN_SCALE: f64 = 0.1;

/// Largest accepted scale factor
pub const MAX_SCALE: f64 = 2.0;

/// Default margin on every side, in inches (the browser's own default of ~1cm)
pub const DEFAULT_MARGIN_INCHES: f64 = 0.4;

/// Validated PDF generation options
///
/// All lengths are in inches.
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::{PaperFormat, PdfOptions};
///
/// let options = PdfOptions::builder()
///     .paper_format(PaperFormat::A4)
///     .landscape(true)
///     .margins("1cm")?
///     .page_ranges("1-3, 5")?
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PdfOptionsDocument")]
pub struct PdfOptions {
    landscape: bool,
    display_header_footer: bool,
    print_background: bool,
    scale: f64,
    paper_width: f64,
    paper_height: f64,
    margin_top: f64,
    margin_bottom: f64,
    margin_left: f64,
    margin_right: f64,
    page_ranges: String,
    header_template: String,
    footer_template: String,
    prefer_css_page_size: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        let (paper_width, paper_height) = PaperFormat::Letter.dimensions();
        Self {
            landscape: false,
            display_header_footer: false,
            print_background: false,
            scale: 1.0,
            paper_width,
            paper_height,
            margin_top: DEFAULT_MARGIN_INCHES,
            margin_bottom: DEFAULT_MARGIN_INCHES,
            margin_left: DEFAULT_MARGIN_INCHES,
            margin_right: DEFAULT_MARGIN_INCHES,
            page_ranges: String::new(),
            header_template: String::new(),
            footer_template: String::new(),
            prefer_css_page_size: false,
        }
    }
}

impl PdfOptions {
    /// Create a new builder seeded with the default options
    pub fn builder() -> PdfOptionsBuilder {
        PdfOptionsBuilder::default()
    }

    pub fn landscape(&self) -> bool {
        self.landscape
    }

    pub fn display_header_footer(&self) -> bool {
        self.display_header_footer
    }

    pub fn print_background(&self) -> bool {
        self.print_background
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn paper_width(&self) -> f64 {
        self.paper_width
    }

    pub fn paper_height(&self) -> f64 {
        self.paper_height
    }

    pub fn margin_top(&self) -> f64 {
        self.margin_top
    }

    pub fn margin_bottom(&self) -> f64 {
        self.margin_bottom
    }

    pub fn margin_left(&self) -> f64 {
        self.margin_left
    }

    pub fn margin_right(&self) -> f64 {
        self.margin_right
    }

    /// Normalized page selection; empty means every page.
    pub fn page_ranges(&self) -> &str {
        &self.page_ranges
    }

    pub fn header_template(&self) -> &str {
        &self.header_template
    }

    pub fn footer_template(&self) -> &str {
        &self.footer_template
    }

    pub fn prefer_css_page_size(&self) -> bool {
        self.prefer_css_page_size
    }
}

/// Builder for PdfOptions
///
/// Setters that can fail return `Result<Self>` and report the precise reason.
/// `build` borrows the builder, so one builder can produce several snapshots;
/// later changes never touch snapshots already built.
#[derive(Debug, Clone, Default)]
pub struct PdfOptionsBuilder {
    options: PdfOptions,
}

impl PdfOptionsBuilder {
    /// Print in landscape orientation
    pub fn landscape(mut self, landscape: bool) -> Self {
        self.options.landscape = landscape;
        self
    }

    /// Render the header and footer templates
    pub fn display_header_footer(mut self, display: bool) -> Self {
        self.options.display_header_footer = display;
        self
    }

    /// Print background graphics
    pub fn print_background(mut self, print_background: bool) -> Self {
        self.options.print_background = print_background;
        self
    }

    /// Prefer page size declared by CSS `@page` over the paper size
    pub fn prefer_css_page_size(mut self, prefer: bool) -> Self {
        self.options.prefer_css_page_size = prefer;
        self
    }

    /// Set the header template markup
    pub fn header_template(mut self, template: impl Into<String>) -> Self {
        self.options.header_template = template.into();
        self
    }

    /// Set the footer template markup
    pub fn footer_template(mut self, template: impl Into<String>) -> Self {
        self.options.footer_template = template.into();
        self
    }

    /// Set the rendering scale, between 0.1 and 2.0 inclusive
    pub fn scale(mut self, scale: f64) -> Result<Self> {
        if !scale.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
            return Err(Error::InvalidArgument(format!(
                "scale {} is out of range [{}, {}]",
                scale, MIN_SCALE, MAX_SCALE
            )));
        }
        self.options.scale = scale;
        Ok(self)
    }

    /// Set the paper width (inches or a unit string); must be positive
    pub fn paper_width(mut self, width: impl Into<Length>) -> Result<Self> {
        self.options.paper_width = positive_length("paper width", width.into())?;
        Ok(self)
    }

    /// Set the paper height (inches or a unit string); must be positive
    pub fn paper_height(mut self, height: impl Into<Length>) -> Result<Self> {
        self.options.paper_height = positive_length("paper height", height.into())?;
        Ok(self)
    }

    /// Use a named paper format, replacing any explicit width and height
    pub fn paper_format(mut self, format: PaperFormat) -> Self {
        let (width, height) = format.dimensions();
        self.options.paper_width = width;
        self.options.paper_height = height;
        self
    }

    pub fn margin_top(mut self, margin: impl Into<Length>) -> Result<Self> {
        self.options.margin_top = margin_length("top", margin.into())?;
        Ok(self)
    }

    pub fn margin_bottom(mut self, margin: impl Into<Length>) -> Result<Self> {
        self.options.margin_bottom = margin_length("bottom", margin.into())?;
        Ok(self)
    }

    pub fn margin_left(mut self, margin: impl Into<Length>) -> Result<Self> {
        self.options.margin_left = margin_length("left", margin.into())?;
        Ok(self)
    }

    pub fn margin_right(mut self, margin: impl Into<Length>) -> Result<Self> {
        self.options.margin_right = margin_length("right", margin.into())?;
        Ok(self)
    }

    /// Set all four margins to the same value
    pub fn margins(mut self, margin: impl Into<Length>) -> Result<Self> {
        let inches = margin_length("all", margin.into())?;
        self.options.margin_top = inches;
        self.options.margin_bottom = inches;
        self.options.margin_left = inches;
        self.options.margin_right = inches;
        Ok(self)
    }

    /// Restrict printing to a page selection such as `"1-5, 8, 11-13"`.
    ///
    /// An empty string removes the restriction.
    pub fn page_ranges(mut self, ranges: &str) -> Result<Self> {
        self.options.page_ranges = normalize_page_ranges(ranges)?;
        Ok(self)
    }

    /// Build an immutable snapshot of the current settings
    pub fn build(&self) -> PdfOptions {
        self.options.clone()
    }
}

fn positive_length(field: &str, length: Length) -> Result<f64> {
    let inches = length
        .to_inches()
        .map_err(|e| Error::InvalidArgument(format!("{}: {}", field, strip_prefix(&e))))?;
    if inches <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "{} must be positive, got {}",
            field, length
        )));
    }
    Ok(inches)
}

fn margin_length(side: &str, length: Length) -> Result<f64> {
    length
        .to_inches()
        .map_err(|e| Error::InvalidArgument(format!("margin ({}): {}", side, strip_prefix(&e))))
}

fn strip_prefix(err: &Error) -> String {
    match err {
        Error::InvalidArgument(reason) => reason.clone(),
        other => other.to_string(),
    }
}

/// Wire shape accepted when deserializing options.
///
/// Every field is optional; `format` wins over explicit paper dimensions and
/// side margins win over `margin`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PdfOptionsDocument {
    landscape: Option<bool>,
    display_header_footer: Option<bool>,
    print_background: Option<bool>,
    scale: Option<f64>,
    format: Option<PaperFormat>,
    paper_width: Option<Length>,
    paper_height: Option<Length>,
    margin: Option<Length>,
    margin_top: Option<Length>,
    margin_bottom: Option<Length>,
    margin_left: Option<Length>,
    margin_right: Option<Length>,
    page_ranges: Option<String>,
    header_template: Option<String>,
    footer_template: Option<String>,
    prefer_css_page_size: Option<bool>,
}

impl TryFrom<PdfOptionsDocument> for PdfOptions {
    type Error = Error;

    fn try_from(doc: PdfOptionsDocument) -> Result<Self> {
        let mut builder = PdfOptions::builder();

        if let Some(landscape) = doc.landscape {
            builder = builder.landscape(landscape);
        }
        if let Some(display) = doc.display_header_footer {
            builder = builder.display_header_footer(display);
        }
        if let Some(background) = doc.print_background {
            builder = builder.print_background(background);
        }
        if let Some(prefer) = doc.prefer_css_page_size {
            builder = builder.prefer_css_page_size(prefer);
        }
        if let Some(scale) = doc.scale {
            builder = builder.scale(scale)?;
        }
        if let Some(width) = doc.paper_width {
            builder = builder.paper_width(width)?;
        }
        if let Some(height) = doc.paper_height {
            builder = builder.paper_height(height)?;
        }
        if let Some(format) = doc.format {
            builder = builder.paper_format(format);
        }
        if let Some(margin) = doc.margin {
            builder = builder.margins(margin)?;
        }
        if let Some(top) = doc.margin_top {
            builder = builder.margin_top(top)?;
        }
        if let Some(bottom) = doc.margin_bottom {
            builder = builder.margin_bottom(bottom)?;
        }
        if let Some(left) = doc.margin_left {
            builder = builder.margin_left(left)?;
        }
        if let Some(right) = doc.margin_right {
            builder = builder.margin_right(right)?;
        }
        if let Some(ranges) = doc.page_ranges {
            builder = builder.page_ranges(&ranges)?;
        }
        if let Some(header) = doc.header_template {
            builder = builder.header_template(header);
        }
        if let Some(footer) = doc.footer_template {
            builder = builder.footer_template(footer);
        }

        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let options = PdfOptions::default();
        assert!(!options.landscape());
        assert!(!options.display_header_footer());
        assert!(!options.print_background());
        assert_eq!(options.scale(), 1.0);
        assert_eq!((options.paper_width(), options.paper_height()), (8.5, 11.0));
        assert_eq!(options.margin_top(), DEFAULT_MARGIN_INCHES);
        assert_eq!(options.page_ranges(), "");
        assert_eq!(options.header_template(), "");
        assert_eq!(options.footer_template(), "");
        assert!(!options.prefer_css_page_size());
        assert_eq!(PdfOptions::builder().build(), options);
    }

    #[test]
    fn test_scale_round_trips_within_range() {
        for scale in [0.1, 0.25, 0.5, 1.0, 1.333, 1.999, 2.0] {
            let options = PdfOptions::builder().scale(scale).unwrap().build();
            assert_eq!(options.scale(), scale);
        }
    }

    #[test]
    fn test_scale_outside_range_is_rejected() {
        for scale in [0.0, 0.099, 2.001, -1.0, 10.0, f64::NAN, f64::INFINITY] {
            let err = PdfOptions::builder().scale(scale).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert!(err.to_string().contains("out of range"), "{}", err);
        }
    }

    #[test]
    fn test_paper_dimensions_must_be_positive() {
        assert!(PdfOptions::builder().paper_width(0.0).is_err());
        assert!(PdfOptions::builder().paper_height(-2.0).is_err());
        assert!(PdfOptions::builder().paper_width("0cm").is_err());

        let options = PdfOptions::builder()
            .paper_width("21cm")
            .unwrap()
            .paper_height(11.0)
            .unwrap()
            .build();
        assert!((options.paper_width() - 8.267).abs() < 0.001);
        assert_eq!(options.paper_height(), 11.0);
    }

    #[test]
    fn test_paper_format_overwrites_explicit_size() {
        let options = PdfOptions::builder()
            .paper_width(3.0)
            .unwrap()
            .paper_height(4.0)
            .unwrap()
            .paper_format(PaperFormat::A4)
            .build();
        assert_eq!((options.paper_width(), options.paper_height()), (8.27, 11.7));
    }

    #[test]
    fn test_margins_accept_numbers_and_unit_strings() {
        let options = PdfOptions::builder()
            .margins("96px")
            .unwrap()
            .margin_left(0.25)
            .unwrap()
            .margin_right("2.54 cm")
            .unwrap()
            .build();
        assert_eq!(options.margin_top(), 1.0);
        assert_eq!(options.margin_bottom(), 1.0);
        assert_eq!(options.margin_left(), 0.25);
        assert!((options.margin_right() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_invalid_margins_are_rejected() {
        assert!(PdfOptions::builder().margin_top(-0.1).is_err());
        assert!(PdfOptions::builder().margin_bottom("1").is_err());
        assert!(PdfOptions::builder().margins("-3mm").is_err());
        let err = PdfOptions::builder().margin_left("1pt").unwrap_err();
        assert!(err.to_string().contains("margin (left)"), "{}", err);
    }

    #[test]
    fn test_page_ranges_are_validated_and_normalized() {
        let options = PdfOptions::builder()
            .page_ranges("1-5, 8, 11-13")
            .unwrap()
            .build();
        assert_eq!(options.page_ranges(), "1-5,8,11-13");
        assert!(PdfOptions::builder().page_ranges("5-3").is_err());
        assert_eq!(
            PdfOptions::builder().page_ranges("").unwrap().build().page_ranges(),
            ""
        );
    }

    #[test]
    fn test_builder_reuse_produces_independent_snapshots() {
        let builder = PdfOptions::builder().landscape(true).scale(0.5).unwrap();
        let first = builder.build();

        let builder = builder.landscape(false).scale(1.5).unwrap().header_template("<b/>");
        let second = builder.build();

        assert!(first.landscape());
        assert_eq!(first.scale(), 0.5);
        assert_eq!(first.header_template(), "");
        assert!(!second.landscape());
        assert_eq!(second.scale(), 1.5);
        assert_eq!(second.header_template(), "<b/>");
    }

    #[test]
    fn test_deserialize_applies_validation() {
        let options: PdfOptions = serde_json::from_str(
            r#"{"landscape": true, "format": "A4", "margin": "1cm", "marginTop": 0.5, "pageRanges": "2-3"}"#,
        )
        .unwrap();
        assert!(options.landscape());
        assert_eq!(options.paper_width(), 8.27);
        assert_eq!(options.margin_top(), 0.5);
        assert!((options.margin_left() - 0.3937).abs() < 0.001);
        assert_eq!(options.page_ranges(), "2-3");

        assert!(serde_json::from_str::<PdfOptions>(r#"{"scale": 3.0}"#).is_err());
        assert!(serde_json::from_str::<PdfOptions>(r#"{"pageRanges": "0"}"#).is_err());
        assert!(serde_json::from_str::<PdfOptions>(r#"{"bogus": 1}"#).is_err());
    }

    #[test]
    fn test_serialize_then_deserialize_is_identity() {
        let options = PdfOptions::builder()
            .print_background(true)
            .footer_template("<span class='pageNumber'></span>")
            .prefer_css_page_size(true)
            .build();
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"preferCssPageSize\":true"), "{}", json);
        let back: PdfOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
