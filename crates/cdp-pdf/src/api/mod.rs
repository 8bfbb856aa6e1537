// Public API types module
//
// Value types that configure a conversion: connection settings, converter
// settings and the validated print options with their helpers.

pub mod connect_options;
pub mod converter_config;
pub mod page_ranges;
pub mod paper_format;
pub mod pdf_options;
pub mod units;

pub use connect_options::ConnectOptions;
pub use converter_config::ConverterConfig;
pub use page_ranges::{PageRange, parse_page_ranges};
pub use paper_format::PaperFormat;
pub use pdf_options::{PdfOptions, PdfOptionsBuilder};
pub use units::{Length, Unit, parse_length};
