// PDF inspection helpers
//
// Just enough structure to sanity-check generated documents: the file
// signature and a count of page objects.

use regex::bytes::Regex;
use std::sync::LazyLock;

/// Every PDF file starts with these bytes.
pub const PDF_SIGNATURE: &[u8] = b"%PDF";

// `/Type /Page` but not `/Type /Pages`.
static PAGE_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u)/Type\s*/Page(?:[^s]|$)").expect("page object pattern is valid")
});

/// Whether `bytes` carries the PDF signature.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_SIGNATURE)
}

/// Number of page objects in an uncompressed object table.
///
/// Pages stored inside compressed object streams are not visible to this
/// scan. Chromium writes page objects uncompressed.
pub fn page_count(bytes: &[u8]) -> usize {
    PAGE_OBJECT_RE.find_iter(bytes).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature() {
        assert!(is_pdf(b"%PDF-1.7\n"));
        assert!(!is_pdf(b"<html>"));
        assert!(!is_pdf(b""));
    }

    #[test]
    fn test_page_count_skips_page_tree() {
        let doc = b"%PDF-1.4\n\
            1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n\
            2 0 obj << /Type /Pages /Kids [3 0 R 4 0 R] /Count 2 >> endobj\n\
            3 0 obj << /Type /Page /Parent 2 0 R >> endobj\n\
            4 0 obj <</Type/Page/Parent 2 0 R>> endobj\n\
            %%EOF";
        assert_eq!(page_count(doc), 2);
        assert_eq!(page_count(b"%PDF-1.4\n%%EOF"), 0);
    }

    #[test]
    fn test_page_count_at_end_of_input() {
        assert_eq!(page_count(b"/Type /Page"), 1);
    }
}
