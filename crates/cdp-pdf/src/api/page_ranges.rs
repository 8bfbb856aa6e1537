// Page-range selection
//
// Grammar: comma-separated tokens, each a positive page number ("8") or an
// inclusive range ("11-13") with start <= end. Whitespace around tokens is
// ignored. An empty selection means "all pages".

use crate::error::{Error, Result};
use std::fmt;

/// One inclusive page range. Single pages have `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn contains(&self, page: u32) -> bool {
        self.start <= page && page <= self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Parses a page-range selection.
///
/// Returns an empty list for blank input.
pub fn parse_page_ranges(input: &str) -> Result<Vec<PageRange>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(',')
        .map(|token| parse_token(token, input))
        .collect()
}

/// Parses and re-renders a selection in canonical form (`"1-5,8,11-13"`).
pub fn normalize_page_ranges(input: &str) -> Result<String> {
    let ranges = parse_page_ranges(input)?;
    Ok(ranges
        .iter()
        .map(PageRange::to_string)
        .collect::<Vec<_>>()
        .join(","))
}

fn parse_token(token: &str, input: &str) -> Result<PageRange> {
    let token = token.trim();
    if token.is_empty() {
        return Err(invalid(input, "empty entry"));
    }

    match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_page_number(start.trim(), input)?;
            let end = parse_page_number(end.trim(), input)?;
            if start > end {
                return Err(invalid(
                    input,
                    &format!("range '{}' starts after it ends", token),
                ));
            }
            Ok(PageRange { start, end })
        }
        None => {
            let page = parse_page_number(token, input)?;
            Ok(PageRange {
                start: page,
                end: page,
            })
        }
    }
}

fn parse_page_number(text: &str, input: &str) -> Result<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(input, &format!("'{}' is not a page number", text)));
    }
    let page: u32 = text
        .parse()
        .map_err(|_| invalid(input, &format!("page number '{}' is too large", text)))?;
    if page == 0 {
        return Err(invalid(input, "page numbers start at 1"));
    }
    Ok(page)
}

fn invalid(input: &str, reason: &str) -> Error {
    Error::InvalidArgument(format!("invalid page ranges '{}': {}", input, reason))
}
