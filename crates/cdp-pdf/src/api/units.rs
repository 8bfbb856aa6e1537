// Length values for PDF geometry
//
// Margins and paper dimensions travel to the browser in inches. Callers may
// supply either a plain number of inches or a unit-suffixed string such as
// "1cm", "12.5 mm", "96px" or "0.5in".

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(?:\d+(?:\.\d*)?|\.\d+))\s*([A-Za-z]*)$").expect("length regex is valid")
});

/// Supported length units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Inch,
    Centimeter,
    Millimeter,
    Pixel,
}

impl Unit {
    /// Parses a unit suffix (`in`, `cm`, `mm`, `px`), case-insensitively.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "in" => Some(Unit::Inch),
            "cm" => Some(Unit::Centimeter),
            "mm" => Some(Unit::Millimeter),
            "px" => Some(Unit::Pixel),
            _ => None,
        }
    }

    /// Converts a magnitude in this unit to inches.
    pub fn to_inches(self, value: f64) -> f64 {
        match self {
            Unit::Inch => value,
            Unit::Centimeter => value / 2.54,
            Unit::Millimeter => value / 25.4,
            Unit::Pixel => value / 96.0,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Inch => "in",
            Unit::Centimeter => "cm",
            Unit::Millimeter => "mm",
            Unit::Pixel => "px",
        }
    }
}

/// A length given either in inches or as a unit-suffixed string.
///
/// # Example
///
/// ```ignore
/// use cdp_pdf::Length;
///
/// assert_eq!(Length::from(0.5).to_inches()?, 0.5);
/// assert_eq!(Length::from("96px").to_inches()?, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    /// A plain number of inches
    Inches(f64),
    /// A `<number><unit>` string
    Text(String),
}

impl Length {
    /// Resolves the length to inches, rejecting negative or malformed values.
    pub fn to_inches(&self) -> Result<f64> {
        match self {
            Length::Inches(value) => {
                if !value.is_finite() {
                    return Err(Error::InvalidArgument(format!(
                        "length must be a finite number, got {}",
                        value
                    )));
                }
                if *value < 0.0 {
                    return Err(Error::InvalidArgument(format!(
                        "length must be non-negative, got {}",
                        value
                    )));
                }
                Ok(*value)
            }
            Length::Text(text) => parse_length(text),
        }
    }
}

impl From<f64> for Length {
    fn from(value: f64) -> Self {
        Length::Inches(value)
    }
}

impl From<f32> for Length {
    fn from(value: f32) -> Self {
        Length::Inches(f64::from(value))
    }
}

impl From<u32> for Length {
    fn from(value: u32) -> Self {
        Length::Inches(f64::from(value))
    }
}

impl From<&str> for Length {
    fn from(value: &str) -> Self {
        Length::Text(value.to_string())
    }
}

impl From<String> for Length {
    fn from(value: String) -> Self {
        Length::Text(value)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Inches(value) => write!(f, "{}in", value),
            Length::Text(text) => f.write_str(text),
        }
    }
}

/// Parses a unit-suffixed length string into inches.
///
/// Whitespace is allowed around the value and between the number and the
/// unit. A unit is mandatory.
pub fn parse_length(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument(
            "length must not be empty (expected e.g. \"1cm\", \"0.5in\", \"10mm\" or \"96px\")"
                .to_string(),
        ));
    }

    let captures = LENGTH_RE.captures(trimmed).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "malformed length '{}' (expected <number><unit> with unit cm, in, mm or px)",
            text
        ))
    })?;

    let number = &captures[1];
    let suffix = &captures[2];

    if suffix.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "length '{}' is missing a unit (expected cm, in, mm or px)",
            text
        )));
    }

    let unit = Unit::from_suffix(suffix).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "unknown unit '{}' in length '{}' (expected cm, in, mm or px)",
            suffix, text
        ))
    })?;

    let value: f64 = number.parse().map_err(|_| {
        Error::InvalidArgument(format!("malformed number '{}' in length '{}'", number, text))
    })?;

    if value < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "length must be non-negative, got '{}'",
            text
        )));
    }

    Ok(unit.to_inches(value))
}
