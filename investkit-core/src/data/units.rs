//! Locale-aware number parsing.
//!
//! The Spanish-locale pages print numbers with a decimal comma and `.`
//! thousands separators (`1.234,56`), and abbreviate large figures with a
//! trailing `K`, `M` or `B` (`12,5K`, `1,2M`, `3B`).

use super::provider::DataError;

/// Magnitude suffix of an abbreviated figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSuffix {
    None,
    Kilo,
    Mega,
    Giga,
}

impl UnitSuffix {
    pub fn multiplier(self) -> f64 {
        match self {
            UnitSuffix::None => 1.0,
            UnitSuffix::Kilo => 1e3,
            UnitSuffix::Mega => 1e6,
            UnitSuffix::Giga => 1e9,
        }
    }

    /// Split the suffix off the end of `text`. Only the last character is
    /// inspected; a `K` anywhere else is left in the number and fails to
    /// parse.
    pub fn split(text: &str) -> (UnitSuffix, &str) {
        let text = text.trim();
        let suffix = match text.chars().last() {
            Some('K') => UnitSuffix::Kilo,
            Some('M') => UnitSuffix::Mega,
            Some('B') => UnitSuffix::Giga,
            _ => return (UnitSuffix::None, text),
        };
        (suffix, text[..text.len() - 1].trim_end())
    }
}

/// Parse a decimal-comma number such as `1.234,56` or `-0,75`.
pub fn parse_decimal(text: &str) -> Result<f64, DataError> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned
        .parse::<f64>()
        .map_err(|_| DataError::ParseFailure(format!("not a number: '{}'", text.trim())))
}

/// True for the cell contents the site shows instead of a missing figure.
pub fn is_placeholder(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.chars().all(|c| c == '-') || t.eq_ignore_ascii_case("n/a")
}

/// Parse an abbreviated figure into an integer.
///
/// `Ok(None)` for placeholders, `Ok(Some(n))` for a valid figure (an
/// unsuffixed figure is taken at face value), `Err` for anything else.
pub fn parse_scaled(text: &str) -> Result<Option<u64>, DataError> {
    if is_placeholder(text) {
        return Ok(None);
    }

    let (suffix, number) = UnitSuffix::split(text);
    let value = parse_decimal(number)? * suffix.multiplier();

    if !value.is_finite() || value < 0.0 {
        return Err(DataError::ParseFailure(format!(
            "not a non-negative figure: '{}'",
            text.trim()
        )));
    }

    // 1,2 * 1e6 is not exactly representable; round rather than truncate.
    let rounded = value.round();
    // `u64::MAX as f64` rounds up to 2^64, which no longer fits.
    if rounded >= u64::MAX as f64 {
        return Err(DataError::ParseFailure(format!(
            "figure out of range: '{}'",
            text.trim()
        )));
    }
    Ok(Some(rounded as u64))
}
