//! Displayed-price parsing and the derived discount metric.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::ScraperError;

/// Converts a displayed price such as `"$12.34"` to a [`Decimal`].
///
/// Accepts an optional leading `$` and surrounding whitespace. The remainder
/// must be plain digits with at most one `.`; thousands separators, signs,
/// and exponents are rejected.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedPrice`] if the text is not a valid price.
pub fn parse_price(raw: &str) -> Result<Decimal, ScraperError> {
    let malformed = || ScraperError::MalformedPrice {
        raw: raw.to_owned(),
    };

    let trimmed = raw.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();

    let has_digit = amount.bytes().any(|b| b.is_ascii_digit());
    let only_digits_and_dot = amount.bytes().all(|b| b.is_ascii_digit() || b == b'.');
    let dot_count = amount.bytes().filter(|&b| b == b'.').count();
    if !has_digit || !only_digits_and_dot || dot_count > 1 {
        return Err(malformed());
    }

    Decimal::from_str(amount).map_err(|_| malformed())
}

/// Strips a leading caption such as `"was"` or `"non club price"` (ASCII
/// case-insensitive) before parsing the price that follows it.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedPrice`] if what remains is not a price.
pub(crate) fn parse_labelled_price(raw: &str, label: &str) -> Result<Decimal, ScraperError> {
    let trimmed = raw.trim();
    let unlabelled = match trimmed.get(..label.len()) {
        Some(head) if !label.is_empty() && head.eq_ignore_ascii_case(label) => {
            &trimmed[label.len()..]
        }
        _ => trimmed,
    };
    parse_price(unlabelled).map_err(|_| ScraperError::MalformedPrice {
        raw: raw.to_owned(),
    })
}

/// `100 * (1 - sale / regular)` in double precision.
///
/// Returns `None` when `regular` is zero.
#[must_use]
pub fn discount_percentage(sale: Decimal, regular: Decimal) -> Option<f64> {
    if regular.is_zero() {
        return None;
    }
    let sale = sale.to_f64()?;
    let regular = regular.to_f64()?;
    Some(100.0 * (1.0 - sale / regular))
}
