//! Display price text → canonical decimal amount.
//!
//! Merchant pages print prices in many shapes: `"849,000 DT"`,
//! `"1 099,000 DT"` (with a non-breaking space), `"2.499,000"`, `"19.99 €"`.
//! [`normalize_price`] reduces all of them to a single [`Decimal`] and never
//! fails: text with no parseable digits yields zero.
//!
//! ## Separator rules
//!
//! - Both `,` and `.` present: the rightmost one is the decimal separator,
//!   every other separator is a thousands separator and is dropped.
//! - A single separator of one kind: always the decimal separator. This
//!   covers `"19,99"` as well as `"849,000"`, where the three trailing digits
//!   are thousandths of the currency (millimes) rather than a thousands group.
//! - Several separators of one kind: when the last group has exactly three
//!   digits it is the minor-unit group (`"1,099,000"` → `1099.000`),
//!   otherwise every separator is a thousands separator.
//!
//! Amounts above [`MINOR_UNIT_CEILING`] are assumed to be minor units read as
//! whole units and are divided by 1000.

use std::str::FromStr;

use rust_decimal::Decimal;

/// Amounts strictly above this many currency units are scaled down by 1000.
///
/// A genuine price above the ceiling is misread: `"60000"` becomes `60`.
pub const MINOR_UNIT_CEILING: i64 = 50_000;

/// Normalizes a display price into a non-negative decimal amount.
///
/// Returns [`Decimal::ZERO`] when no digits can be parsed.
#[must_use]
pub fn normalize_price(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return Decimal::ZERO;
    }

    let canonical = canonicalize_separators(&cleaned);
    let Ok(mut amount) = Decimal::from_str(&canonical) else {
        tracing::debug!(raw, canonical = %canonical, "price text did not parse as a decimal");
        return Decimal::ZERO;
    };

    if amount > Decimal::from(MINOR_UNIT_CEILING) {
        amount /= Decimal::ONE_THOUSAND;
    }

    amount.normalize().max(Decimal::ZERO)
}

/// Builds the display string for a price found in page metadata, e.g.
/// `content="849.000"` plus `currency="TND"` → `"849.000 TND"`.
#[must_use]
pub fn format_metadata_price(content: &str, currency: Option<&str>) -> String {
    let content = content.trim();
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(currency) => format!("{content} {currency}"),
        None => content.to_string(),
    }
}

/// Rewrites a string of digits, commas and dots into `INT[.FRAC]` form.
fn canonicalize_separators(cleaned: &str) -> String {
    let last_comma = cleaned.rfind(',');
    let last_dot = cleaned.rfind('.');

    let (int_part, frac_part) = match (last_comma, last_dot) {
        (Some(comma), Some(dot)) => {
            let pos = comma.max(dot);
            (&cleaned[..pos], Some(&cleaned[pos + 1..]))
        }
        (Some(_), None) => split_on_single_kind(cleaned, ','),
        (None, Some(_)) => split_on_single_kind(cleaned, '.'),
        (None, None) => (cleaned, None),
    };

    let int_digits: String = int_part.chars().filter(char::is_ascii_digit).collect();
    let frac_digits: String = frac_part
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    let int_digits = if int_digits.is_empty() {
        "0".to_string()
    } else {
        int_digits
    };

    if frac_digits.is_empty() {
        int_digits
    } else {
        format!("{int_digits}.{frac_digits}")
    }
}

/// Splits a string that contains only one kind of separator into integer
/// and fractional parts. See the module docs for the rules.
fn split_on_single_kind(cleaned: &str, sep: char) -> (&str, Option<&str>) {
    let occurrences = cleaned.matches(sep).count();
    let Some(pos) = cleaned.rfind(sep) else {
        return (cleaned, None);
    };

    if occurrences == 1 {
        return (&cleaned[..pos], Some(&cleaned[pos + 1..]));
    }

    let last_group = &cleaned[pos + 1..];
    if last_group.len() == 3 {
        (&cleaned[..pos], Some(last_group))
    } else {
        (cleaned, None)
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
