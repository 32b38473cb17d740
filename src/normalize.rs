//! Field normalization for role-based duplicate keys.
//!
//! Each normalizer is total: input that cannot be interpreted maps to `None`
//! (the "unknown" sentinel) instead of failing the row. Unknown components
//! make a key incomplete, and incomplete keys never group.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use serde::Serialize;

use crate::{data::Value, roles::ColumnRole};

/// Decimal places kept on amounts before they enter a key.
pub const AMOUNT_SCALE: u32 = 2;

pub(crate) const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹', '₩', '₽', '¢'];

/// A field that could not be normalized for its role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldWarning {
    pub display_row: usize,
    pub column: String,
    pub role: ColumnRole,
    pub raw: String,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} column '{}': cannot read '{}' as {}",
            self.display_row, self.column, self.raw, self.role
        )
    }
}

/// Two-digit years come first: `%Y` would otherwise read `24` as year 24.
/// `%y` maps years below 70 to 20xx.
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d",
    "%Y/%m/%d",
];

const DAY_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M:%S%.f",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Calendar date of a cell, read day-before-month. Time of day is discarded.
///
/// There is no month-first fallback: `"02/13/2024"` is an unknown date, not
/// 13 February.
pub fn normalize_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::DateTime(dt) => Some(dt.date()),
        Value::Text(s) => parse_day_first_date(s),
        Value::Number(_) | Value::Null => None,
    }
}

/// Parses `dd/mm/yyyy` style text (also `-` and `.` separators, two-digit
/// years), ISO `yyyy-mm-dd` or RFC 3339, with an optional trailing time.
/// Separators may not be mixed within one date.
pub fn parse_day_first_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.date_naive());
    }
    DAY_FIRST_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DAY_FIRST_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|parsed| parsed.date())
        })
}

/// Signed amount rounded to [`AMOUNT_SCALE`] places.
pub fn normalize_amount(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(f) if f.is_finite() => Decimal::from_f64(*f),
        Value::Text(s) => parse_amount_text(s),
        _ => None,
    }?;
    Some(
        parsed
            .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .normalize(),
    )
}

/// Reads locale-ambiguous currency text. When a comma is present it is taken
/// as the decimal separator and dots as thousands separators; otherwise commas
/// are thousands separators. `"9,600"` therefore reads as 9.6.
pub fn parse_amount_text(raw: &str) -> Option<Decimal> {
    let stripped = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect::<String>();
    let separated = if stripped.contains(',') {
        stripped.replace('.', "").replace(',', ".")
    } else {
        stripped.replace(',', "")
    };
    let cleaned = separated
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        .collect::<String>();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

/// Canonical identifier text. Empty output means the identifier is missing.
pub fn normalize_identifier(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        Value::Number(f) => f.to_string(),
        Value::Text(s) => canonical_identifier_text(s),
        Value::Date(_) | Value::DateTime(_) => value.as_display(),
    }
}

fn canonical_identifier_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(integral) = integral_text(trimmed) {
        return integral;
    }
    trimmed.to_lowercase()
}

/// `"123"`, `"+123"`, `"00123"` and `"123.000"` all read as `"123"`, the
/// same text a `Number` cell produces.
fn integral_text(value: &str) -> Option<String> {
    let (sign, unsigned) = match value.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", value.strip_prefix('+').unwrap_or(value)),
    };
    let (digits, fraction) = match unsigned.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (unsigned, None),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(fraction) = fraction
        && (fraction.is_empty() || !fraction.chars().all(|c| c == '0'))
    {
        return None;
    }
    let digits = match digits.trim_start_matches('0') {
        "" => return Some("0".to_string()),
        significant => significant,
    };
    Some(format!("{sign}{digits}"))
}
