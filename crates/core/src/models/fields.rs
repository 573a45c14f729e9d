//! Lenient decoding of untyped document fields.
//!
//! Records written by older clients may carry amounts as strings, omit
//! optional fields, or hold garbage. None of that may abort aggregation, so
//! every helper here returns a documented default instead of an error and
//! logs what it recovered from.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use super::collection::RawDocument;
use crate::errors::CoreError;

/// Largest amount a single record may carry. Anything above is treated as
/// malformed, which keeps every sum over a collection far from `Decimal::MAX`.
pub const MAX_AMOUNT: u64 = 1_000_000_000_000_000;

/// Parse a monetary value strictly: finite, non-negative, at most
/// [`MAX_AMOUNT`], number or numeric string.
pub fn parse_amount(field: &str, value: &Value) -> Result<Decimal, CoreError> {
    let shape_error = |message: String| CoreError::DataShape {
        field: field.to_string(),
        message,
    };

    let amount = match value {
        Value::Number(n) => {
            let f = n
                .as_f64()
                .ok_or_else(|| shape_error(format!("{n} is not representable")))?;
            if !f.is_finite() {
                return Err(shape_error(format!("{f} is not finite")));
            }
            Decimal::try_from(f).map_err(|e| shape_error(e.to_string()))?
        }
        Value::String(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| shape_error(format!("'{s}' is not a number")))?
        }
        other => return Err(shape_error(format!("unexpected value {other}"))),
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(shape_error(format!("{amount} is negative")));
    }
    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(shape_error(format!("{amount} exceeds {MAX_AMOUNT}")));
    }
    Ok(amount.normalize())
}

/// Monetary field defaulting to 0 when missing or malformed.
pub fn amount_or_zero(doc: &RawDocument, field: &str) -> Decimal {
    optional_amount(doc, field).unwrap_or(Decimal::ZERO)
}

/// Monetary field that stays unset when missing or malformed.
pub fn optional_amount(doc: &RawDocument, field: &str) -> Option<Decimal> {
    match doc.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => match parse_amount(field, value) {
            Ok(amount) => Some(amount),
            Err(e) => {
                warn!(id = %doc.id, error = %e, "Ignoring malformed amount");
                None
            }
        },
    }
}

/// String field, empty when missing or not a string.
pub fn text(doc: &RawDocument, field: &str) -> String {
    optional_text(doc, field).unwrap_or_default()
}

/// Non-empty string field.
pub fn optional_text(doc: &RawDocument, field: &str) -> Option<String> {
    match doc.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn optional_date(doc: &RawDocument, field: &str) -> Option<NaiveDate> {
    let raw = optional_text(doc, field)?;
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    warn!(id = %doc.id, field, value = raw, "Ignoring malformed date");
    None
}

/// Boolean flag; only an explicit `true` (or "true") counts.
pub fn flag(doc: &RawDocument, field: &str) -> bool {
    match doc.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}
