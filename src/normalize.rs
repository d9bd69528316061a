//! Scalar normalization for extended-JSON documents.
//!
//! Allocation documents store numbers, dates and ids either as plain JSON
//! values or as legacy extended-JSON wrappers (`{"$numberInt": "8"}`,
//! `{"$date": {"$numberLong": "1700000000000"}}`, `{"$oid": "..."}`).
//! The raw types keep the wire shape as a tagged union; the functions here
//! resolve it exactly once, and nothing downstream looks at wrapper shapes.
//!
//! Normalization is total. Unrecognized shapes resolve to `0`, "now" or the
//! empty string and are logged at debug level.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A numeric field as it may appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmbiguousNumber {
    Plain(f64),
    Int {
        #[serde(rename = "$numberInt")]
        value: String,
    },
    Long {
        #[serde(rename = "$numberLong")]
        value: String,
    },
    Double {
        #[serde(rename = "$numberDouble")]
        value: String,
    },
    Decimal {
        #[serde(rename = "$numberDecimal")]
        value: String,
    },
    Other(Value),
}

impl From<f64> for AmbiguousNumber {
    fn from(value: f64) -> Self {
        AmbiguousNumber::Plain(value)
    }
}

/// A date field as it may appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmbiguousDate {
    /// RFC 3339 string.
    Plain(DateTime<Utc>),
    /// Epoch milliseconds.
    Millis(f64),
    /// Any other textual form (`YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, ...).
    Text(String),
    Wrapped {
        #[serde(rename = "$date")]
        inner: WrappedDate,
    },
    Other(Value),
}

/// Payload of a `{"$date": ...}` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WrappedDate {
    Long {
        #[serde(rename = "$numberLong")]
        value: String,
    },
    Millis(f64),
    Text(String),
    Other(Value),
}

impl From<DateTime<Utc>> for AmbiguousDate {
    fn from(value: DateTime<Utc>) -> Self {
        AmbiguousDate::Plain(value)
    }
}

/// A document or entity identifier as it may appear on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmbiguousId {
    Plain(String),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Other(Value),
}

impl Default for AmbiguousId {
    fn default() -> Self {
        AmbiguousId::Plain(String::new())
    }
}

impl From<&str> for AmbiguousId {
    fn from(value: &str) -> Self {
        AmbiguousId::Plain(value.to_string())
    }
}

/// Resolve a numeric field. Absent, unparsable or unrecognized values give `0`.
pub fn normalize_number(value: Option<&AmbiguousNumber>) -> f64 {
    let resolved = match value {
        None => return 0.0,
        Some(AmbiguousNumber::Plain(n)) => *n,
        Some(AmbiguousNumber::Int { value }) | Some(AmbiguousNumber::Long { value }) => {
            parse_leading_int(value).map(|n| n as f64).unwrap_or(0.0)
        }
        Some(AmbiguousNumber::Double { value }) | Some(AmbiguousNumber::Decimal { value }) => {
            value.trim().parse::<f64>().unwrap_or(0.0)
        }
        Some(AmbiguousNumber::Other(raw)) => {
            log::debug!("Unrecognized numeric shape, using 0: {}", raw);
            0.0
        }
    };

    if resolved.is_finite() {
        resolved
    } else {
        0.0
    }
}

/// Resolve a date field, falling back to the current time.
///
/// Prefer [`resolve_date`] when the caller can supply a better fallback than
/// "now"; a missing date silently becoming the current instant makes old
/// records look new.
pub fn normalize_date(value: Option<&AmbiguousDate>) -> DateTime<Utc> {
    resolve_date(value).unwrap_or_else(Utc::now)
}

/// Resolve a date field, or `None` when it is absent or unrecognized.
pub fn resolve_date(value: Option<&AmbiguousDate>) -> Option<DateTime<Utc>> {
    match value? {
        AmbiguousDate::Plain(dt) => Some(*dt),
        AmbiguousDate::Millis(ms) => from_millis_f64(*ms),
        AmbiguousDate::Text(text) => parse_date_text(text),
        AmbiguousDate::Wrapped { inner } => match inner {
            WrappedDate::Long { value } => parse_leading_int(value).and_then(from_millis),
            WrappedDate::Millis(ms) => from_millis_f64(*ms),
            WrappedDate::Text(text) => {
                // Some exporters write the millis as a bare digit string.
                if is_millis_text(text) {
                    parse_leading_int(text).and_then(from_millis)
                } else {
                    parse_date_text(text)
                }
            }
            WrappedDate::Other(raw) => {
                log::debug!("Unrecognized $date payload: {}", raw);
                None
            }
        },
        AmbiguousDate::Other(raw) => {
            log::debug!("Unrecognized date shape: {}", raw);
            None
        }
    }
}

/// Resolve an identifier. Absent or unrecognized ids give the empty string.
pub fn normalize_id(value: Option<&AmbiguousId>) -> String {
    match value {
        None => String::new(),
        Some(AmbiguousId::Plain(s)) => s.trim().to_string(),
        Some(AmbiguousId::ObjectId { oid }) => oid.trim().to_string(),
        Some(AmbiguousId::Other(Value::Number(n))) => n.to_string(),
        Some(AmbiguousId::Other(raw)) => {
            log::debug!("Unrecognized id shape: {}", raw);
            String::new()
        }
    }
}

/// Parse the leading integer of a string: optional sign, then digits.
///
/// `"8"` → 8, `" 12h"` → 12, `"8.7"` → 8, `"abc"` → None.
fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Optional leading `-`, then digits only.
fn is_millis_text(text: &str) -> bool {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

fn from_millis_f64(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    from_millis(ms.trunc() as i64)
}

/// Parse the textual date forms seen in stored documents.
fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    log::debug!("Unparsable date text: {:?}", text);
    None
}
