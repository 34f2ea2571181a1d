//! Reply parsing: turn a free-text model reply into a [`ParsedReceipt`].
//!
//! ## Contract
//!
//! 1. **Strict**: the trimmed reply is exactly one JSON object. This is what
//!    the prompt asks for and what well-behaved models return.
//! 2. **Fallback**: models still wrap the object in prose or a ```json
//!    fence now and then, so we take the span from the first `{` to the last
//!    `}` and parse that. A reply with nested objects or two objects side by
//!    side will usually fail here; such replies end up as all-`N/A`.
//!
//! Field values are forgiving: strings are kept verbatim, numbers are
//! stringified, `null`/blank/missing become [`Field::Unknown`].

use crate::error::DocumentError;
use crate::output::{Amount, Field, ParsedReceipt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

static RE_JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Parse a model reply into the four receipt fields.
///
/// # Errors
/// - [`DocumentError::NoStructuredPayload`] if no `{...}` span exists
/// - [`DocumentError::MalformedPayload`] if the span is not a JSON object
pub fn parse_reply(reply: &str) -> Result<ParsedReceipt, DocumentError> {
    let object = find_json_object(reply)?;
    Ok(receipt_from_object(&object))
}

/// Locate and parse the JSON object inside `reply`.
pub fn find_json_object(reply: &str) -> Result<Map<String, Value>, DocumentError> {
    let trimmed = reply.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(map);
    }

    let span = RE_JSON_OBJECT
        .find(trimmed)
        .ok_or(DocumentError::NoStructuredPayload)?;
    debug!("Reply is not bare JSON; parsing embedded span of {} bytes", span.len());

    match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DocumentError::MalformedPayload {
            detail: format!("expected an object, got {}", json_kind(&other)),
        }),
        Err(e) => Err(DocumentError::MalformedPayload {
            detail: e.to_string(),
        }),
    }
}

/// Map the four known keys of `object` into a [`ParsedReceipt`].
pub fn receipt_from_object(object: &Map<String, Value>) -> ParsedReceipt {
    ParsedReceipt {
        amount: object
            .get("total_amount")
            .map(normalize_amount_value)
            .unwrap_or_default(),
        currency: text_field(object.get("currency")),
        transaction_date: text_field(object.get("transaction_date")),
        description: text_field(object.get("descriptive_details")),
    }
}

/// Normalize a textual amount.
///
/// Every character that is not an ASCII digit or `.` is dropped, then the
/// rest is parsed as a float. This tolerates currency symbols and thousands
/// separators (`"$1,234.56"` → `1234.56`) but does no locale detection:
/// decimal-comma formats are expected to have been converted by the model.
pub fn normalize_amount(text: &str) -> Amount {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) => Amount::Value(v),
        Err(_) => Amount::Unknown,
    }
}

fn normalize_amount_value(value: &Value) -> Amount {
    match value {
        Value::String(s) => normalize_amount(s),
        Value::Number(n) => n.as_f64().map(Amount::Value).unwrap_or_default(),
        _ => Amount::Unknown,
    }
}

fn text_field(value: Option<&Value>) -> Field {
    match value {
        Some(Value::String(s)) => Field::from_text(s.as_str()),
        Some(Value::Number(n)) => Field::Text(n.to_string()),
        Some(Value::Bool(b)) => Field::Text(b.to_string()),
        _ => Field::Unknown,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
