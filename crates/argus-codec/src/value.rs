//! Reversible textual encoding of typed field values.
//!
//! Every cell in a typed table is one of the [`FieldValue`] kinds,
//! rendered to text so that the original kind can be recovered from the
//! text alone. Strings whose text could be mistaken for another encoding
//! (a numeric literal, a JSON composite, a `base64:` blob, ...) are
//! protected with exactly one leading space, which the decoder strips
//! and never re-interprets.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

/// Matches integer and float literals, including exponent forms.
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").unwrap());

/// A typed table cell.
#[derive(Clone, Debug)]
pub enum FieldValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
    Text(String),
    /// Arbitrary composite (map/array) value, JSON-serialized.
    Composite(serde_json::Value),
}

impl PartialEq for FieldValue {
    /// Structural equality, except that signed and unsigned integers
    /// compare by numeric value: the decoder returns the signed kind for
    /// any literal that fits, so `UInt(5)` must round-trip equal.
    fn eq(&self, other: &Self) -> bool {
        use FieldValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (UInt(a), UInt(b)) => a == b,
            (Int(a), UInt(b)) | (UInt(b), Int(a)) => *a >= 0 && *a as u64 == *b,
            (Float(a), Float(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Composite(a), Composite(b)) => a == b,
            _ => false,
        }
    }
}

/// Returns `true` if a plain string with this text would be mistaken for
/// one of the other field encodings and therefore needs the one-space
/// protection prefix.
fn needs_protection(text: &str) -> bool {
    text.starts_with(' ')
        || text.starts_with('{')
        || text.starts_with('[')
        || text.starts_with("true")
        || text.starts_with("false")
        || text.starts_with("+Inf")
        || text.starts_with("-Inf")
        || text.starts_with("NaN")
        || text.starts_with("base64:")
        || NUMBER_PATTERN.is_match(text)
        || DateTime::parse_from_rfc3339(text).is_ok()
}

/// Encode one field value to its textual cell form.
///
/// Known limitation, preserved from the original system: a composite
/// value whose JSON form does not start with `{` or `[` (e.g. a bare
/// top-level string) is emitted as an empty field and will not
/// round-trip. Callers that depend on the empty-field fallback exist.
pub fn encode_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(v) => v.to_string(),
        FieldValue::UInt(v) => v.to_string(),
        FieldValue::Float(v) => encode_float(*v),
        FieldValue::Bool(v) => v.to_string(),
        FieldValue::Timestamp(v) => v.to_rfc3339_opts(SecondsFormat::Nanos, true),
        FieldValue::Bytes(v) => format!("base64:{}", BASE64.encode(v)),
        FieldValue::Text(v) => {
            if needs_protection(v) {
                format!(" {v}")
            } else {
                v.clone()
            }
        }
        FieldValue::Composite(v) => {
            let json = v.to_string();
            if json.starts_with('{') || json.starts_with('[') {
                json
            } else {
                String::new()
            }
        }
    }
}

fn encode_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    let text = v.to_string();
    if text.contains('.') {
        text
    } else {
        // Keep float literals distinguishable from integers.
        format!("{text}.0")
    }
}

/// Decode one textual cell back into a field value.
///
/// Priority order: `base64:` blob, space-protected string (returned
/// verbatim, never re-interpreted), JSON composite, numeric literal
/// (signed, then unsigned, then float), boolean, signed infinity,
/// timestamp, plain string.
pub fn decode_field(text: &str) -> FieldValue {
    if let Some(encoded) = text.strip_prefix("base64:") {
        if let Ok(bytes) = BASE64.decode(encoded) {
            return FieldValue::Bytes(bytes);
        }
        return FieldValue::Text(text.to_string());
    }

    if let Some(protected) = text.strip_prefix(' ') {
        return FieldValue::Text(protected.to_string());
    }

    if text.starts_with('{') || text.starts_with('[') {
        if let Ok(value) = serde_json::from_str(text) {
            return FieldValue::Composite(value);
        }
        return FieldValue::Text(text.to_string());
    }

    if NUMBER_PATTERN.is_match(text) {
        if let Ok(v) = text.parse::<i64>() {
            return FieldValue::Int(v);
        }
        if let Ok(v) = text.parse::<u64>() {
            return FieldValue::UInt(v);
        }
        if let Ok(v) = text.parse::<f64>() {
            return FieldValue::Float(v);
        }
    }

    match text {
        "true" => return FieldValue::Bool(true),
        "false" => return FieldValue::Bool(false),
        "+Inf" => return FieldValue::Float(f64::INFINITY),
        "-Inf" => return FieldValue::Float(f64::NEG_INFINITY),
        "NaN" => return FieldValue::Float(f64::NAN),
        _ => {}
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return FieldValue::Timestamp(ts.with_timezone(&Utc));
    }

    FieldValue::Text(text.to_string())
}
