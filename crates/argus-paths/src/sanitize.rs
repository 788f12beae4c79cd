//! Component sanitization.
//!
//! Path components may carry arbitrary caller-supplied text (artifact
//! names, uploaded file names, registry keys). Before a component is used
//! as a physical path segment every byte that could be interpreted by a
//! filesystem is hex-escaped as `%xx` (lowercase hex). The `/` separators
//! inserted by the addressing layer itself are never escaped -- only the
//! bytes inside a single component.
//!
//! Escaping is reversible: [`unsanitize_component`] restores the original
//! text exactly.

/// Bytes that must never appear literally in a physical path segment.
fn should_escape(b: u8) -> bool {
    b < 0x20
        || b == 0x7f
        || matches!(
            b,
            b'/' | b'\\' | b':' | b'*' | b'?' | b'"' | b'\'' | b'<' | b'>' | b'|' | b'%'
        )
}

/// Device names reserved by Windows; a component equal to one of these
/// (case-insensitively) is not usable as a file name.
fn is_reserved_device_name(component: &str) -> bool {
    let upper = component.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            if let Some(digit) = upper.strip_prefix("COM").or_else(|| upper.strip_prefix("LPT")) {
                digit.len() == 1 && digit.as_bytes()[0].is_ascii_digit()
            } else {
                false
            }
        }
    }
}

/// Escape a single path component for safe use as a physical path segment.
///
/// - unsafe bytes become `%xx` (lowercase hex, so an escape is never
///   confused with the uppercase reserved-name marker below);
/// - `.` and `..` are escaped entirely to block traversal;
/// - Windows reserved device names are prefixed with a bare `%`;
/// - an empty component becomes a bare `%` so it stays addressable.
pub fn sanitize_component(component: &str) -> String {
    if component.is_empty() {
        return "%".to_string();
    }
    if component == "." || component == ".." {
        return component.bytes().map(|_| "%2e").collect();
    }
    if is_reserved_device_name(component) {
        return format!("%{component}");
    }

    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        if c.is_ascii() && should_escape(c as u8) {
            let b = c as u8;
            out.push('%');
            out.push(char::from_digit((b >> 4) as u32, 16).unwrap());
            out.push(char::from_digit((b & 0xf) as u32, 16).unwrap());
        } else {
            // Non-ASCII characters pass through untouched.
            out.push(c);
        }
    }
    out
}

/// Reverse [`sanitize_component`].
///
/// A `%` followed by two lowercase hex digits decodes to the escaped
/// byte; a leading `%` followed by a reserved device name strips the
/// marker; any other `%` is literal. Decoded bytes are reassembled into
/// the original UTF-8 text.
pub fn unsanitize_component(component: &str) -> String {
    if component == "%" {
        return String::new();
    }
    if let Some(rest) = component.strip_prefix('%') {
        if is_reserved_device_name(rest) {
            return rest.to_string();
        }
    }

    let bytes = component.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(hi), Some(lo)) = (lower_hex(bytes.get(i + 1)), lower_hex(bytes.get(i + 2)))
            {
                out.push((hi << 4) | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn lower_hex(b: Option<&u8>) -> Option<u8> {
    match b {
        Some(b @ b'0'..=b'9') => Some(b - b'0'),
        Some(b @ b'a'..=b'f') => Some(b - b'a' + 10),
        _ => None,
    }
}
