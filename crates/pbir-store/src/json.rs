//! Tolerant JSON codec for project documents
//!
//! Decoding never fails: anything that is not a readable JSON document comes
//! back as `None`, and callers treat that exactly like a missing document.

use serde_json::Value;

use crate::error::StoreError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decode document bytes into a JSON value
///
/// Returns `None` for missing input, non UTF-8 bytes, or malformed JSON.
/// A leading UTF-8 byte-order mark is ignored.
#[must_use]
pub fn decode_json(bytes: Option<&[u8]>) -> Option<Value> {
    let bytes = bytes?;
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("document is not valid JSON: {}", e);
            None
        }
    }
}

/// Decode and keep only JSON objects
///
/// Every PBIR document is an object at the top level; arrays and scalars are
/// treated as absent.
#[must_use]
pub fn decode_object(bytes: Option<&[u8]>) -> Option<Value> {
    decode_json(bytes).filter(Value::is_object)
}

/// Encode a JSON value as two-space indented bytes
///
/// # Errors
/// Returns error if serialization fails (only possible for non-finite floats
/// smuggled in through custom serializers)
pub fn encode_json(value: &Value) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(value).map_err(StoreError::Encode)
}

/// Read a string at a JSON pointer
#[inline]
#[must_use]
pub fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

/// Strip the single quotes PBIR wraps around literal string values
///
/// `'Sales Chart'` → `Sales Chart`
#[must_use]
pub fn unquote_literal(raw: &str) -> &str {
    raw.trim_matches('\'')
}

/// Wrap a value in PBIR literal quotes
#[must_use]
pub fn quote_literal(raw: &str) -> String {
    format!("'{raw}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_valid() {
        let value = decode_json(Some(br#"{"name": "main"}"#)).unwrap();
        assert_eq!(value["name"], "main");
    }

    #[test]
    fn decode_missing_is_none() {
        assert!(decode_json(None).is_none());
    }

    #[test]
    fn decode_malformed_is_none() {
        assert!(decode_json(Some(b"{\"name\": ")).is_none());
        assert!(decode_json(Some(b"")).is_none());
        assert!(decode_json(Some(&[0xff, 0xfe, 0x00])).is_none());
    }

    #[test]
    fn decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(br#"{"a": 1}"#);
        assert_eq!(decode_json(Some(&bytes)), Some(json!({"a": 1})));
    }

    #[test]
    fn decode_object_rejects_scalars() {
        assert!(decode_object(Some(b"[1, 2]")).is_none());
        assert!(decode_object(Some(b"42")).is_none());
        assert!(decode_object(Some(b"{}")).is_some());
    }

    #[test]
    fn encode_preserves_key_order() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let text = String::from_utf8(encode_json(&value).unwrap()).unwrap();
        let z = text.find("\"z\"").unwrap();
        let a = text.find("\"a\"").unwrap();
        let m = text.find("\"m\"").unwrap();
        assert!(z < a && a < m);
        assert!(text.contains("\n  \"a\": 2"));
    }

    #[test]
    fn literal_quoting() {
        assert_eq!(unquote_literal("'Sales'"), "Sales");
        assert_eq!(unquote_literal("Sales"), "Sales");
        assert_eq!(quote_literal("bk1_p2"), "'bk1_p2'");
    }

    #[test]
    fn str_at_reads_nested() {
        let doc = json!({"explorationState": {"activeSection": "main"}});
        assert_eq!(str_at(&doc, "/explorationState/activeSection"), Some("main"));
        assert_eq!(str_at(&doc, "/explorationState/missing"), None);
    }
}
