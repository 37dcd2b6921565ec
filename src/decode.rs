//! Response decoding helpers.
//!
//! The service may prefix UTF-8 payloads with a byte-order mark. Stripping
//! happens here, independent of the transport layer, so it can be exercised
//! against literal byte sequences.

use serde::de::DeserializeOwned;

use crate::error::{ClientError, Result};

/// UTF-8 byte-order mark.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Strips a leading UTF-8 byte-order mark, if present.
///
/// Payloads without a mark are returned unchanged.
#[must_use]
pub fn strip_bom(payload: &[u8]) -> &[u8] {
    payload.strip_prefix(UTF8_BOM).unwrap_or(payload)
}

/// Decodes a JSON payload, tolerating a leading byte-order mark.
///
/// # Errors
///
/// Returns [`ClientError::Decode`] if the payload is not valid JSON for `T`.
pub fn json_from_slice<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    serde_json::from_slice(strip_bom(payload)).map_err(|e| ClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_strip_bom_with_mark() {
        let payload = b"\xEF\xBB\xBF{\"a\":1}";
        assert_eq!(strip_bom(payload), b"{\"a\":1}");
    }

    #[test]
    fn test_strip_bom_without_mark() {
        let payload = b"{\"a\":1}";
        assert_eq!(strip_bom(payload), b"{\"a\":1}");
    }

    #[test]
    fn test_strip_bom_only_mark() {
        assert_eq!(strip_bom(b"\xEF\xBB\xBF"), b"");
    }

    #[test]
    fn test_strip_bom_empty() {
        assert_eq!(strip_bom(b""), b"");
    }

    #[test]
    fn test_strip_bom_partial_mark_untouched() {
        // A truncated mark is payload, not a mark.
        assert_eq!(strip_bom(b"\xEF\xBB"), b"\xEF\xBB");
    }

    #[test]
    fn test_json_from_slice_with_mark() {
        let value: Value = json_from_slice(b"\xEF\xBB\xBF{\"id\":\"1\"}").unwrap();
        assert_eq!(value["id"], "1");
    }

    #[test]
    fn test_json_from_slice_without_mark() {
        let value: Value = json_from_slice(b"[1,2,3]").unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_json_from_slice_invalid() {
        let result: Result<Value> = json_from_slice(b"not json");
        assert!(matches!(result.unwrap_err(), ClientError::Decode(_)));
    }
}
