//! Binary payload embedding
//!
//! Payloads are stored as RFC 2397 data URLs:
//! `data:<mime type>;base64,<standard base64 with padding>`.
//! The MIME type is kept verbatim, parameters included, so decoding always
//! returns exactly what was encoded.

use crate::error::CodecError;
use base64::{engine::general_purpose::STANDARD, Engine as _};

const PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

/// A payload recovered from its textual form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub byte_length: usize,
}

/// Encode raw bytes and their MIME type into a data URL
pub fn encode(bytes: &[u8], mime_type: &str) -> String {
    let body = STANDARD.encode(bytes);
    let mut out = String::with_capacity(
        PREFIX.len() + mime_type.len() + BASE64_MARKER.len() + 1 + body.len(),
    );
    out.push_str(PREFIX);
    out.push_str(mime_type);
    out.push_str(BASE64_MARKER);
    out.push(',');
    out.push_str(&body);
    out
}

/// Decode a data URL produced by [`encode`]
pub fn decode(text: &str) -> Result<DecodedPayload, CodecError> {
    let rest = text.strip_prefix(PREFIX).ok_or(CodecError::MissingPrefix)?;

    // The base64 alphabet has no commas, so the last one is the separator
    let (header, body) = rest
        .rsplit_once(',')
        .ok_or(CodecError::MissingBase64Marker)?;
    let mime_type = header
        .strip_suffix(BASE64_MARKER)
        .ok_or(CodecError::MissingBase64Marker)?;

    let bytes = STANDARD.decode(body)?;
    let byte_length = bytes.len();

    Ok(DecodedPayload {
        bytes,
        mime_type: mime_type.to_string(),
        byte_length,
    })
}

/// Read only the MIME type of an encoded payload without decoding the body
pub fn peek_mime_type(text: &str) -> Result<&str, CodecError> {
    let rest = text.strip_prefix(PREFIX).ok_or(CodecError::MissingPrefix)?;
    let (header, _) = rest
        .rsplit_once(',')
        .ok_or(CodecError::MissingBase64Marker)?;
    header
        .strip_suffix(BASE64_MARKER)
        .ok_or(CodecError::MissingBase64Marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(bytes: &[u8], mime: &str) {
        let decoded = decode(&encode(bytes, mime)).unwrap();
        assert_eq!(decoded.bytes, bytes);
        assert_eq!(decoded.mime_type, mime);
        assert_eq!(decoded.byte_length, bytes.len());
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(encode(&[], "image/png"), "data:image/png;base64,");
        roundtrip(&[], "image/png");
    }

    #[test]
    fn test_single_byte() {
        roundtrip(&[0x7f], "audio/mpeg");
    }

    #[test]
    fn test_every_byte_value() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        roundtrip(&bytes, "application/octet-stream");
    }

    #[test]
    fn test_large_payload() {
        let bytes: Vec<u8> = (0..(3 * 1024 * 1024 + 7)).map(|i| (i * 31 % 251) as u8).collect();
        roundtrip(&bytes, "image/jpeg");
    }

    #[test]
    fn test_mime_with_parameters_and_commas() {
        roundtrip(b"ogg", "audio/ogg; codecs=opus");
        roundtrip(b"odd", "x/y,z");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(encode(b"abc", "text/plain"), encode(b"abc", "text/plain"));
        assert_eq!(encode(b"abc", "text/plain"), "data:text/plain;base64,YWJj");
    }

    #[test]
    fn test_missing_prefix() {
        assert!(matches!(decode("image/png;base64,AAAA"), Err(CodecError::MissingPrefix)));
    }

    #[test]
    fn test_missing_marker() {
        assert!(matches!(
            decode("data:image/png,AAAA"),
            Err(CodecError::MissingBase64Marker)
        ));
        assert!(matches!(
            decode("data:image/png;base64"),
            Err(CodecError::MissingBase64Marker)
        ));
    }

    #[test]
    fn test_malformed_alphabet() {
        assert!(matches!(
            decode("data:image/png;base64,@@@@"),
            Err(CodecError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_peek_mime_type() {
        let encoded = encode(b"\x89PNG", "image/png");
        assert_eq!(peek_mime_type(&encoded).unwrap(), "image/png");
    }
}
