//! Heuristic JSON/legacy-binary discrimination for the PCARS port.
//!
//! This is a probabilistic guess, not a protocol-conformant discriminator:
//! a binary packet that happens to start with `{` followed by mostly
//! printable bytes will be classified as JSON and then fail to parse.

use serde::Serialize;

use super::layout;
use crate::protocols::common::reader::is_printable_or_newline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    Json,
    LegacyBinary,
}

/// Classify a PCARS payload.
///
/// JSON iff the first byte is `{` and more than 80% of the first
/// `min(len, 50)` bytes are printable ASCII or CR/LF.
///
/// # Examples
/// ```
/// use telemdash_core::protocols::pcars::{PayloadFormat, classify};
///
/// assert_eq!(classify(br#"{"gear": 3}"#), PayloadFormat::Json);
/// assert_eq!(classify(&[0xe8, 0x03, 0x00, 0x00]), PayloadFormat::LegacyBinary);
/// ```
pub fn classify(payload: &[u8]) -> PayloadFormat {
    if payload.first() != Some(&layout::JSON_OPEN_BRACE) {
        return PayloadFormat::LegacyBinary;
    }
    let sample = &payload[..payload.len().min(layout::CLASSIFY_SAMPLE_LEN)];
    let printable = sample
        .iter()
        .filter(|byte| is_printable_or_newline(**byte))
        .count();
    if printable * layout::JSON_PRINTABLE_DENOMINATOR
        > sample.len() * layout::JSON_PRINTABLE_NUMERATOR
    {
        PayloadFormat::Json
    } else {
        PayloadFormat::LegacyBinary
    }
}

#[cfg(test)]
mod tests {
    use super::{PayloadFormat, classify};

    #[test]
    fn empty_payload_is_binary() {
        assert_eq!(classify(&[]), PayloadFormat::LegacyBinary);
    }

    #[test]
    fn forwarder_document_is_json() {
        let doc = b"{\"speed\": 120.5, \"gear\": 3, \"rpm\": 6000, \"fuel\": 45.2, \"lapTime\": 87.234}\r\n";
        assert_eq!(classify(doc), PayloadFormat::Json);
    }

    #[test]
    fn lone_brace_is_json() {
        assert_eq!(classify(b"{"), PayloadFormat::Json);
    }

    #[test]
    fn printable_text_without_brace_is_binary() {
        assert_eq!(classify(b"speed=120"), PayloadFormat::LegacyBinary);
    }

    #[test]
    fn brace_followed_by_binary_is_binary() {
        let mut payload = vec![b'{'];
        payload.extend_from_slice(&[0x01; 60]);
        assert_eq!(classify(&payload), PayloadFormat::LegacyBinary);
    }

    #[test]
    fn exactly_eighty_percent_is_not_enough() {
        // 10-byte sample with 8 printable bytes: 8 > 8.0 is false.
        let payload = [b'{', b'a', b'b', b'c', b'd', b'e', b'f', b'g', 0x00, 0x00];
        assert_eq!(classify(&payload), PayloadFormat::LegacyBinary);
    }

    #[test]
    fn only_first_fifty_bytes_are_sampled() {
        let mut payload = vec![b'{'];
        payload.extend_from_slice(&[b'a'; 49]);
        payload.extend_from_slice(&[0x00; 200]);
        assert_eq!(classify(&payload), PayloadFormat::Json);
    }
}
