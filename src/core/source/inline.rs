//! Inline `data:` URL payloads.

use crate::error::DecodeError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// Standard alphabet, padding optional (browsers are not consistent)
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the base64 payload of an inline image.
///
/// Whitespace and line breaks inside the payload are ignored.
pub fn decode_inline(data: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(DecodeError::Empty);
    }

    LENIENT_STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))
}

/// Encode bytes as a `data:image/<media_type>;base64,` URL
pub fn encode_data_url(media_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:image/{};base64,{}",
        media_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_padded_and_unpadded_payloads() {
        assert_eq!(decode_inline("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_inline("aGVsbG8").unwrap(), b"hello");
    }

    #[test]
    fn ignores_embedded_whitespace() {
        assert_eq!(decode_inline("aGVs\nbG8=\r\n").unwrap(), b"hello");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            decode_inline("not base64 at all!"),
            Err(DecodeError::InvalidBase64(_))
        ));
        assert_eq!(decode_inline("   "), Err(DecodeError::Empty));
    }

    #[test]
    fn data_url_round_trips_through_decoder() {
        let url = encode_data_url("png", &[1, 2, 3, 250]);
        let payload = url.split_once(',').unwrap().1;
        assert_eq!(decode_inline(payload).unwrap(), vec![1, 2, 3, 250]);
    }
}
