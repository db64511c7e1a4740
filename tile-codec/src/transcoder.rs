//! RFC 4648 Base64 with `=` padding and no line wrapping.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::TileCodecResult;

#[must_use]
pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes canonical, padded Base64. Any character outside the alphabet fails, whitespace included.
pub fn base64_decode(text: &str) -> TileCodecResult<Vec<u8>> {
    Ok(STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::TileCodecError;

    #[rstest]
    #[case(b"", "")]
    #[case(b"f", "Zg==")]
    #[case(b"fo", "Zm8=")]
    #[case(b"foo", "Zm9v")]
    #[case(b"foob", "Zm9vYg==")]
    #[case(b"fooba", "Zm9vYmE=")]
    #[case(b"foobar", "Zm9vYmFy")]
    fn rfc4648_vectors(#[case] bytes: &[u8], #[case] text: &str) {
        assert_eq!(base64_encode(bytes), text);
        assert_eq!(base64_decode(text).unwrap(), bytes);
    }

    #[test]
    fn binary_roundtrip() {
        let bytes: Vec<u8> = (0..=255).collect();
        let text = base64_encode(&bytes);
        assert!(text.contains('+') || text.contains('/'));
        assert_eq!(base64_decode(&text).unwrap(), bytes);
    }

    #[rstest]
    #[case::bad_char("Zm9v!")]
    #[case::url_safe_alphabet("-_8=")]
    #[case::missing_padding("Zg")]
    #[case::excess_padding("Zg===")]
    #[case::inner_whitespace("Zm9v Yg==")]
    fn malformed_input(#[case] text: &str) {
        assert!(matches!(
            base64_decode(text),
            Err(TileCodecError::Base64(_))
        ));
    }
}
