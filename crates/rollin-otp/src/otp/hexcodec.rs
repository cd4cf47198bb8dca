//! Hex secret decoding.
//!
//! Secrets copied out of provisioning pages come decorated in all sorts of
//! ways (`31:32:33`, `0x31 0x32`, `3132-3334`), so separators and `0x`
//! prefixes are stripped before the pairs are decoded.

use zeroize::Zeroizing;

use crate::otp::buffer::SecretBuffer;
use crate::otp::types::{OtpError, OtpErrorKind};

/// Hex encoder / tolerant decoder.
pub struct HexCodec;

impl HexCodec {
    /// Upper-case hex, two characters per byte.
    pub fn encode(bytes: &[u8]) -> String {
        ::hex::encode_upper(bytes)
    }

    /// Decode a (possibly decorated) hex string into a secret buffer.
    ///
    /// An empty string decodes to an empty buffer.
    pub fn decode(encoded: &str) -> Result<SecretBuffer, OtpError> {
        if encoded.is_empty() {
            return Ok(SecretBuffer::new());
        }
        let cleaned = cleanup(encoded);
        if cleaned.len() % 2 != 0 {
            log::debug!("hex input has an odd number ({}) of digits", cleaned.len());
            return Err(OtpError::new(
                OtpErrorKind::InvalidEncoding,
                "Hex input must have an even number of digits",
            )
            .with_detail(format!("got {} digits", cleaned.len())));
        }
        ::hex::decode(cleaned.as_str())
            .map(SecretBuffer::from)
            .map_err(|e| {
                log::debug!("hex decode rejected input: {}", e);
                OtpError::new(OtpErrorKind::InvalidEncoding, "Invalid hex digit")
                    .with_detail(e.to_string())
            })
    }

    /// Check whether `candidate` would decode. An empty string (or one that is
    /// nothing but separators) is not considered encoded.
    pub fn is_hex_encoded(candidate: &str) -> bool {
        let cleaned = cleanup(candidate);
        !cleaned.is_empty()
            && cleaned.len() % 2 == 0
            && cleaned.bytes().all(|c| c.is_ascii_hexdigit())
    }
}

/// Strip spaces, colons, dashes, periods and every `0x` / `0X` prefix.
fn cleanup(input: &str) -> Zeroizing<String> {
    let mut smashed: Zeroizing<String> = Zeroizing::new(
        input
            .chars()
            .filter(|c| !matches!(c, ' ' | ':' | '-' | '.'))
            .collect(),
    );
    // Removing one prefix can expose another ("00xx" -> "0x").
    while let Some(pos) = find_prefix(&smashed) {
        smashed.replace_range(pos..pos + 2, "");
    }
    smashed
}

fn find_prefix(s: &str) -> Option<usize> {
    s.as_bytes()
        .windows(2)
        .position(|w| w[0] == b'0' && (w[1] == b'x' || w[1] == b'X'))
}
