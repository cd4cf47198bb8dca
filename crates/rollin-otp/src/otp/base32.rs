//! RFC 4648 Base32 (alphabet `A–Z2–7`, `=` padding).
//!
//! Decoding is strict: the input must be a whole number of 8-character
//! blocks, each block is decoded on its own, and any character outside the
//! alphabet (including lower case) fails the whole call.

use crate::otp::buffer::SecretBuffer;
use crate::otp::types::{OtpError, OtpErrorKind};

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const PAD: u8 = b'=';
const BLOCK_CHARS: usize = 8;

/// Base32 encoder / decoder.
pub struct Base32Codec;

impl Base32Codec {
    /// Encode bytes as padded Base32. Empty input gives an empty string.
    pub fn encode(bytes: &[u8]) -> String {
        ::base32::encode(::base32::Alphabet::Rfc4648 { padding: true }, bytes)
    }

    /// Decode a padded Base32 string into a secret buffer.
    ///
    /// An empty string decodes to an empty buffer.
    pub fn decode(encoded: &str) -> Result<SecretBuffer, OtpError> {
        let input = encoded.as_bytes();
        let mut result = SecretBuffer::new();
        if input.is_empty() {
            return Ok(result);
        }
        if input.len() % BLOCK_CHARS != 0 {
            log::debug!(
                "base32 input of {} chars is not a multiple of {}",
                input.len(),
                BLOCK_CHARS
            );
            return Err(OtpError::new(
                OtpErrorKind::InvalidEncoding,
                "Base32 input length must be a multiple of 8",
            )
            .with_detail(format!("got {} characters", input.len())));
        }

        // Room for every decoded byte, so the appends below never reallocate.
        result.set_extra_allocation(input.len() / BLOCK_CHARS * 5);

        for (index, block) in input.chunks(BLOCK_CHARS).enumerate() {
            if !decode_block(block, |b| result.push(b)) {
                log::debug!("base32 block {} failed to decode", index);
                return Err(OtpError::new(
                    OtpErrorKind::InvalidEncoding,
                    "Invalid base-32 block",
                )
                .with_detail(format!("block {}", index)));
            }
        }
        Ok(result)
    }

    /// Check whether `candidate` would decode, without producing output.
    /// An empty string is not considered encoded.
    pub fn is_base32_encoded(candidate: &str) -> bool {
        let input = candidate.as_bytes();
        if input.is_empty() || input.len() % BLOCK_CHARS != 0 {
            return false;
        }
        input.chunks(BLOCK_CHARS).all(|block| decode_block(block, |_| {}))
    }
}

/// Map one character to its 5-bit value.
fn decode_char(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'2'..=b'7' => Some(c - b'2' + 26),
        _ => None,
    }
}

/// Decode one 8-character block, feeding each produced byte to `sink`.
///
/// A `=` at position 2, 4, 5 or 7 ends the corresponding output byte; every
/// character a produced byte depends on must be in the alphabet.
fn decode_block(block: &[u8], mut sink: impl FnMut(u8)) -> bool {
    if block.len() != BLOCK_CHARS {
        return false;
    }
    if !block.iter().all(|&c| c == PAD || decode_char(c).is_some()) {
        return false;
    }
    let v = |i: usize| decode_char(block[i]);

    // 1st byte: 5 bits of char 0, 3 bits of char 1.
    let (Some(c0), Some(c1)) = (v(0), v(1)) else {
        return false;
    };
    sink((c0 << 3) | (c1 >> 2));

    // 2nd byte: 2 bits of char 1, 5 of char 2, 1 of char 3.
    if block[2] != PAD {
        let (Some(c2), Some(c3)) = (v(2), v(3)) else {
            return false;
        };
        sink((c1 << 6) | (c2 << 1) | (c3 >> 4));
    }

    // 3rd byte: 4 bits of char 3, 4 of char 4.
    if block[4] != PAD {
        let (Some(c3), Some(c4)) = (v(3), v(4)) else {
            return false;
        };
        sink((c3 << 4) | (c4 >> 1));
    }

    // 4th byte: 1 bit of char 4, 5 of char 5, 2 of char 6.
    if block[5] != PAD {
        let (Some(c4), Some(c5), Some(c6)) = (v(4), v(5), v(6)) else {
            return false;
        };
        sink((c4 << 7) | (c5 << 2) | (c6 >> 3));
    }

    // 5th byte: 3 bits of char 6, 5 of char 7.
    if block[7] != PAD {
        let (Some(c6), Some(c7)) = (v(6), v(7)) else {
            return false;
        };
        sink((c6 << 5) | c7);
    }
    true
}
