//! HOTP (RFC 4226).
//!
//! `calculate` is the plain §5.3 algorithm. `calculate_with` adds the two
//! knobs from the RFC's reference implementation: a Luhn checksum digit
//! appended to the code, and a fixed truncation offset in place of the
//! dynamic one.

use serde::{Deserialize, Serialize};

use crate::otp::hmac;
use crate::otp::types::{validate_digits, Algorithm, OtpError, OtpErrorKind, MIN_DIGITS};

/// Doubled-digit table for the checksum: `2*d` with its digits summed.
const DOUBLE_DIGITS: [u64; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Code shape for [`calculate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotpOptions {
    /// Digits before the optional checksum digit (6 through 8).
    pub digits: u8,
    /// Append a Luhn checksum digit, giving `digits + 1` characters.
    pub add_checksum: bool,
    /// Fixed byte offset into the HMAC. Ignored unless it leaves room for
    /// four bytes (`offset < hmac_len - 4`).
    pub truncation_offset: Option<usize>,
}

impl Default for HotpOptions {
    fn default() -> Self {
        Self {
            digits: MIN_DIGITS,
            add_checksum: false,
            truncation_offset: None,
        }
    }
}

impl HotpOptions {
    pub fn new(digits: u8) -> Self {
        Self {
            digits,
            ..Self::default()
        }
    }

    pub fn with_checksum(mut self) -> Self {
        self.add_checksum = true;
        self
    }

    pub fn with_truncation_offset(mut self, offset: usize) -> Self {
        self.truncation_offset = Some(offset);
        self
    }

    /// Length of the codes these options produce.
    pub fn code_length(&self) -> usize {
        self.digits as usize + usize::from(self.add_checksum)
    }
}

/// HOTP code for `counter`, zero-padded to exactly `digits` characters.
pub fn calculate(
    key: &[u8],
    counter: u64,
    digits: u8,
    algorithm: Algorithm,
) -> Result<String, OtpError> {
    calculate_with(key, counter, &HotpOptions::new(digits), algorithm)
}

/// HOTP code with explicit [`HotpOptions`].
pub fn calculate_with(
    key: &[u8],
    counter: u64,
    options: &HotpOptions,
    algorithm: Algorithm,
) -> Result<String, OtpError> {
    if key.is_empty() {
        return Err(OtpError::new(
            OtpErrorKind::InvalidParameters,
            "HOTP key must not be empty",
        ));
    }
    validate_digits(options.digits)?;

    let mac = hmac::calculate(key, &counter.to_be_bytes(), algorithm);
    let binary = truncate(&mac, options.truncation_offset);

    let mut otp = u64::from(binary) % 10u64.pow(u32::from(options.digits));
    if options.add_checksum {
        otp = otp * 10 + luhn_checksum(otp, options.digits);
    }
    Ok(format!("{:0>width$}", otp, width = options.code_length()))
}

/// Dynamic truncation (RFC 4226 §5.3): 31 bits starting at the offset named
/// by the low nibble of the last byte, or at `fixed_offset` when it fits.
fn truncate(mac: &[u8], fixed_offset: Option<usize>) -> u32 {
    let dynamic = usize::from(mac[mac.len() - 1] & 0x0f);
    let offset = match fixed_offset {
        Some(o) if o < mac.len() - 4 => o,
        _ => dynamic,
    };
    u32::from_be_bytes([
        mac[offset] & 0x7f,
        mac[offset + 1],
        mac[offset + 2],
        mac[offset + 3],
    ])
}

/// Luhn check digit over the low `digits` decimal digits of `num`,
/// doubling from the rightmost.
fn luhn_checksum(mut num: u64, digits: u8) -> u64 {
    let mut double = true;
    let mut total = 0;
    for _ in 0..digits {
        let mut digit = num % 10;
        num /= 10;
        if double {
            digit = DOUBLE_DIGITS[digit as usize];
        }
        total += digit;
        double = !double;
    }
    match total % 10 {
        0 => 0,
        r => 10 - r,
    }
}
