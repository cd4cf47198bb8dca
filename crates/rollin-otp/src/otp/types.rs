//! Core types for the OTP engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest number of digits a generated code may have.
pub const MIN_DIGITS: u8 = 6;
/// Largest number of digits a generated code may have.
pub const MAX_DIGITS: u8 = 8;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Algorithm
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hash algorithm used for HMAC-based OTP.
///
/// The hashing capability itself (`digest`, `block_length`,
/// `result_length`) lives in [`crate::otp::hash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Sha1
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}

impl Algorithm {
    /// Map a stored numeric algorithm id (0 = SHA-1, 1 = SHA-256, 2 = SHA-512).
    pub fn from_id(id: u32) -> Result<Self, OtpError> {
        match id {
            0 => Ok(Self::Sha1),
            1 => Ok(Self::Sha256),
            2 => Ok(Self::Sha512),
            other => Err(OtpError::new(
                OtpErrorKind::UnknownAlgorithm,
                format!("Unknown hash algorithm id {}", other),
            )),
        }
    }

    /// Numeric id as stored by the persistence layer.
    pub fn id(&self) -> u32 {
        match self {
            Self::Sha1 => 0,
            Self::Sha256 => 1,
            Self::Sha512 => 2,
        }
    }

    /// Parse from a case-insensitive string.
    pub fn from_str_loose(s: &str) -> Result<Self, OtpError> {
        match s.trim().to_uppercase().as_str() {
            "SHA1" | "SHA-1" | "HMACSHA1" | "HMAC-SHA1" => Ok(Self::Sha1),
            "SHA256" | "SHA-256" | "HMACSHA256" | "HMAC-SHA256" => Ok(Self::Sha256),
            "SHA512" | "SHA-512" | "HMACSHA512" | "HMAC-SHA512" => Ok(Self::Sha512),
            _ => Err(OtpError::new(
                OtpErrorKind::UnknownAlgorithm,
                "Unknown hash algorithm name",
            )
            .with_detail(s.to_string())),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Key encoding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How a stored secret string is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEncoding {
    Hex,
    Base32,
}

impl Default for KeyEncoding {
    fn default() -> Self {
        Self::Base32
    }
}

impl fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hex => write!(f, "hex"),
            Self::Base32 => write!(f, "base32"),
        }
    }
}

impl KeyEncoding {
    /// Map a stored numeric encoding id (0 = hex, 1 = base32).
    pub fn from_id(id: u32) -> Result<Self, OtpError> {
        match id {
            0 => Ok(Self::Hex),
            1 => Ok(Self::Base32),
            other => Err(OtpError::new(
                OtpErrorKind::UnknownAlgorithm,
                format!("Unknown key encoding id {}", other),
            )),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OTP kind
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Whether an entry uses time-based or counter-based OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpKind {
    Totp,
    Hotp,
}

impl Default for OtpKind {
    fn default() -> Self {
        Self::Totp
    }
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Totp => write!(f, "totp"),
            Self::Hotp => write!(f, "hotp"),
        }
    }
}

impl OtpKind {
    /// Map a stored numeric OTP type id (0 = TOTP, 1 = HOTP).
    pub fn from_id(id: u32) -> Result<Self, OtpError> {
        match id {
            0 => Ok(Self::Totp),
            1 => Ok(Self::Hotp),
            other => Err(OtpError::new(
                OtpErrorKind::UnknownAlgorithm,
                format!("Unknown OTP type id {}", other),
            )),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OTP parameters
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything needed to compute one code for a stored credential.
#[derive(Clone, Serialize, Deserialize)]
pub struct OtpParameters {
    /// Caller-owned identifier, echoed back in results.
    pub identifier: String,
    /// Encoded secret key.
    pub secret: String,
    /// Encoding of `secret`.
    pub encoding: KeyEncoding,
    /// TOTP or HOTP.
    pub kind: OtpKind,
    /// Hash algorithm.
    pub algorithm: Algorithm,
    /// Number of digits in the generated code (6 through 8).
    pub digits: u8,
    /// Time step in seconds (TOTP only, typically 30).
    pub time_step: u32,
    /// Unix time the step count starts from (TOTP only, usually 0).
    pub time_offset: u64,
    /// Moving counter (HOTP only).
    pub counter: u64,
}

impl fmt::Debug for OtpParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpParameters")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .field("encoding", &self.encoding)
            .field("kind", &self.kind)
            .field("algorithm", &self.algorithm)
            .field("digits", &self.digits)
            .field("time_step", &self.time_step)
            .field("time_offset", &self.time_offset)
            .field("counter", &self.counter)
            .finish()
    }
}

impl OtpParameters {
    /// A TOTP entry with the usual defaults (Base32, SHA-1, 6 digits, 30 s).
    pub fn totp(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
            encoding: KeyEncoding::Base32,
            kind: OtpKind::Totp,
            algorithm: Algorithm::default(),
            digits: MIN_DIGITS,
            time_step: 30,
            time_offset: 0,
            counter: 0,
        }
    }

    /// An HOTP entry starting at `counter`.
    pub fn hotp(identifier: impl Into<String>, secret: impl Into<String>, counter: u64) -> Self {
        let mut params = Self::totp(identifier, secret);
        params.kind = OtpKind::Hotp;
        params.counter = counter;
        params
    }

    /// Builder: set secret encoding.
    pub fn with_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algo: Algorithm) -> Self {
        self.algorithm = algo;
        self
    }

    /// Builder: set digit count.
    pub fn with_digits(mut self, digits: u8) -> Self {
        self.digits = digits;
        self
    }

    /// Builder: set time step.
    pub fn with_time_step(mut self, time_step: u32) -> Self {
        self.time_step = time_step;
        self
    }

    /// Builder: set time offset.
    pub fn with_time_offset(mut self, time_offset: u64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// Check the invariants that don't need the secret to be decoded.
    pub fn validate(&self) -> Result<(), OtpError> {
        if self.identifier.is_empty() {
            return Err(OtpError::new(
                OtpErrorKind::InvalidParameters,
                "Identifier must not be empty",
            ));
        }
        if self.secret.is_empty() {
            return Err(OtpError::new(
                OtpErrorKind::InvalidParameters,
                "Secret must not be empty",
            ));
        }
        validate_digits(self.digits)?;
        if self.kind == OtpKind::Totp && self.time_step == 0 {
            return Err(OtpError::new(
                OtpErrorKind::InvalidParameters,
                "Time step must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Base32 secret as users tend to type it: no spaces or dashes, upper case,
    /// padded with `=` to a whole number of 8-character blocks.
    pub fn normalised_secret(&self) -> String {
        let cleaned: String = self
            .secret
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect::<String>()
            .to_uppercase();
        pad_base32(&cleaned)
    }
}

/// Reject digit counts outside `MIN_DIGITS..=MAX_DIGITS`.
pub(crate) fn validate_digits(digits: u8) -> Result<(), OtpError> {
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        return Err(OtpError::new(
            OtpErrorKind::InvalidParameters,
            format!("Digit count must be {} through {}", MIN_DIGITS, MAX_DIGITS),
        )
        .with_detail(format!("got {}", digits)));
    }
    Ok(())
}

/// Pad a base-32 string to a multiple of 8 with '='.
fn pad_base32(s: &str) -> String {
    let remainder = s.len() % 8;
    if remainder == 0 {
        s.to_string()
    } else {
        let pad_count = 8 - remainder;
        format!("{}{}", s, "=".repeat(pad_count))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generated code result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A generated OTP code with associated timing info.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// Identifier of the parameters this code was generated for.
    pub identifier: String,
    /// The OTP code string (e.g. "123456").
    pub code: String,
    /// TOTP or HOTP.
    pub kind: OtpKind,
    /// The time step (TOTP) or counter (HOTP) used.
    pub counter: u64,
    /// Seconds elapsed in the current window (TOTP only).
    pub elapsed_seconds: u32,
    /// Seconds remaining until the code expires (TOTP only).
    pub remaining_seconds: u32,
    /// Window length in seconds (0 for HOTP).
    pub time_step: u32,
    /// Progress as fraction 0.0–1.0 (1.0 = expired).
    pub progress: f64,
}

/// Outcome of a single evaluation: a fresh code or the reason there isn't one.
pub type OtpResult = Result<GeneratedCode, OtpError>;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Verification result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of verifying an OTP code against a set of parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResult {
    pub valid: bool,
    /// How many time-steps or counters off the match was (0 = exact).
    pub drift: i64,
    /// The counter value that matched (if any).
    pub matched_counter: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Error type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Error kind for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtpErrorKind {
    /// Malformed Base32/Hex input.
    InvalidEncoding,
    /// Unrecognised hash, encoding or OTP type tag.
    UnknownAlgorithm,
    /// Digit count, time step, key or identifier out of range.
    InvalidParameters,
    /// The codec rejected the stored secret.
    DecodeFailure,
}

/// Crate-level error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpError {
    pub kind: OtpErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for OtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if let Some(d) = &self.detail {
            write!(f, " ({})", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for OtpError {}

impl OtpError {
    pub fn new(kind: OtpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<OtpError> for String {
    fn from(e: OtpError) -> String {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Algorithm ────────────────────────────────────────────────

    #[test]
    fn algorithm_default_is_sha1() {
        assert_eq!(Algorithm::default(), Algorithm::Sha1);
    }

    #[test]
    fn algorithm_display() {
        assert_eq!(Algorithm::Sha1.to_string(), "SHA1");
        assert_eq!(Algorithm::Sha256.to_string(), "SHA256");
        assert_eq!(Algorithm::Sha512.to_string(), "SHA512");
    }

    #[test]
    fn algorithm_from_str_loose() {
        assert_eq!(Algorithm::from_str_loose("sha1").unwrap(), Algorithm::Sha1);
        assert_eq!(Algorithm::from_str_loose(" SHA-256 ").unwrap(), Algorithm::Sha256);
        assert_eq!(Algorithm::from_str_loose("HMAC-SHA512").unwrap(), Algorithm::Sha512);
        let err = Algorithm::from_str_loose("MD5").unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::UnknownAlgorithm);
        assert_eq!(err.detail.as_deref(), Some("MD5"));
        assert!(Algorithm::from_str_loose("").is_err());
    }

    #[test]
    fn algorithm_ids_round_trip() {
        for algo in [Algorithm::Sha1, Algorithm::Sha256, Algorithm::Sha512] {
            assert_eq!(Algorithm::from_id(algo.id()).unwrap(), algo);
        }
        let err = Algorithm::from_id(3).unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::UnknownAlgorithm);
    }

    #[test]
    fn algorithm_serde() {
        let json = serde_json::to_string(&Algorithm::Sha256).unwrap();
        assert_eq!(json, "\"SHA256\"");
        let back: Algorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Algorithm::Sha256);
    }

    // ── Encoding / kind ──────────────────────────────────────────

    #[test]
    fn encoding_from_id() {
        assert_eq!(KeyEncoding::from_id(0).unwrap(), KeyEncoding::Hex);
        assert_eq!(KeyEncoding::from_id(1).unwrap(), KeyEncoding::Base32);
        assert_eq!(
            KeyEncoding::from_id(7).unwrap_err().kind,
            OtpErrorKind::UnknownAlgorithm
        );
    }

    #[test]
    fn otp_kind_from_id_and_display() {
        assert_eq!(OtpKind::from_id(0).unwrap(), OtpKind::Totp);
        assert_eq!(OtpKind::from_id(1).unwrap(), OtpKind::Hotp);
        assert!(OtpKind::from_id(2).is_err());
        assert_eq!(OtpKind::Totp.to_string(), "totp");
        assert_eq!(OtpKind::Hotp.to_string(), "hotp");
    }

    // ── OtpParameters ────────────────────────────────────────────

    #[test]
    fn totp_defaults() {
        let p = OtpParameters::totp("alice@example.com", "JBSWY3DPEHPK3PXP");
        assert_eq!(p.kind, OtpKind::Totp);
        assert_eq!(p.encoding, KeyEncoding::Base32);
        assert_eq!(p.algorithm, Algorithm::Sha1);
        assert_eq!(p.digits, 6);
        assert_eq!(p.time_step, 30);
        assert_eq!(p.time_offset, 0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn hotp_builder() {
        let p = OtpParameters::hotp("u", "3132", 9)
            .with_encoding(KeyEncoding::Hex)
            .with_algorithm(Algorithm::Sha512)
            .with_digits(8);
        assert_eq!(p.kind, OtpKind::Hotp);
        assert_eq!(p.counter, 9);
        assert_eq!(p.encoding, KeyEncoding::Hex);
        assert_eq!(p.algorithm, Algorithm::Sha512);
        assert_eq!(p.digits, 8);
    }

    #[test]
    fn validate_rejects_bad_digits() {
        for digits in [0, 5, 9, 255] {
            let p = OtpParameters::totp("u", "JBSWY3DP").with_digits(digits);
            assert_eq!(p.validate().unwrap_err().kind, OtpErrorKind::InvalidParameters);
        }
        for digits in [6, 7, 8] {
            let p = OtpParameters::totp("u", "JBSWY3DP").with_digits(digits);
            assert!(p.validate().is_ok());
        }
    }

    #[test]
    fn validate_rejects_zero_step_for_totp_only() {
        let p = OtpParameters::totp("u", "JBSWY3DP").with_time_step(0);
        assert!(p.validate().is_err());
        let h = OtpParameters::hotp("u", "JBSWY3DP", 0).with_time_step(0);
        assert!(h.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_fields() {
        assert!(OtpParameters::totp("", "JBSWY3DP").validate().is_err());
        assert!(OtpParameters::totp("u", "").validate().is_err());
    }

    #[test]
    fn normalised_secret_strips_and_pads() {
        let p = OtpParameters::totp("u", "jbsw y3dp-ehpk 3pxp");
        assert_eq!(p.normalised_secret(), "JBSWY3DPEHPK3PXP");
        let q = OtpParameters::totp("u", "gezdgnbvgy3tqojq");
        assert_eq!(q.normalised_secret(), "GEZDGNBVGY3TQOJQ");
        let r = OtpParameters::totp("u", "MZXW6");
        assert_eq!(r.normalised_secret(), "MZXW6===");
    }

    #[test]
    fn debug_redacts_secret() {
        let p = OtpParameters::totp("u", "JBSWY3DPEHPK3PXP");
        let s = format!("{:?}", p);
        assert!(!s.contains("JBSWY3DPEHPK3PXP"));
        assert!(s.contains("<redacted>"));
    }

    #[test]
    fn parameters_serde_roundtrip() {
        let p = OtpParameters::hotp("id", "3132", 4).with_encoding(KeyEncoding::Hex);
        let json = serde_json::to_string(&p).unwrap();
        let back: OtpParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back.identifier, "id");
        assert_eq!(back.kind, OtpKind::Hotp);
        assert_eq!(back.encoding, KeyEncoding::Hex);
        assert_eq!(back.counter, 4);
    }

    // ── GeneratedCode / VerifyResult ─────────────────────────────

    #[test]
    fn generated_code_serde() {
        let code = GeneratedCode {
            identifier: "id1".into(),
            code: "123456".into(),
            kind: OtpKind::Totp,
            counter: 55755375,
            elapsed_seconds: 15,
            remaining_seconds: 15,
            time_step: 30,
            progress: 0.5,
        };
        let json = serde_json::to_string(&code).unwrap();
        let back: GeneratedCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, "123456");
        assert_eq!(back.elapsed_seconds, 15);
    }

    #[test]
    fn verify_result_serde() {
        let vr = VerifyResult {
            valid: true,
            drift: -1,
            matched_counter: Some(100),
        };
        let json = serde_json::to_string(&vr).unwrap();
        let back: VerifyResult = serde_json::from_str(&json).unwrap();
        assert!(back.valid);
        assert_eq!(back.drift, -1);
    }

    // ── Error ────────────────────────────────────────────────────

    #[test]
    fn error_display() {
        let err = OtpError::new(OtpErrorKind::DecodeFailure, "secret decode failed")
            .with_detail("extra info");
        let s = err.to_string();
        assert!(s.contains("DecodeFailure"));
        assert!(s.contains("secret decode failed"));
        assert!(s.contains("extra info"));
    }

    #[test]
    fn error_into_string() {
        let err = OtpError::new(OtpErrorKind::InvalidEncoding, "bad");
        let s: String = err.into();
        assert!(s.contains("InvalidEncoding"));
    }
}
