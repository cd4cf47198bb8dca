//! OTP crate: sub-modules.

pub mod types;
pub mod buffer;
pub mod base32;
pub mod hexcodec;
pub mod hash;
pub mod sha1;
pub mod sha256;
pub mod sha512;
pub mod hmac;
pub mod hotp;
pub mod totp;
pub mod evaluator;

// Re-export top-level items for convenience.
pub use types::*;
pub use buffer::SecretBuffer;
pub use base32::Base32Codec;
pub use hexcodec::HexCodec;
pub use hotp::HotpOptions;
pub use evaluator::{EvaluatorConfig, OtpEvaluator};
