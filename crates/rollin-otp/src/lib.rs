//! # Rollin' – One-Time Password Engine
//!
//! Pure, synchronous code-generation core for the Rollin' authenticator:
//!
//! - **RFC 4226 / 6238** – HOTP & TOTP generation, including the optional
//!   checksum digit and fixed truncation offset of RFC 4226 §5.3
//! - **FIPS 180-4** – Self-contained SHA-1, SHA-256 and SHA-512
//! - **RFC 2104** – HMAC over any of the three hash variants
//! - **RFC 4648** – Strict Base32 codec, tolerant Hex decoder
//! - **Secret buffers** – Length-tracked byte storage that zeroes on free
//! - **Evaluator** – One entry point turning stored parameters into a code,
//!   a countdown value, a verification verdict, or a typed error

pub mod otp;
