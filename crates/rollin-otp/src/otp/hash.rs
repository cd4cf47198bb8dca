//! Shared plumbing for the SHA family (FIPS 180-4).
//!
//! - [`BlockHash`] – the capability HMAC is generic over
//! - [`BlockBuffer`] – message buffering and Merkle–Damgård padding
//! - `Algorithm::{digest, block_length, result_length}` – dispatch from the
//!   closed algorithm tag to the concrete implementation

use zeroize::Zeroize;

use crate::otp::sha1::Sha1;
use crate::otp::sha256::Sha256;
use crate::otp::sha512::Sha512;
use crate::otp::types::Algorithm;

/// A Merkle–Damgård hash usable by HMAC.
pub trait BlockHash: Default {
    /// Size of one compression-function input block, in bytes.
    const BLOCK_LENGTH: usize;
    /// Size of the finished digest, in bytes.
    const RESULT_LENGTH: usize;

    /// Fresh hasher at the initial state.
    fn new() -> Self {
        Self::default()
    }

    /// Absorb more message bytes.
    fn update(&mut self, data: &[u8]);

    /// Pad, process the final block(s) and return the digest.
    fn finalize(self) -> Vec<u8>;

    /// One-shot digest of `data`.
    fn digest(data: &[u8]) -> Vec<u8> {
        let mut hasher = Self::default();
        hasher.update(data);
        hasher.finalize()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Algorithm dispatch
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl Algorithm {
    /// Hash `data` with this algorithm.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data),
            Self::Sha256 => Sha256::digest(data),
            Self::Sha512 => Sha512::digest(data),
        }
    }

    /// Internal block size in bytes (64, 64, 128).
    pub fn block_length(&self) -> usize {
        match self {
            Self::Sha1 => Sha1::BLOCK_LENGTH,
            Self::Sha256 => Sha256::BLOCK_LENGTH,
            Self::Sha512 => Sha512::BLOCK_LENGTH,
        }
    }

    /// Digest size in bytes (20, 32, 64).
    pub fn result_length(&self) -> usize {
        match self {
            Self::Sha1 => Sha1::RESULT_LENGTH,
            Self::Sha256 => Sha256::RESULT_LENGTH,
            Self::Sha512 => Sha512::RESULT_LENGTH,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Block buffering & padding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Collects message bytes into `N`-byte blocks for a compression function.
pub(crate) struct BlockBuffer<const N: usize> {
    block: [u8; N],
    filled: usize,
    /// Total message length in bytes.
    total_len: u128,
}

impl<const N: usize> BlockBuffer<N> {
    pub(crate) fn new() -> Self {
        Self {
            block: [0u8; N],
            filled: 0,
            total_len: 0,
        }
    }

    /// Feed `data`, calling `compress` once per completed block.
    pub(crate) fn input(&mut self, mut data: &[u8], mut compress: impl FnMut(&[u8; N])) {
        self.total_len += data.len() as u128;

        if self.filled > 0 {
            let take = (N - self.filled).min(data.len());
            self.block[self.filled..self.filled + take].copy_from_slice(&data[..take]);
            self.filled += take;
            data = &data[take..];
            if self.filled < N {
                return;
            }
            compress(&self.block);
            self.filled = 0;
        }

        let mut chunks = data.chunks_exact(N);
        for chunk in &mut chunks {
            self.block.copy_from_slice(chunk);
            compress(&self.block);
        }
        let rest = chunks.remainder();
        self.block[..rest.len()].copy_from_slice(rest);
        self.filled = rest.len();
    }

    /// Append `0x80`, zero fill, and the big-endian bit length in the last
    /// `length_bytes` bytes of the final block.
    pub(crate) fn finish(mut self, length_bytes: usize, mut compress: impl FnMut(&[u8; N])) {
        let bit_len = self.total_len.wrapping_mul(8).to_be_bytes();

        self.block[self.filled] = 0x80;
        self.filled += 1;
        if self.filled > N - length_bytes {
            self.block[self.filled..].fill(0);
            compress(&self.block);
            self.filled = 0;
        }
        self.block[self.filled..N - length_bytes].fill(0);
        self.block[N - length_bytes..].copy_from_slice(&bit_len[16 - length_bytes..]);
        compress(&self.block);

        self.block.zeroize();
    }
}
