//! HMAC (RFC 2104) over any [`BlockHash`].

use zeroize::Zeroizing;

use crate::otp::hash::BlockHash;
use crate::otp::sha1::Sha1;
use crate::otp::sha256::Sha256;
use crate::otp::sha512::Sha512;
use crate::otp::types::Algorithm;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// HMAC of `message` under `key` with the hash selected by `algorithm`.
/// The result is `algorithm.result_length()` bytes.
pub fn calculate(key: &[u8], message: &[u8], algorithm: Algorithm) -> Vec<u8> {
    match algorithm {
        Algorithm::Sha1 => hmac::<Sha1>(key, message),
        Algorithm::Sha256 => hmac::<Sha256>(key, message),
        Algorithm::Sha512 => hmac::<Sha512>(key, message),
    }
}

/// HMAC generic over the hash. Keys longer than one block are hashed first;
/// shorter keys are zero-padded to the block length.
pub fn hmac<H: BlockHash>(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut block_key = Zeroizing::new(vec![0u8; H::BLOCK_LENGTH]);
    if key.len() > H::BLOCK_LENGTH {
        let hashed = Zeroizing::new(H::digest(key));
        block_key[..hashed.len()].copy_from_slice(&hashed);
    } else {
        block_key[..key.len()].copy_from_slice(key);
    }

    let mut pad = Zeroizing::new(vec![0u8; H::BLOCK_LENGTH]);
    xor_into(&mut pad, &block_key, IPAD);
    let mut inner = H::new();
    inner.update(&pad);
    inner.update(message);
    let inner_digest = Zeroizing::new(inner.finalize());

    xor_into(&mut pad, &block_key, OPAD);
    let mut outer = H::new();
    outer.update(&pad);
    outer.update(&inner_digest);
    outer.finalize()
}

fn xor_into(out: &mut [u8], key: &[u8], byte: u8) {
    for (o, k) in out.iter_mut().zip(key) {
        *o = k ^ byte;
    }
}
