//! SHA-1 (FIPS 180-4 §6.1).

use zeroize::Zeroize;

use crate::otp::hash::{BlockBuffer, BlockHash};

const BLOCK: usize = 64;

const INITIAL_STATE: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

/// Streaming SHA-1 hasher.
pub struct Sha1 {
    state: [u32; 5],
    buffer: BlockBuffer<BLOCK>,
}

impl Default for Sha1 {
    fn default() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: BlockBuffer::new(),
        }
    }
}

impl BlockHash for Sha1 {
    const BLOCK_LENGTH: usize = BLOCK;
    const RESULT_LENGTH: usize = 20;

    fn update(&mut self, data: &[u8]) {
        let state = &mut self.state;
        self.buffer.input(data, |block| compress(state, block));
    }

    fn finalize(self) -> Vec<u8> {
        let Self { mut state, buffer } = self;
        buffer.finish(8, |block| compress(&mut state, block));
        let out = state.iter().flat_map(|w| w.to_be_bytes()).collect();
        state.zeroize();
        out
    }
}

fn compress(state: &mut [u32; 5], block: &[u8; BLOCK]) {
    let mut w = [0u32; 80];
    for (t, chunk) in block.chunks_exact(4).enumerate() {
        w[t] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    for t in 16..80 {
        w[t] = (w[t - 3] ^ w[t - 8] ^ w[t - 14] ^ w[t - 16]).rotate_left(1);
    }

    let [mut a, mut b, mut c, mut d, mut e] = *state;
    for (t, wt) in w.iter().enumerate() {
        let (f, k) = match t {
            0..=19 => ((b & c) | (!b & d), 0x5a827999),
            20..=39 => (b ^ c ^ d, 0x6ed9eba1),
            40..=59 => ((b & c) | (b & d) | (c & d), 0x8f1bbcdc),
            _ => (b ^ c ^ d, 0xca62c1d6),
        };
        let temp = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(*wt);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = temp;
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    w.zeroize();
}
