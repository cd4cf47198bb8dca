//! Owned, length-tracked byte storage for decoded secrets.
//!
//! `SecretBuffer` manages its own growth instead of leaning on `Vec`'s
//! reallocation, so that every storage block it lets go of (on growth,
//! truncation, clearing or drop) can be overwritten with zeros first.

use std::fmt;
use zeroize::Zeroize;

/// Growable byte buffer that wipes released memory.
pub struct SecretBuffer {
    data: Vec<u8>,
    /// Over-allocation applied to the next growth, then reset.
    extra_allocation: usize,
    zero_on_free: bool,
}

impl SecretBuffer {
    /// Create an empty buffer with zero-on-free enabled.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            extra_allocation: 0,
            zero_on_free: true,
        }
    }

    /// Copy `bytes` into a new buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::new();
        buf.append(bytes);
        buf
    }

    /// Copy the UTF-8 bytes of `s` into a new buffer.
    pub fn from_string(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Settings
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Over-allocate the next growth by `extra` bytes.
    pub fn set_extra_allocation(&mut self, extra: usize) {
        self.extra_allocation = extra;
    }

    /// Pending over-allocation (0 once a growth has consumed it).
    pub fn extra_allocation(&self) -> usize {
        self.extra_allocation
    }

    /// Enable or disable wiping of released memory.
    pub fn set_zero_on_free(&mut self, enabled: bool) {
        self.zero_on_free = enabled;
    }

    pub fn zero_on_free(&self) -> bool {
        self.zero_on_free
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Mutation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Append bytes to the end of the buffer.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        self.grow_for(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Append a single byte.
    pub fn push(&mut self, byte: u8) {
        self.grow_for(1);
        self.data.push(byte);
    }

    /// Shrink the live content to `new_len` bytes.
    ///
    /// Returns `false` and leaves the buffer untouched if `new_len` is larger
    /// than the current length.
    pub fn truncate(&mut self, new_len: usize) -> bool {
        if new_len > self.data.len() {
            return false;
        }
        if new_len == 0 {
            self.clear();
            return true;
        }
        if self.zero_on_free {
            self.data[new_len..].zeroize();
        }
        self.data.truncate(new_len);
        true
    }

    /// Drop all content.
    pub fn clear(&mut self) {
        if self.zero_on_free {
            // Wipes the full capacity, then sets the length to zero.
            self.data.zeroize();
        } else {
            self.data.clear();
        }
    }

    /// Overwrite the byte at `idx`. Never grows the buffer.
    pub fn set_at(&mut self, idx: usize, value: u8) -> bool {
        match self.data.get_mut(idx) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Access
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Byte at `idx`, or 0 when `idx` is past the end.
    pub fn at(&self, idx: usize) -> u8 {
        self.data.get(idx).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Content as text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Make room for `additional` more bytes, moving to a fresh allocation
    /// (and wiping the old one) when the current capacity is too small.
    fn grow_for(&mut self, additional: usize) {
        let needed = self.data.len() + additional;
        if needed <= self.data.capacity() {
            return;
        }
        let new_capacity = needed + self.extra_allocation;
        self.extra_allocation = 0;

        let mut fresh = Vec::with_capacity(new_capacity);
        fresh.extend_from_slice(&self.data);
        let mut old = std::mem::replace(&mut self.data, fresh);
        if self.zero_on_free {
            old.zeroize();
        }
    }
}

impl Default for SecretBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        if self.zero_on_free {
            self.data.zeroize();
        }
    }
}

impl Clone for SecretBuffer {
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        copy.zero_on_free = self.zero_on_free;
        copy.append(&self.data);
        copy.extra_allocation = self.extra_allocation;
        copy
    }
}

/// Takes ownership of an already-decoded vector without copying it.
impl From<Vec<u8>> for SecretBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data,
            extra_allocation: 0,
            zero_on_free: true,
        }
    }
}

impl From<&[u8]> for SecretBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&str> for SecretBuffer {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<[u8]> for SecretBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl PartialEq for SecretBuffer {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.data, &other.data)
    }
}

impl Eq for SecretBuffer {}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("len", &self.data.len())
            .field("zero_on_free", &self.zero_on_free)
            .finish()
    }
}

/// Constant-time comparison (to prevent timing attacks on secrets and codes).
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
