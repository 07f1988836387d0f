//! # Domain Value Objects
//!
//! Fixed-width hash type shared by every component.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 256-bit hash in the byte order produced by the hash function.
///
/// Equality, ordering and `std::hash::Hash` work on the raw bytes, so the
/// type can key a `HashMap`. `Display` renders the reversed (conventional
/// block explorer) hex form.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    /// Size in bytes.
    pub const LEN: usize = 32;

    /// All-zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Build from a slice; `None` unless it is exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    /// Raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Consume into raw bytes.
    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// True if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Byte-reversed copy (display order).
    pub fn reversed(&self) -> Self {
        let mut bytes = self.0;
        bytes.reverse();
        Self(bytes)
    }

    /// Reinterpret the raw bytes as a little-endian unsigned integer.
    pub fn to_u256_le(&self) -> U256 {
        U256::from_little_endian(&self.0)
    }

    /// Inverse of [`Hash256::to_u256_le`].
    pub fn from_u256_le(value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_little_endian(&mut bytes);
        Self(bytes)
    }

    /// Parse the conventional reversed hex form.
    pub fn from_display_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }

    /// Conventional reversed hex form.
    pub fn to_display_hex(&self) -> String {
        hex::encode(self.reversed().0)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_hex())
    }
}

impl fmt::Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({})", self.to_display_hex())
    }
}
