//! # Proof of Work
//!
//! Compact ("nBits") target conversion and the hash-versus-target test.
//!
//! A compact value is `exponent << 24 | mantissa`, with bit 23 of the
//! mantissa acting as a sign bit:
//!
//! ```text
//! target = mantissa >> 8*(3-exponent)   if exponent <= 3
//! target = mantissa << 8*(exponent-3)   otherwise
//! ```

use primitive_types::U256;

use crate::domain::Hash256;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Decoded compact target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    /// Magnitude of the target.
    pub value: U256,
    /// Sign bit was set; no hash can satisfy a negative target.
    pub negative: bool,
    /// The encoding does not fit in 256 bits.
    pub overflow: bool,
}

impl Target {
    /// True if the target can be met by some hash at all.
    pub fn is_usable(&self) -> bool {
        !self.negative && !self.overflow
    }
}

/// Expand a compact target.
pub fn compact_to_target(bits: u32) -> Target {
    let exponent = bits >> 24;
    let mantissa = bits & MANTISSA_MASK;
    let negative = bits & SIGN_BIT != 0;

    if mantissa == 0 {
        return Target {
            value: U256::zero(),
            negative,
            overflow: false,
        };
    }

    if exponent <= 3 {
        return Target {
            value: U256::from(mantissa >> (8 * (3 - exponent))),
            negative,
            overflow: false,
        };
    }

    let overflow = exponent > 34
        || (mantissa > 0xff && exponent > 33)
        || (mantissa > 0xffff && exponent > 32);
    let value = if overflow {
        U256::zero()
    } else {
        U256::from(mantissa) << (8 * (exponent - 3) as usize)
    };

    Target {
        value,
        negative,
        overflow,
    }
}

/// Canonical compact encoding of a non-negative target.
pub fn target_to_compact(value: U256) -> u32 {
    let mut size = (value.bits() as u32 + 7) / 8;
    let mut compact = if size <= 3 {
        (value.low_u64() << (8 * (3 - size))) as u32
    } else {
        (value >> (8 * (size - 3)) as usize).low_u32()
    };

    // Keep the sign bit clear by widening the exponent.
    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | (size << 24)
}

/// True if the hash, read as a little-endian integer, is at or below the target.
///
/// Negative and overflowed targets are never satisfied.
pub fn target_satisfied_by(hash: &Hash256, target: &Target) -> bool {
    target.is_usable() && hash.to_u256_le() <= target.value
}

/// Full proof-of-work check: the compact target must be in range
/// `(0, max_target]` and the hash must satisfy it.
pub fn check_proof_of_work(hash: &Hash256, bits: u32, max_target: U256) -> bool {
    let target = compact_to_target(bits);
    if !target.is_usable() || target.value.is_zero() || target.value > max_target {
        tracing::trace!(bits, "target out of range");
        return false;
    }
    target_satisfied_by(hash, &target)
}

/// Expected number of hashes to meet a target: `2^256 / (target + 1)`.
///
/// Unusable or zero targets carry no work.
pub fn work_from_compact(bits: u32) -> U256 {
    let target = compact_to_target(bits);
    if !target.is_usable() || target.value.is_zero() {
        return U256::zero();
    }
    // 2^256 does not fit, so compute (2^256 - t - 1) / (t + 1) + 1.
    (!target.value / (target.value + U256::one())) + U256::one()
}
