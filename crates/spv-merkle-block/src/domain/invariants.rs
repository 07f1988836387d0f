//! # Domain Invariants
//!
//! Chain consensus parameters and structural rules that must always hold.

use super::errors::DecodeError;
use super::value_objects::Hash256;

/// Target block spacing in seconds (2 minute blocks).
pub const BLOCK_INTERVAL_SECS: u32 = 120;

/// Periodic retarget interval in blocks.
pub const BLOCK_DIFFICULTY_INTERVAL: u32 = 72;

/// Number of ancestors averaged by the LWMA retarget.
pub const LWMA_BLOCKS: usize = 72;

/// Height of a header not yet placed in a chain (`i32::MAX`).
pub const UNKNOWN_HEIGHT: u32 = i32::MAX as u32;

/// Easiest allowed compact target.
pub const MAX_PROOF_OF_WORK: u32 = 0x1d00_ffff;

/// How far into the future a header timestamp may run, in seconds.
pub const MAX_TIME_DRIFT: u32 = 2 * 60 * 60;

/// Default cap on a proof's declared transaction count.
pub const MAX_TRANSACTIONS: u32 = 1_000_000;

/// Size of the canonical serialized header.
pub const HEADER_SIZE: usize = 80;

/// Invariant: a proof never carries more hashes than leaves, and never
/// fewer flag bits than hashes.
pub fn invariant_proof_shape(
    total_transactions: u32,
    hashes: &[Hash256],
    flags: &[u8],
) -> Result<(), DecodeError> {
    if hashes.len() as u64 > u64::from(total_transactions) {
        return Err(DecodeError::Malformed(format!(
            "{} hashes for {} transactions",
            hashes.len(),
            total_transactions
        )));
    }

    if (flags.len() as u64) * 8 < hashes.len() as u64 {
        return Err(DecodeError::Malformed(format!(
            "{} flag bits cannot cover {} hashes",
            flags.len() * 8,
            hashes.len()
        )));
    }

    Ok(())
}

/// Invariant: the declared leaf count stays within the configured bound.
pub fn invariant_transaction_bound(total_transactions: u32, max: u32) -> Result<(), DecodeError> {
    if total_transactions > max {
        return Err(DecodeError::Malformed(format!(
            "{} transactions exceeds limit {}",
            total_transactions, max
        )));
    }
    Ok(())
}

/// True when `height` falls on a periodic retarget boundary.
pub fn is_retarget_boundary(height: u32, interval: u32) -> bool {
    interval != 0 && height % interval == 0
}
