//! # Chain Parameters
//!
//! Consensus parameters the validators run against.
//!
//! The defaults are this chain's own values: 72-block windows at a 120 second
//! spacing. They are not interchangeable with other chains' well-known values.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::algorithms::pow::compact_to_target;
use crate::domain::{
    BLOCK_DIFFICULTY_INTERVAL, BLOCK_INTERVAL_SECS, LWMA_BLOCKS, MAX_PROOF_OF_WORK,
    MAX_TIME_DRIFT, MAX_TRANSACTIONS,
};

/// Consensus parameters for header validation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainParams {
    /// Target block spacing in seconds.
    pub block_interval_secs: u32,

    /// Blocks between periodic retargets.
    pub difficulty_interval: u32,

    /// Ancestors averaged by the LWMA retarget.
    pub lwma_blocks: usize,

    /// Easiest allowed target, compact encoded.
    pub max_proof_of_work: u32,

    /// Allowed future drift of a header timestamp.
    pub max_time_drift_secs: u32,

    /// Upper bound on a proof's declared transaction count.
    pub max_transactions: u32,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            block_interval_secs: BLOCK_INTERVAL_SECS,
            difficulty_interval: BLOCK_DIFFICULTY_INTERVAL,
            lwma_blocks: LWMA_BLOCKS,
            max_proof_of_work: MAX_PROOF_OF_WORK,
            max_time_drift_secs: MAX_TIME_DRIFT,
            max_transactions: MAX_TRANSACTIONS,
        }
    }
}

impl ChainParams {
    /// Parameters for tests: regtest-style easiest target, same windows.
    pub fn for_testing() -> Self {
        Self {
            max_proof_of_work: 0x207f_ffff,
            ..Self::default()
        }
    }

    /// Expected duration of one periodic interval in seconds.
    pub fn target_timespan(&self) -> u64 {
        u64::from(self.difficulty_interval) * u64::from(self.block_interval_secs)
    }

    /// Easiest allowed target as an integer.
    pub fn max_target(&self) -> U256 {
        compact_to_target(self.max_proof_of_work).value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = ChainParams::default();
        assert_eq!(params.block_interval_secs, 120);
        assert_eq!(params.difficulty_interval, 72);
        assert_eq!(params.lwma_blocks, 72);
        assert_eq!(params.target_timespan(), 8640);
    }

    #[test]
    fn test_testing_params() {
        let params = ChainParams::for_testing();
        assert!(params.max_target() > ChainParams::default().max_target());
    }

    #[test]
    fn test_params_serde() {
        let params = ChainParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: ChainParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
