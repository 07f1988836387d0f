//! # Inbound Ports
//!
//! API trait defining what the header validator can do.

use crate::config::ChainParams;
use crate::domain::{BlockHeader, Hash256, SpvError};

/// Merkleblock validation API - inbound port.
pub trait MerkleBlockApi: Send + Sync {
    /// Parse a bare header or merkleblock message.
    fn decode_block(&self, message: &[u8]) -> Result<BlockHeader, SpvError>;

    /// Merkle proof, proof of work and timestamp drift against the
    /// current clock.
    fn validate_block(&self, header: &BlockHeader) -> Result<bool, SpvError>;

    /// True if `header` proves inclusion of `tx_hash`.
    fn contains_transaction(&self, header: &BlockHeader, tx_hash: &Hash256) -> bool;

    /// Periodic retarget check.
    ///
    /// `interval_start` is the first block of the interval when known;
    /// otherwise `transition_time` must carry its timestamp on a boundary.
    fn verify_periodic_retarget(
        &self,
        header: &BlockHeader,
        previous: &BlockHeader,
        interval_start: Option<&BlockHeader>,
        transition_time: u32,
    ) -> Result<bool, SpvError>;

    /// LWMA retarget check over an oldest-first ancestor window.
    fn verify_lwma(
        &self,
        header: &BlockHeader,
        window: &[BlockHeader],
        transition_time: u32,
    ) -> Result<bool, SpvError>;

    /// Parameters this validator enforces.
    fn params(&self) -> &ChainParams;
}
