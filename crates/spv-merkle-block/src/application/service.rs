//! # Header Validator
//!
//! Application service binding chain parameters and a clock to the
//! merkleblock decode and validation rules.

use crate::adapters::SystemTimeSource;
use crate::algorithms::{lwma, retarget};
use crate::codec;
use crate::config::ChainParams;
use crate::domain::{BlockHeader, Hash256, SpvError};
use crate::ports::{MerkleBlockApi, TimeSource};

/// Header validator - validates merkleblocks under one chain's parameters.
pub struct HeaderValidator<T: TimeSource = SystemTimeSource> {
    /// Consensus parameters.
    params: ChainParams,
    /// Clock for the timestamp drift check.
    clock: T,
}

impl HeaderValidator<SystemTimeSource> {
    /// Create a validator on the system clock.
    pub fn new(params: ChainParams) -> Self {
        Self::with_clock(params, SystemTimeSource)
    }
}

impl Default for HeaderValidator<SystemTimeSource> {
    fn default() -> Self {
        Self::new(ChainParams::default())
    }
}

impl<T: TimeSource> HeaderValidator<T> {
    /// Create a validator with an explicit clock.
    pub fn with_clock(params: ChainParams, clock: T) -> Self {
        Self { params, clock }
    }

    /// Decode and validate in one step, returning the header only if it
    /// passes.
    pub fn accept(&self, message: &[u8]) -> Result<Option<BlockHeader>, SpvError> {
        let header = self.decode_block(message)?;
        Ok(self.validate_block(&header)?.then_some(header))
    }
}

impl<T: TimeSource> MerkleBlockApi for HeaderValidator<T> {
    fn decode_block(&self, message: &[u8]) -> Result<BlockHeader, SpvError> {
        codec::decode_with_limit(message, self.params.max_transactions).map_err(|e| {
            tracing::warn!(len = message.len(), error = %e, "rejected merkleblock message");
            SpvError::from(e)
        })
    }

    fn validate_block(&self, header: &BlockHeader) -> Result<bool, SpvError> {
        let valid = header.validate_at(self.clock.now(), &self.params)?;
        if valid {
            tracing::debug!(
                block_hash = %header.block_hash(),
                total_transactions = header.total_transactions(),
                "merkleblock accepted"
            );
        } else {
            tracing::warn!(block_hash = %header.block_hash(), "merkleblock failed validation");
        }
        Ok(valid)
    }

    fn contains_transaction(&self, header: &BlockHeader, tx_hash: &Hash256) -> bool {
        header.contains_tx_hash(tx_hash)
    }

    fn verify_periodic_retarget(
        &self,
        header: &BlockHeader,
        previous: &BlockHeader,
        interval_start: Option<&BlockHeader>,
        transition_time: u32,
    ) -> Result<bool, SpvError> {
        Ok(retarget::verify_periodic_retarget(
            header,
            previous,
            interval_start,
            transition_time,
            &self.params,
        )?)
    }

    fn verify_lwma(
        &self,
        header: &BlockHeader,
        window: &[BlockHeader],
        transition_time: u32,
    ) -> Result<bool, SpvError> {
        Ok(lwma::verify_lwma(header, window, transition_time, &self.params)?)
    }

    fn params(&self) -> &ChainParams {
        &self.params
    }
}
