//! # Domain Entities
//!
//! The block header entity handed to collaborators: an immutable header,
//! an optional partial Merkle proof, and one externally assigned height.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::errors::{DecodeError, RetargetError, TreeError};
use super::invariants::{HEADER_SIZE, UNKNOWN_HEIGHT};
use super::value_objects::Hash256;
use crate::algorithms::hashing::double_sha256;
use crate::algorithms::merkle_verifier::{MerkleMatch, PartialMerkleTree};
use crate::algorithms::pow::{check_proof_of_work, compact_to_target, target_satisfied_by};
use crate::algorithms::{lwma, retarget};
use crate::codec;
use crate::config::ChainParams;

/// Block header, optionally carrying a partial Merkle proof.
///
/// `block_hash` is always the double SHA-256 of the 80 canonical header
/// bytes, whether or not a proof is attached. `height` is the only mutable
/// field; it starts at [`UNKNOWN_HEIGHT`] and is set once by the owner of
/// the chain index.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    block_hash: Hash256,
    version: u32,
    prev_block: Hash256,
    merkle_root: Hash256,
    timestamp: u32,
    target: u32,
    nonce: u32,
    /// `None` for a bare header message; `Some` (possibly empty) for a
    /// merkleblock message.
    proof: Option<PartialMerkleTree>,
    height: u32,
}

impl BlockHeader {
    /// Create a bare header from its fields, hashing the canonical bytes.
    pub fn new(
        version: u32,
        prev_block: Hash256,
        merkle_root: Hash256,
        timestamp: u32,
        target: u32,
        nonce: u32,
    ) -> Self {
        let mut header = Self {
            block_hash: Hash256::ZERO,
            version,
            prev_block,
            merkle_root,
            timestamp,
            target,
            nonce,
            proof: None,
            height: UNKNOWN_HEIGHT,
        };
        header.block_hash = double_sha256(&header.header_bytes());
        header
    }

    /// Restore a header whose hash and height are already known, e.g. from
    /// the collaborator's own store. The hash is trusted as given.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        block_hash: Hash256,
        version: u32,
        prev_block: Hash256,
        merkle_root: Hash256,
        timestamp: u32,
        target: u32,
        nonce: u32,
        proof: Option<PartialMerkleTree>,
        height: u32,
    ) -> Self {
        Self {
            block_hash,
            version,
            prev_block,
            merkle_root,
            timestamp,
            target,
            nonce,
            proof,
            height,
        }
    }

    /// Decode a bare header or merkleblock message.
    pub fn from_bytes(message: &[u8]) -> Result<Self, DecodeError> {
        codec::decode(message)
    }

    /// Attach a partial Merkle proof. The block hash is unaffected.
    pub fn with_proof(mut self, proof: PartialMerkleTree) -> Self {
        self.proof = Some(proof);
        self
    }

    /// Set the height while building.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Hash of the 80 header bytes, in hash-function byte order.
    pub fn block_hash(&self) -> Hash256 {
        self.block_hash
    }

    /// Header version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Hash of the preceding header.
    pub fn prev_block(&self) -> Hash256 {
        self.prev_block
    }

    /// Claimed transaction tree root.
    pub fn merkle_root(&self) -> Hash256 {
        self.merkle_root
    }

    /// Producer-asserted seconds since epoch.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Compact proof-of-work target.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Header nonce.
    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    /// Leaves in the full transaction tree; 0 for a bare header.
    pub fn total_transactions(&self) -> u32 {
        self.proof.as_ref().map_or(0, |p| p.total_transactions)
    }

    /// Proof hashes in depth-first order; empty for a bare header.
    pub fn hashes(&self) -> &[Hash256] {
        self.proof
            .as_ref()
            .map(|p| p.hashes.as_slice())
            .unwrap_or_default()
    }

    /// Packed proof flags; empty for a bare header.
    pub fn flags(&self) -> &[u8] {
        self.proof
            .as_ref()
            .map(|p| p.flags.as_slice())
            .unwrap_or_default()
    }

    /// The attached proof, if this came from a merkleblock message.
    pub fn proof(&self) -> Option<&PartialMerkleTree> {
        self.proof.as_ref()
    }

    /// Chain height, or [`UNKNOWN_HEIGHT`].
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True once a collaborator has placed the header in its chain.
    pub fn has_known_height(&self) -> bool {
        self.height != UNKNOWN_HEIGHT
    }

    /// Assign the chain height. Callers set this once, under their own
    /// synchronization, when adopting the header into their index.
    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    /// Compact target expanded to an integer.
    pub fn target_value(&self) -> U256 {
        compact_to_target(self.target).value
    }

    /// The 80 canonical header bytes.
    pub fn header_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..36].copy_from_slice(self.prev_block.as_bytes());
        buf[36..68].copy_from_slice(self.merkle_root.as_bytes());
        buf[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[72..76].copy_from_slice(&self.target.to_le_bytes());
        buf[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        buf
    }

    /// Serialize back to the message shape this header came from.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode(self)
    }

    fn has_merkle_proof(&self) -> bool {
        self.total_transactions() > 0 && !self.hashes().is_empty()
    }

    fn merkle_match(&self) -> Result<Option<MerkleMatch>, TreeError> {
        match &self.proof {
            Some(proof) => proof.extract_matches().map(Some),
            None => Ok(None),
        }
    }

    /// True if the proof's recomputed root matches `merkle_root`. Headers
    /// without a (non-empty) proof have nothing to contradict.
    fn merkle_root_matches(&self) -> Result<bool, TreeError> {
        if !self.has_merkle_proof() {
            return Ok(true);
        }
        let matched = self.merkle_match()?;
        Ok(matched.is_some_and(|m| m.root == self.merkle_root))
    }

    /// Merkle proof (when present) and proof of work both check out.
    ///
    /// This only checks the hash against the target stated in the header,
    /// not whether that target is right for the block's chain position; see
    /// [`BlockHeader::verify_periodic_retarget`] and [`BlockHeader::verify_lwma`].
    pub fn is_valid(&self) -> Result<bool, TreeError> {
        let merkle_ok = self.merkle_root_matches()?;
        let pow_ok = target_satisfied_by(&self.block_hash, &compact_to_target(self.target));

        if !merkle_ok || !pow_ok {
            tracing::debug!(
                block_hash = %self.block_hash,
                merkle_ok,
                pow_ok,
                "header failed validation"
            );
        }
        Ok(merkle_ok && pow_ok)
    }

    /// [`BlockHeader::is_valid`] plus chain policy: the target must lie
    /// within the chain's proof-of-work limit and the timestamp may not run
    /// more than `max_time_drift_secs` past `now`.
    pub fn validate_at(&self, now: u64, params: &ChainParams) -> Result<bool, TreeError> {
        let merkle_ok = self.merkle_root_matches()?;
        let pow_ok = check_proof_of_work(&self.block_hash, self.target, params.max_target());
        let time_ok = u64::from(self.timestamp)
            <= now.saturating_add(u64::from(params.max_time_drift_secs));

        if !(merkle_ok && pow_ok && time_ok) {
            tracing::debug!(
                block_hash = %self.block_hash,
                merkle_ok,
                pow_ok,
                time_ok,
                "header failed chain policy"
            );
        }
        Ok(merkle_ok && pow_ok && time_ok)
    }

    /// Leaves the proof marks as present. Meaningful only when the root
    /// also matches.
    pub fn tx_hashes(&self) -> Result<Vec<Hash256>, TreeError> {
        Ok(self.merkle_match()?.map(|m| m.matched).unwrap_or_default())
    }

    /// True if the proof verifies against `merkle_root` and proves `tx_hash`.
    pub fn contains_tx_hash(&self, tx_hash: &Hash256) -> bool {
        match self.merkle_match() {
            Ok(Some(m)) => m.root == self.merkle_root && m.matched.contains(tx_hash),
            _ => false,
        }
    }

    /// Check the stated target against the periodic retarget rule using
    /// this chain's default parameters.
    pub fn verify_periodic_retarget(
        &self,
        previous: &BlockHeader,
        interval_start: Option<&BlockHeader>,
        transition_time: u32,
    ) -> Result<bool, RetargetError> {
        retarget::verify_periodic_retarget(
            self,
            previous,
            interval_start,
            transition_time,
            &ChainParams::default(),
        )
    }

    /// Check the stated target against the LWMA rule using this chain's
    /// default parameters. `window` is oldest-first.
    pub fn verify_lwma(
        &self,
        window: &[BlockHeader],
        transition_time: u32,
    ) -> Result<bool, RetargetError> {
        lwma::verify_lwma(self, window, transition_time, &ChainParams::default())
    }
}
