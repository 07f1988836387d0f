//! # SPV Merkle Block
//!
//! Header and merkleblock validation for an SPV light client.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Let a light client trust a block header, and the transactions a peer
//! claims it contains, without downloading the block:
//! - 80-byte headers and `merkleblock` messages decoded from the wire
//! - Partial Merkle tree proofs checked against the header's Merkle root
//! - Proof of work checked against the compact target
//! - The stated target checked against the chain's retarget rules
//!
//! ## Retarget Rules
//!
//! | Rule | Window | Applied |
//! |------|--------|---------|
//! | Periodic | 72 blocks at 120 s | On every 72nd height, 4x clamp |
//! | LWMA | Last 72 blocks | Every block, weighted by recency |
//!
//! ## Module Structure
//!
//! ```text
//! spv-merkle-block/
//! ├── domain/          # BlockHeader, Hash256, errors, invariants
//! ├── algorithms/      # Hashing, partial Merkle tree, PoW, retargets
//! ├── codec/           # Wire format: headers, merkleblocks, varints
//! ├── ports/           # API trait (inbound) + clock trait (outbound)
//! ├── adapters/        # System and fixed clocks
//! ├── application/     # HeaderValidator wiring params and clock
//! └── config.rs        # ChainParams
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod codec;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{FixedTimeSource, SystemTimeSource};
pub use algorithms::{
    check_proof_of_work, compact_to_target, double_sha256, lwma_next_target, merkle_root,
    periodic_next_target, target_to_compact, verify_partial_tree, work_from_compact, MerkleMatch,
    PartialMerkleTree, Target,
};
pub use application::HeaderValidator;
pub use codec::{decode, decode_with_limit, encode};
pub use config::ChainParams;
pub use domain::{
    BlockHeader, DecodeError, Hash256, RetargetError, SpvError, TreeError,
    BLOCK_DIFFICULTY_INTERVAL, BLOCK_INTERVAL_SECS, LWMA_BLOCKS, MAX_PROOF_OF_WORK,
    UNKNOWN_HEIGHT,
};
pub use ports::{MerkleBlockApi, TimeSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
