//! # Algorithms Module
//!
//! Hashing, partial Merkle tree verification, proof of work and the two
//! difficulty retarget rules.

pub mod hashing;
pub mod lwma;
pub mod merkle_verifier;
pub mod pow;
pub mod retarget;

pub use hashing::{double_sha256, hash_concat};
pub use lwma::{lwma_next_target, verify_lwma};
pub use merkle_verifier::{
    merkle_root, tree_height, verify_partial_tree, MerkleMatch, PartialMerkleTree,
};
pub use pow::{
    check_proof_of_work, compact_to_target, target_satisfied_by, target_to_compact,
    work_from_compact, Target,
};
pub use retarget::{periodic_next_target, verify_periodic_retarget};
