//! # Partial Merkle Tree Verification
//!
//! Rebuilds a Merkle root from a depth-first flag bitstream and the hashes a
//! peer supplied, collecting the leaves that were proven present.
//!
//! # Algorithm
//!
//! Starting at the root, each visited node consumes one flag bit:
//! - bit 0: consume one hash as the node's value and stop descending
//! - bit 1 at a leaf: consume one hash and record it as matched
//! - bit 1 inside the tree: recurse left, then right if the right child
//!   exists (otherwise the left value is reused), and hash the pair
//!
//! Every flag byte and every hash must be used exactly once.
//!
//! # Time Complexity: O(number of flag bits)

use serde::{Deserialize, Serialize};

use super::hashing::hash_concat;
use crate::domain::{Hash256, TreeError};

/// Outcome of a partial tree traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleMatch {
    /// Root recomputed from the flags and hashes.
    pub root: Hash256,
    /// Leaves proven present, in tree order.
    pub matched: Vec<Hash256>,
}

impl MerkleMatch {
    fn empty() -> Self {
        Self {
            root: Hash256::ZERO,
            matched: Vec::new(),
        }
    }
}

/// Partial Merkle tree as carried in a merkleblock message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialMerkleTree {
    /// Leaves in the full tree.
    pub total_transactions: u32,
    /// Node hashes in depth-first order.
    pub hashes: Vec<Hash256>,
    /// Traversal bits, least-significant bit first within each byte.
    pub flags: Vec<u8>,
}

impl PartialMerkleTree {
    /// Build the proof a full node would send for `matched` among `leaves`.
    pub fn from_leaves(leaves: &[Hash256], matched: &[Hash256]) -> Self {
        let total = leaves.len() as u32;
        if total == 0 {
            return Self::default();
        }

        let mut builder = TreeBuilder {
            leaves,
            is_match: leaves.iter().map(|l| matched.contains(l)).collect(),
            bits: Vec::new(),
            hashes: Vec::new(),
        };
        builder.build(tree_height(total), 0);

        let mut flags = vec![0u8; builder.bits.len().div_ceil(8)];
        for (i, bit) in builder.bits.iter().enumerate() {
            if *bit {
                flags[i / 8] |= 1 << (i % 8);
            }
        }

        Self {
            total_transactions: total,
            hashes: builder.hashes,
            flags,
        }
    }

    /// Recompute the root and the matched leaves.
    pub fn extract_matches(&self) -> Result<MerkleMatch, TreeError> {
        verify_partial_tree(self.total_transactions, &self.hashes, &self.flags)
    }
}

/// Smallest `h` with `2^h >= total_transactions`.
pub fn tree_height(total_transactions: u32) -> u32 {
    let mut height = 0;
    while tree_width(total_transactions, height) > 1 {
        height += 1;
    }
    height
}

/// Number of nodes in the row `level` steps above the leaves.
fn tree_width(total_transactions: u32, level: u32) -> u64 {
    (u64::from(total_transactions) + (1u64 << level) - 1) >> level
}

/// Verify a partial tree given as its raw parts.
///
/// An empty tree (no transactions or no hashes) yields a zero root and no
/// matches.
pub fn verify_partial_tree(
    total_transactions: u32,
    hashes: &[Hash256],
    flags: &[u8],
) -> Result<MerkleMatch, TreeError> {
    if total_transactions == 0 || hashes.is_empty() {
        return Ok(MerkleMatch::empty());
    }

    let height = tree_height(total_transactions);
    let mut walker = TreeWalker {
        total_transactions,
        height,
        hashes,
        flags,
        bits_used: 0,
        hashes_used: 0,
        matched: Vec::new(),
    };
    let root = walker.traverse(0, 0)?;

    if walker.hashes_used != hashes.len() {
        tracing::trace!(
            used = walker.hashes_used,
            supplied = hashes.len(),
            "partial tree left hashes unused"
        );
        return Err(TreeError::BadFormat(format!(
            "used {} of {} hashes",
            walker.hashes_used,
            hashes.len()
        )));
    }

    let bytes_used = walker.bits_used.div_ceil(8);
    if bytes_used != flags.len() {
        tracing::trace!(
            used = bytes_used,
            supplied = flags.len(),
            "partial tree left flag bytes unused"
        );
        return Err(TreeError::BadFormat(format!(
            "used {} of {} flag bytes",
            bytes_used,
            flags.len()
        )));
    }

    let padding = walker.bits_used % 8;
    if padding != 0 && flags[bytes_used - 1] >> padding != 0 {
        tracing::trace!(used = walker.bits_used, "partial tree set unused flag bits");
        return Err(TreeError::BadFormat(format!(
            "flag bits set past bit {}",
            walker.bits_used
        )));
    }

    Ok(MerkleMatch {
        root,
        matched: walker.matched,
    })
}

/// Merkle root over a complete leaf list, duplicating the last node of odd rows.
pub fn merkle_root(leaves: &[Hash256]) -> Hash256 {
    if leaves.is_empty() {
        return Hash256::ZERO;
    }

    let mut level: Vec<Hash256> = leaves.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| hash_concat(&pair[0], pair.get(1).unwrap_or(&pair[0])))
            .collect();
    }
    level[0]
}

struct TreeWalker<'a> {
    total_transactions: u32,
    height: u32,
    hashes: &'a [Hash256],
    flags: &'a [u8],
    bits_used: usize,
    hashes_used: usize,
    matched: Vec<Hash256>,
}

impl TreeWalker<'_> {
    fn next_flag(&mut self) -> Result<bool, TreeError> {
        let byte = self
            .flags
            .get(self.bits_used / 8)
            .ok_or_else(|| TreeError::BadFormat("ran out of flag bits".to_string()))?;
        let bit = (byte >> (self.bits_used % 8)) & 1 == 1;
        self.bits_used += 1;
        Ok(bit)
    }

    fn next_hash(&mut self) -> Result<Hash256, TreeError> {
        let hash = self
            .hashes
            .get(self.hashes_used)
            .copied()
            .ok_or_else(|| TreeError::BadFormat("ran out of hashes".to_string()))?;
        self.hashes_used += 1;
        Ok(hash)
    }

    fn traverse(&mut self, depth: u32, position: u32) -> Result<Hash256, TreeError> {
        let flag = self.next_flag()?;
        let level = self.height - depth;

        if !flag || level == 0 {
            let hash = self.next_hash()?;
            if flag {
                self.matched.push(hash);
            }
            return Ok(hash);
        }

        let left = self.traverse(depth + 1, position * 2)?;
        let right_position = u64::from(position) * 2 + 1;
        let right = if right_position < tree_width(self.total_transactions, level - 1) {
            let right = self.traverse(depth + 1, position * 2 + 1)?;
            if right == left {
                return Err(TreeError::DuplicateSibling { depth, position });
            }
            right
        } else {
            left
        };

        Ok(hash_concat(&left, &right))
    }
}

struct TreeBuilder<'a> {
    leaves: &'a [Hash256],
    is_match: Vec<bool>,
    bits: Vec<bool>,
    hashes: Vec<Hash256>,
}

impl TreeBuilder<'_> {
    fn total(&self) -> u32 {
        self.leaves.len() as u32
    }

    fn node_hash(&self, level: u32, position: u32) -> Hash256 {
        if level == 0 {
            return self.leaves[position as usize];
        }
        let left = self.node_hash(level - 1, position * 2);
        let right = if u64::from(position) * 2 + 1 < tree_width(self.total(), level - 1) {
            self.node_hash(level - 1, position * 2 + 1)
        } else {
            left
        };
        hash_concat(&left, &right)
    }

    fn build(&mut self, level: u32, position: u32) {
        let start = (position as usize) << level;
        let end = ((position as usize + 1) << level).min(self.leaves.len());
        let parent_of_match = self.is_match[start..end].iter().any(|m| *m);
        self.bits.push(parent_of_match);

        if level == 0 || !parent_of_match {
            let hash = self.node_hash(level, position);
            self.hashes.push(hash);
            return;
        }

        self.build(level - 1, position * 2);
        if u64::from(position) * 2 + 1 < tree_width(self.total(), level - 1) {
            self.build(level - 1, position * 2 + 1);
        }
    }
}
