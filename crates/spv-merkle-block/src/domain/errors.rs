//! # Domain Errors
//!
//! Error types for the merkle-block core.
//!
//! Malformed input and contract violations are typed errors. A well-formed
//! block that fails PoW or Merkle checks is not an error; those surface as
//! `Ok(false)` so the caller can tell a bad peer from a broken message.

use thiserror::Error;

/// Wire decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A declared length runs past the end of the buffer.
    #[error("Truncated message: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required to finish the current field
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Trailing garbage or internally inconsistent counts.
    #[error("Malformed message: {0}")]
    Malformed(String),
}

/// Partial Merkle tree reconstruction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Flags or hashes were not consumed exactly.
    #[error("Bad partial merkle tree format: {0}")]
    BadFormat(String),

    /// An existing right child equals its left sibling (CVE-2012-2459).
    #[error("Duplicate sibling hashes at depth {depth}, position {position}")]
    DuplicateSibling {
        /// Depth of the offending parent node
        depth: u32,
        /// Position of the offending parent node within its row
        position: u32,
    },
}

/// Difficulty retarget contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetargetError {
    /// Transition time supplied off a retarget boundary, or missing on one.
    #[error("Bad transition time {transition_time} for height {height}")]
    BadTransitionTime {
        /// Height of the header being checked
        height: u32,
        /// Transition time the caller supplied
        transition_time: u32,
    },

    /// The header has not been assigned a chain height yet.
    #[error("Header height is unknown")]
    UnknownHeight,

    /// Not enough ancestors to run the averaging window.
    #[error("Insufficient ancestor window: {got} < {required}")]
    InsufficientWindow {
        /// Headers supplied
        got: usize,
        /// Headers required
        required: usize,
    },

    /// An ancestor in the window carries a negative or overflowing target.
    #[error("Unusable target {bits:#010x} at height {height}")]
    UnusableTarget {
        /// Height of the offending ancestor
        height: u32,
        /// Its compact target
        bits: u32,
    },
}

/// Umbrella error for the application service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpvError {
    /// Message could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Partial Merkle tree was malformed.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Retarget inputs violated the calling contract.
    #[error(transparent)]
    Retarget(#[from] RetargetError),
}
