//! # Wire Codec
//!
//! Bare 80-byte `headers` entries and `merkleblock` payloads.

pub mod merkle_block;
pub mod varint;

pub use merkle_block::{decode, decode_with_limit, encode};
pub use varint::{read_varint, write_varint};
