//! # Merkleblock Codec
//!
//! Layout, all integers little-endian:
//!
//! ```text
//! version u32 | prev_block [32] | merkle_root [32] | timestamp u32 | target u32 | nonce u32
//! -- end of a bare header (exactly 80 bytes) --
//! total_transactions u32 | varint n | n * [32] hashes | varint m | m flag bytes
//! ```
//!
//! A buffer of exactly 80 bytes is a bare header; anything longer carries
//! proof fields, possibly all empty.

use super::varint::{read_varint, write_varint};
use crate::algorithms::hashing::double_sha256;
use crate::algorithms::merkle_verifier::PartialMerkleTree;
use crate::domain::{
    invariant_proof_shape, invariant_transaction_bound, BlockHeader, DecodeError, Hash256,
    HEADER_SIZE, MAX_TRANSACTIONS, UNKNOWN_HEIGHT,
};

/// Cursor over a borrowed message.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::Truncated {
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(raw))
    }

    fn read_hash(&mut self) -> Result<Hash256, DecodeError> {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(self.take(Hash256::LEN)?);
        Ok(Hash256::from_bytes(raw))
    }

    fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let (value, used) = read_varint(&self.buf[self.pos..])?;
        self.pos += used;
        Ok(value)
    }

    /// Read a count of `item_size`-byte items, refusing counts the buffer
    /// cannot hold before anything is allocated.
    fn read_count(&mut self, item_size: usize) -> Result<usize, DecodeError> {
        let count = self.read_varint()?;
        let needed = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(item_size))
            .unwrap_or(usize::MAX);
        if needed > self.remaining() {
            return Err(DecodeError::Truncated {
                needed,
                available: self.remaining(),
            });
        }
        Ok(needed / item_size)
    }
}

/// Decode a bare header or merkleblock message with the default
/// transaction cap.
pub fn decode(message: &[u8]) -> Result<BlockHeader, DecodeError> {
    decode_with_limit(message, MAX_TRANSACTIONS)
}

/// Decode a bare header or merkleblock message.
///
/// The block hash is computed here, over the first 80 bytes.
pub fn decode_with_limit(message: &[u8], max_transactions: u32) -> Result<BlockHeader, DecodeError> {
    let mut reader = Reader::new(message);

    let version = reader.read_u32()?;
    let prev_block = reader.read_hash()?;
    let merkle_root = reader.read_hash()?;
    let timestamp = reader.read_u32()?;
    let target = reader.read_u32()?;
    let nonce = reader.read_u32()?;
    let block_hash = double_sha256(&message[..HEADER_SIZE]);

    let proof = if reader.remaining() == 0 {
        None
    } else {
        Some(decode_proof(&mut reader, max_transactions)?)
    };

    if reader.remaining() != 0 {
        tracing::trace!(
            block_hash = %block_hash,
            trailing = reader.remaining(),
            "merkleblock has trailing bytes"
        );
        return Err(DecodeError::Malformed(format!(
            "{} trailing bytes",
            reader.remaining()
        )));
    }

    Ok(BlockHeader::from_parts(
        block_hash,
        version,
        prev_block,
        merkle_root,
        timestamp,
        target,
        nonce,
        proof,
        UNKNOWN_HEIGHT,
    ))
}

fn decode_proof(reader: &mut Reader<'_>, max_transactions: u32) -> Result<PartialMerkleTree, DecodeError> {
    let total_transactions = reader.read_u32()?;
    invariant_transaction_bound(total_transactions, max_transactions)?;

    let hash_count = reader.read_count(Hash256::LEN)?;
    let hashes = (0..hash_count)
        .map(|_| reader.read_hash())
        .collect::<Result<Vec<_>, _>>()?;

    let flag_count = reader.read_count(1)?;
    let flags = reader.take(flag_count)?.to_vec();

    invariant_proof_shape(total_transactions, &hashes, &flags)?;

    Ok(PartialMerkleTree {
        total_transactions,
        hashes,
        flags,
    })
}

/// Encode a header in the shape it was decoded from: 80 bytes for a bare
/// header, header plus proof fields otherwise.
pub fn encode(header: &BlockHeader) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE);
    out.extend_from_slice(&header.header_bytes());

    if let Some(proof) = header.proof() {
        out.reserve(4 + 9 + proof.hashes.len() * Hash256::LEN + 9 + proof.flags.len());
        out.extend_from_slice(&proof.total_transactions.to_le_bytes());
        write_varint(&mut out, proof.hashes.len() as u64);
        for hash in &proof.hashes {
            out.extend_from_slice(hash.as_bytes());
        }
        write_varint(&mut out, proof.flags.len() as u64);
        out.extend_from_slice(&proof.flags);
    }

    out
}
