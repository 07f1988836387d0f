//! # Hashing
//!
//! Double SHA-256, the hash used for block headers and Merkle nodes.

use sha2::{Digest, Sha256};

use crate::domain::Hash256;

/// SHA-256 applied twice.
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut output = [0u8; 32];
    output.copy_from_slice(&second);
    Hash256::from_bytes(output)
}

/// Hash two Merkle nodes together.
pub fn hash_concat(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_bytes());
    buf[32..].copy_from_slice(right.as_bytes());
    double_sha256(&buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_sha256_empty() {
        // SHA256(SHA256("")), a widely published vector.
        let hash = double_sha256(b"");
        assert_eq!(
            hex::encode(hash.as_bytes()),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_hash_concat_order_matters() {
        let a = Hash256::from_bytes([1u8; 32]);
        let b = Hash256::from_bytes([2u8; 32]);
        assert_ne!(hash_concat(&a, &b), hash_concat(&b, &a));
    }
}
