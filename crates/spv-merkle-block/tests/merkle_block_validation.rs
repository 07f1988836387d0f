//! # Merkleblock Validation Tests
//!
//! End-to-end checks through the public API.
//!
//! ## Test Categories
//!
//! 1. **Known Vectors** - Bitcoin's genesis header
//! 2. **Proof Tampering** - Flipped flag bits, flipped hash bytes
//! 3. **Proof Completeness** - Every match set over a 7-leaf tree
//! 4. **Retargeting** - Periodic and LWMA chains through the validator
//! 5. **Properties** - Codec round-trips, compact target monotonicity

use primitive_types::U256;
use proptest::prelude::*;
use spv_merkle_block::{
    compact_to_target, decode, encode, merkle_root, target_to_compact, BlockHeader, ChainParams,
    DecodeError, FixedTimeSource, Hash256, HeaderValidator, MerkleBlockApi, PartialMerkleTree,
    SpvError, UNKNOWN_HEIGHT,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

const GENESIS_HASH: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
const GENESIS_MERKLE_ROOT: &str =
    "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";
const GENESIS_TIME: u32 = 1_231_006_505;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn genesis_bytes() -> Vec<u8> {
    let hex_header = format!(
        "01000000{}{}{}",
        "00".repeat(32),
        "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a",
        "29ab5f49ffff001d1dac2b7c"
    );
    hex::decode(hex_header).unwrap()
}

/// Genesis as a merkleblock proving its single (coinbase) transaction.
fn genesis_merkleblock(flags: u8) -> Vec<u8> {
    let root = Hash256::from_display_hex(GENESIS_MERKLE_ROOT).unwrap();
    let mut bytes = genesis_bytes();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.push(1);
    bytes.extend_from_slice(root.as_bytes());
    bytes.push(1);
    bytes.push(flags);
    bytes
}

fn genesis_validator() -> HeaderValidator<FixedTimeSource> {
    HeaderValidator::with_clock(ChainParams::default(), FixedTimeSource(u64::from(GENESIS_TIME)))
}

fn make_hash(n: u8) -> Hash256 {
    let mut h = [0u8; 32];
    h[0] = n;
    h[31] = n.wrapping_mul(7);
    Hash256::from_bytes(h)
}

// =============================================================================
// KNOWN VECTORS
// =============================================================================

#[test]
fn test_genesis_header_decodes() {
    init_tracing();
    let header = decode(&genesis_bytes()).unwrap();

    assert_eq!(header.block_hash().to_string(), GENESIS_HASH);
    assert_eq!(header.merkle_root().to_string(), GENESIS_MERKLE_ROOT);
    assert_eq!(header.version(), 1);
    assert_eq!(header.timestamp(), GENESIS_TIME);
    assert_eq!(header.target(), 0x1d00_ffff);
    assert_eq!(header.nonce(), 2_083_236_893);
    assert!(header.prev_block().is_zero());
    assert_eq!(header.height(), UNKNOWN_HEIGHT);
    assert_eq!(encode(&header), genesis_bytes());
}

#[test]
fn test_genesis_header_valid() {
    init_tracing();
    let validator = genesis_validator();
    let header = validator.decode_block(&genesis_bytes()).unwrap();
    assert!(header.is_valid().unwrap());
    assert!(validator.validate_block(&header).unwrap());
}

#[test]
fn test_genesis_merkleblock_proves_coinbase() {
    init_tracing();
    let validator = genesis_validator();
    let coinbase = Hash256::from_display_hex(GENESIS_MERKLE_ROOT).unwrap();
    let header = validator.decode_block(&genesis_merkleblock(0x01)).unwrap();

    assert!(validator.validate_block(&header).unwrap());
    assert!(validator.contains_transaction(&header, &coinbase));
    assert_eq!(header.tx_hashes().unwrap(), vec![coinbase]);
    assert_eq!(header.block_hash().to_string(), GENESIS_HASH);
}

// =============================================================================
// PROOF TAMPERING
// =============================================================================

#[test]
fn test_flipped_flag_drops_match() {
    let validator = genesis_validator();
    let coinbase = Hash256::from_display_hex(GENESIS_MERKLE_ROOT).unwrap();
    let header = validator.decode_block(&genesis_merkleblock(0x00)).unwrap();

    // Root still matches, but nothing is proven.
    assert!(validator.validate_block(&header).unwrap());
    assert!(!validator.contains_transaction(&header, &coinbase));
}

#[test]
fn test_flipped_hash_byte_invalidates() {
    let validator = genesis_validator();
    let mut bytes = genesis_merkleblock(0x01);
    bytes[80 + 4 + 1] ^= 0x01;
    let header = validator.decode_block(&bytes).unwrap();

    assert!(!header.is_valid().unwrap());
    assert!(!validator.validate_block(&header).unwrap());
    assert!(!validator.contains_transaction(&header, &header.hashes()[0]));
}

#[test]
fn test_flipped_header_byte_breaks_pow() {
    let mut bytes = genesis_bytes();
    bytes[76] ^= 0x01;
    let header = decode(&bytes).unwrap();
    assert_ne!(header.block_hash().to_string(), GENESIS_HASH);
    assert!(!header.is_valid().unwrap());
}

#[test]
fn test_declared_hashes_beyond_buffer() {
    let mut bytes = genesis_bytes();
    bytes.extend_from_slice(&7u32.to_le_bytes());
    bytes.push(5);
    for i in 0..3u8 {
        bytes.extend_from_slice(&[i; 32]);
    }
    assert!(matches!(
        genesis_validator().decode_block(&bytes),
        Err(SpvError::Decode(DecodeError::Truncated { .. }))
    ));
}

// =============================================================================
// PROOF COMPLETENESS
// =============================================================================

#[test]
fn test_every_match_set_over_seven_leaves() {
    let leaves: Vec<Hash256> = (1..=7).map(make_hash).collect();
    let root = merkle_root(&leaves);

    for mask in 0u32..(1 << leaves.len()) {
        let matched: Vec<Hash256> = leaves
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, h)| *h)
            .collect();

        let proof = PartialMerkleTree::from_leaves(&leaves, &matched);
        let result = proof.extract_matches().unwrap();
        assert_eq!(result.root, root, "mask {:#09b}", mask);
        assert_eq!(result.matched, matched, "mask {:#09b}", mask);

        let header = BlockHeader::new(1, Hash256::ZERO, root, 0, 0x207f_ffff, 0).with_proof(proof);
        let decoded = decode(&encode(&header)).unwrap();
        for leaf in &leaves {
            assert_eq!(decoded.contains_tx_hash(leaf), matched.contains(leaf));
        }
    }
}

// =============================================================================
// RETARGETING
// =============================================================================

/// `count` headers spaced `spacing` seconds apart, heights from `first`.
fn chain(first: u32, count: u32, start: u32, spacing: u32, bits: u32) -> Vec<BlockHeader> {
    (0..count)
        .map(|i| {
            BlockHeader::new(1, Hash256::ZERO, Hash256::ZERO, start + i * spacing, bits, i)
                .with_height(first + i)
        })
        .collect()
}

#[test]
fn test_periodic_retarget_across_interval() {
    let validator = genesis_validator();
    let params = validator.params().clone();
    let bits = 0x1c0f_ffff;

    // Heights 72..=143 took twice as long as scheduled.
    let interval = chain(72, 72, 1_600_000_000, params.block_interval_secs * 2, bits);
    let first = &interval[0];
    let last = &interval[71];
    let boundary_time = last.timestamp() + params.block_interval_secs * 2;

    let expected_value = {
        let timespan = u64::from(boundary_time - first.timestamp());
        compact_to_target(bits).value * U256::from(timespan) / U256::from(params.target_timespan())
    };
    let eased = target_to_compact(expected_value);
    let good = BlockHeader::new(1, Hash256::ZERO, Hash256::ZERO, boundary_time, eased, 0)
        .with_height(144);
    let stale = BlockHeader::new(1, Hash256::ZERO, Hash256::ZERO, boundary_time, bits, 0)
        .with_height(144);

    assert!(validator
        .verify_periodic_retarget(&good, last, Some(first), 0)
        .unwrap());
    assert!(!validator
        .verify_periodic_retarget(&stale, last, None, first.timestamp())
        .unwrap());
    // Mid-interval the target carries over.
    assert!(validator
        .verify_periodic_retarget(&interval[10], &interval[9], None, 0)
        .unwrap());
}

#[test]
fn test_lwma_through_validator() {
    let validator = genesis_validator();
    let spacing = validator.params().block_interval_secs;
    let bits = 0x1c0f_ffff;
    let window = chain(1000, 73, 1_600_000_000, spacing, bits);
    let next = BlockHeader::new(1, Hash256::ZERO, Hash256::ZERO, 1_600_100_000, bits, 0)
        .with_height(1073);

    // 73 headers: the oldest supplies the window's start time.
    assert!(validator.verify_lwma(&next, &window, 0).unwrap());
    // Exactly 72: the caller supplies it.
    assert!(validator
        .verify_lwma(&next, &window[1..], window[0].timestamp())
        .unwrap());
    assert!(validator.verify_lwma(&next, &window[1..], 0).is_err());
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn arb_hash() -> impl Strategy<Value = Hash256> {
    any::<[u8; 32]>().prop_map(Hash256::from_bytes)
}

fn arb_proof() -> impl Strategy<Value = PartialMerkleTree> {
    (1u32..64, prop::collection::vec(arb_hash(), 0..8)).prop_flat_map(|(extra, hashes)| {
        let total = hashes.len() as u32 + extra;
        let min_flags = hashes.len().div_ceil(8);
        prop::collection::vec(any::<u8>(), min_flags..min_flags + 3).prop_map(move |flags| {
            PartialMerkleTree {
                total_transactions: total,
                hashes: hashes.clone(),
                flags,
            }
        })
    })
}

proptest! {
    #[test]
    fn prop_merkleblock_roundtrip(
        version in any::<u32>(),
        prev in arb_hash(),
        root in arb_hash(),
        timestamp in any::<u32>(),
        bits in any::<u32>(),
        nonce in any::<u32>(),
        proof in prop::option::of(arb_proof()),
    ) {
        let mut header = BlockHeader::new(version, prev, root, timestamp, bits, nonce);
        if let Some(proof) = proof {
            header = header.with_proof(proof);
        }
        let bytes = encode(&header);
        let decoded = decode(&bytes).unwrap();
        prop_assert_eq!(&decoded, &header);
        prop_assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn prop_compact_roundtrip_is_stable(bits in 0x0300_0001u32..0x1d00_ffffu32) {
        let target = compact_to_target(bits);
        prop_assume!(target.is_usable());
        let normalized = target_to_compact(target.value);
        prop_assert_eq!(compact_to_target(normalized).value, target.value);
    }

    #[test]
    fn prop_truncated_message_rejected(cut in 0usize..80) {
        let bytes = genesis_bytes();
        prop_assert!(decode(&bytes[..cut]).is_err());
    }
}
