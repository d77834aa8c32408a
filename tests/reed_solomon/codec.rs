//! Encode and Verify Tests
//!
//! Tests for ReedSolomon construction, encode, verify and shard set validation.

use leopard_rs::{CodecOptions, FieldChoice, FieldKind, ReedSolomon, RsError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_shards(k: usize, m: usize, len: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut shards: Vec<Vec<u8>> = (0..k)
        .map(|_| {
            let mut shard = vec![0u8; len];
            rng.fill(&mut shard[..]);
            shard
        })
        .collect();
    shards.extend((0..m).map(|_| vec![0u8; len]));
    shards
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_field_boundary_between_gf8_and_gf16() {
    // K + M decides the field
    for (k, m) in [(192, 64), (160, 65), (200, 56), (256, 0), (1, 255)] {
        let rs = ReedSolomon::new(k, m).unwrap();
        assert_eq!(rs.field(), FieldKind::Gf8, "({k}, {m})");
    }
    for (k, m) in [(193, 64), (257, 0), (2, 255)] {
        let rs = ReedSolomon::new(k, m).unwrap();
        assert_eq!(rs.field(), FieldKind::Gf16, "({k}, {m})");
    }
}

#[test]
fn test_invalid_construction() {
    assert!(matches!(
        ReedSolomon::new(0, 0),
        Err(RsError::InvalidShardNum { .. })
    ));

    let opts = CodecOptions::default().with_field(FieldChoice::Gf8);
    let err = ReedSolomon::with_options(250, 10, opts).unwrap_err();
    assert!(err.to_string().contains("GF(2^8)"));
}

// ============================================================================
// Encode and verify
// ============================================================================

#[test]
fn test_encode_then_verify() {
    for (k, m) in [(1, 1), (2, 1), (4, 4), (10, 5), (17, 3), (64, 64), (100, 28)] {
        let rs = ReedSolomon::new(k, m).unwrap();
        let mut shards = random_shards(k, m, 64, (k * 1000 + m) as u64);
        rs.encode(&mut shards).unwrap();
        assert!(rs.verify(&shards).unwrap(), "K={k} M={m}");
    }
}

#[test]
fn test_encode_is_deterministic_and_ignores_old_parity() {
    let rs = ReedSolomon::new(6, 4).unwrap();
    let mut a = random_shards(6, 4, 32, 1);
    let mut b = a.clone();
    for parity in &mut b[6..] {
        parity.fill(0xAB);
    }

    rs.encode(&mut a).unwrap();
    rs.encode(&mut b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_encode_leaves_data_untouched() {
    let rs = ReedSolomon::new(5, 3).unwrap();
    let mut shards = random_shards(5, 3, 40, 2);
    let data = shards[..5].to_vec();
    rs.encode(&mut shards).unwrap();
    assert_eq!(&shards[..5], &data[..]);
}

#[test]
fn test_encode_accepts_borrowed_slices() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut owned = random_shards(3, 2, 16, 3);
    let mut expected = owned.clone();
    rs.encode(&mut expected).unwrap();

    let mut borrowed: Vec<&mut [u8]> = owned.iter_mut().map(Vec::as_mut_slice).collect();
    rs.encode(&mut borrowed).unwrap();
    assert_eq!(owned, expected);
}

#[test]
fn test_all_zero_data_gives_zero_parity() {
    let rs = ReedSolomon::new(8, 4).unwrap();
    let mut shards = vec![vec![0u8; 16]; 12];
    shards[9].fill(1);
    rs.encode(&mut shards).unwrap();
    assert!(shards[8..].iter().all(|p| p.iter().all(|&b| b == 0)));
}

#[test]
fn test_gf16_forced_small_code() {
    let opts = CodecOptions::default().with_field(FieldChoice::Gf16);
    let rs = ReedSolomon::with_options(4, 2, opts).unwrap();
    let mut shards = random_shards(4, 2, 24, 4);
    rs.encode(&mut shards).unwrap();
    assert!(rs.verify(&shards).unwrap());
}

#[test]
fn test_sequential_and_parallel_agree() {
    let sequential = ReedSolomon::with_options(20, 10, CodecOptions::new(0, false)).unwrap();
    let parallel = ReedSolomon::with_options(
        20,
        10,
        CodecOptions::new(4, true).with_stripe_bytes(512),
    )
    .unwrap();

    let mut a = random_shards(20, 10, 1024, 5);
    let mut b = a.clone();
    sequential.encode(&mut a).unwrap();
    parallel.encode(&mut b).unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Corruption detection
// ============================================================================

#[test]
fn test_verify_detects_corruption_in_any_shard() {
    let rs = ReedSolomon::new(6, 3).unwrap();
    let mut shards = random_shards(6, 3, 32, 6);
    rs.encode(&mut shards).unwrap();

    for index in 0..shards.len() {
        let mut corrupted = shards.clone();
        corrupted[index][5] ^= 0x40;
        assert!(!rs.verify(&corrupted).unwrap(), "corruption in shard {index}");
    }
}

#[test]
fn test_verify_does_not_modify_input() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let mut shards = random_shards(4, 2, 16, 7);
    rs.encode(&mut shards).unwrap();
    shards[5][0] ^= 1;
    let before = shards.clone();
    assert!(!rs.verify(&shards).unwrap());
    assert_eq!(shards, before);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_shard_size_validation() {
    let rs = ReedSolomon::new(3, 2).unwrap();

    let mut unequal = random_shards(3, 2, 16, 8);
    unequal[4] = vec![0u8; 24];
    assert!(matches!(
        rs.encode(&mut unequal),
        Err(RsError::InvalidShardSize { .. })
    ));
    assert!(matches!(
        rs.verify(&unequal),
        Err(RsError::InvalidShardSize { .. })
    ));

    let mut unaligned = random_shards(3, 2, 12, 9);
    assert!(matches!(
        rs.encode(&mut unaligned),
        Err(RsError::InvalidShardSize { alignment: 8 })
    ));

    let mut empty = random_shards(3, 2, 0, 10);
    assert!(matches!(
        rs.encode(&mut empty),
        Err(RsError::InvalidShardSize { .. })
    ));
}

#[test]
fn test_slot_count_validation() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut short = random_shards(3, 1, 8, 11);
    assert!(matches!(rs.encode(&mut short), Err(RsError::TooFewShards)));
    assert!(matches!(rs.verify(&short), Err(RsError::TooFewShards)));

    let long = random_shards(3, 3, 8, 12);
    assert!(matches!(rs.verify(&long), Err(RsError::TooFewShards)));
}
