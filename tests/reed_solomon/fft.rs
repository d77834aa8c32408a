//! FFT Transform Engine Tests
//!
//! Round-trip and linearity checks for the additive FFT over both fields,
//! on element slices and on whole shard rows.

use leopard_rs::reed_solomon::fft::{fft, ifft, FftTables, ShardRows};
use leopard_rs::reed_solomon::galois::{GaloisTables, Gf16, Gf8};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// Element round trips
// ============================================================================

#[test]
fn test_gf8_inverse_of_forward_is_identity() {
    let gf = GaloisTables::<Gf8>::new();
    let tables = FftTables::new(&gf);
    let mut rng = StdRng::seed_from_u64(1);

    for log_size in 0..=8 {
        let size = 1usize << log_size;
        for offset in (0..=256 - size).step_by(size.max(32)) {
            let original: Vec<u8> = (0..size).map(|_| rng.random()).collect();
            let mut data = original.clone();
            tables.forward(&gf, &mut data, offset);
            tables.inverse(&gf, &mut data, offset);
            assert_eq!(data, original, "size {size} offset {offset}");
        }
    }
}

#[test]
fn test_gf16_inverse_of_forward_is_identity() {
    let gf = GaloisTables::<Gf16>::new();
    let tables = FftTables::new(&gf);
    let mut rng = StdRng::seed_from_u64(2);

    for size in [1usize, 2, 8, 128, 1024] {
        let original: Vec<u16> = (0..size).map(|_| rng.random()).collect();
        let mut data = original.clone();
        tables.forward(&gf, &mut data, 0);
        tables.inverse(&gf, &mut data, 0);
        assert_eq!(data, original, "size {size}");
    }
}

#[test]
fn test_gf16_forward_of_inverse_is_identity() {
    let gf = GaloisTables::<Gf16>::new();
    let tables = FftTables::new(&gf);
    let mut rng = StdRng::seed_from_u64(3);

    let original: Vec<u16> = (0..256).map(|_| rng.random()).collect();
    let mut data = original.clone();
    tables.inverse(&gf, &mut data, 512);
    tables.forward(&gf, &mut data, 512);
    assert_eq!(data, original);
}

#[test]
fn test_forward_is_linear() {
    let gf = GaloisTables::<Gf8>::new();
    let tables = FftTables::new(&gf);
    let mut rng = StdRng::seed_from_u64(4);

    let a: Vec<u8> = (0..64).map(|_| rng.random()).collect();
    let b: Vec<u8> = (0..64).map(|_| rng.random()).collect();
    let mut sum: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();

    let (mut fa, mut fb) = (a.clone(), b.clone());
    tables.forward(&gf, &mut fa, 64);
    tables.forward(&gf, &mut fb, 64);
    tables.forward(&gf, &mut sum, 64);

    let expected: Vec<u8> = fa.iter().zip(&fb).map(|(x, y)| x ^ y).collect();
    assert_eq!(sum, expected);
}

// ============================================================================
// Shard rows
// ============================================================================

#[test]
fn test_shard_rows_round_trip() {
    let gf = GaloisTables::<Gf16>::new();
    let tables = FftTables::new(&gf);
    let mut rng = StdRng::seed_from_u64(5);

    let original: Vec<Vec<u8>> = (0..16)
        .map(|_| (0..64).map(|_| rng.random()).collect())
        .collect();
    let mut rows = original.clone();

    ifft(&mut ShardRows::new(&mut rows, &gf), tables.skew(), 16, 16, 16);
    assert_ne!(rows, original);
    fft(&mut ShardRows::new(&mut rows, &gf), tables.skew(), 16, 16, 16);
    assert_eq!(rows, original);
}

#[test]
fn test_shard_rows_agree_with_element_transform_per_column() {
    let gf = GaloisTables::<Gf8>::new();
    let tables = FftTables::new(&gf);
    let mut rng = StdRng::seed_from_u64(6);

    let mut rows: Vec<Vec<u8>> = (0..8)
        .map(|_| (0..16).map(|_| rng.random()).collect())
        .collect();
    let columns: Vec<Vec<u8>> = (0..16)
        .map(|c| rows.iter().map(|row| row[c]).collect())
        .collect();

    fft(&mut ShardRows::new(&mut rows, &gf), tables.skew(), 8, 8, 32);

    for (c, column) in columns.into_iter().enumerate() {
        let mut expected = column;
        tables.forward(&gf, &mut expected, 32);
        let got: Vec<u8> = rows.iter().map(|row| row[c]).collect();
        assert_eq!(got, expected, "column {c}");
    }
}
