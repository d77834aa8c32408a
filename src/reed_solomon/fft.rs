//! Additive FFT over binary fields (Lin-Chung-Han novel polynomial basis)
//!
//! ## Transforms
//!
//! Both transforms work on a power-of-two number of rows. A row is either a
//! single field element ([`ElementRows`]) or a whole shard buffer
//! ([`ShardRows`]); the butterfly network is the same. Each butterfly is one
//! XOR of rows plus one multiply-accumulate by a skew factor, looked up by
//! position in the evaluation domain (`offset`).
//!
//! ```text
//! IFFT (decimation in time):   y ^= x;  x ^= y * skew
//! FFT  (decimation in time):   x ^= y * skew;  y ^= x
//! ```
//!
//! Running the layers in opposite orders makes the two transforms exact inverses.
//! A skew log equal to `MODULUS` stands for the zero element and skips the multiply.
//!
//! ## Tables
//!
//! [`FftTables`] holds the skew factors (as logs) for every domain position and
//! the Walsh-Hadamard transform of the log table, which the decoder uses to
//! evaluate the erasure locator polynomial in `O(n log n)`.

use super::galois::{BoundaryStats, Field, FieldElement, GaloisTables};
use super::slice_ops::xor_slice;
use std::fmt;

/// Rows the butterfly network operates on
pub trait ButterflyRows<F: Field> {
    /// Prepared form of a skew factor
    type Multiplier;

    fn row_count(&self) -> usize;

    fn multiplier(&self, log_m: F::Elem) -> Self::Multiplier;

    /// `rows[dst] ^= rows[src]`
    fn xor_into(&mut self, dst: usize, src: usize);

    /// `rows[dst] ^= rows[src] * m`
    fn mul_add_into(&mut self, dst: usize, src: usize, m: &Self::Multiplier);
}

/// A slice of field elements, one element per row
pub struct ElementRows<'a, F: Field> {
    data: &'a mut [F::Elem],
    tables: &'a GaloisTables<F>,
}

impl<'a, F: Field> ElementRows<'a, F> {
    pub fn new(data: &'a mut [F::Elem], tables: &'a GaloisTables<F>) -> Self {
        Self { data, tables }
    }
}

impl<F: Field> ButterflyRows<F> for ElementRows<'_, F> {
    type Multiplier = F::Elem;

    fn row_count(&self) -> usize {
        self.data.len()
    }

    fn multiplier(&self, log_m: F::Elem) -> F::Elem {
        log_m
    }

    #[inline]
    fn xor_into(&mut self, dst: usize, src: usize) {
        let value = self.data[dst].to_u32() ^ self.data[src].to_u32();
        self.data[dst] = F::Elem::from_u32(value);
    }

    #[inline]
    fn mul_add_into(&mut self, dst: usize, src: usize, log_m: &F::Elem) {
        let product = self.tables.mul_log(self.data[src], *log_m);
        self.data[dst] = F::Elem::from_u32(self.data[dst].to_u32() ^ product.to_u32());
    }
}

/// Equal-length shard buffers, one buffer per row
pub struct ShardRows<'a, F: Field> {
    rows: &'a mut [Vec<u8>],
    tables: &'a GaloisTables<F>,
}

impl<'a, F: Field> ShardRows<'a, F> {
    pub fn new(rows: &'a mut [Vec<u8>], tables: &'a GaloisTables<F>) -> Self {
        Self { rows, tables }
    }

    fn pair(&mut self, dst: usize, src: usize) -> (&mut [u8], &[u8]) {
        debug_assert_ne!(dst, src);
        if dst < src {
            let (low, high) = self.rows.split_at_mut(src);
            (low[dst].as_mut_slice(), high[0].as_slice())
        } else {
            let (low, high) = self.rows.split_at_mut(dst);
            (high[0].as_mut_slice(), low[src].as_slice())
        }
    }
}

impl<F: Field> ButterflyRows<F> for ShardRows<'_, F> {
    type Multiplier = F::MulTable;

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn multiplier(&self, log_m: F::Elem) -> F::MulTable {
        F::mul_table(self.tables, log_m)
    }

    #[inline]
    fn xor_into(&mut self, dst: usize, src: usize) {
        let (dst, src) = self.pair(dst, src);
        xor_slice(dst, src);
    }

    #[inline]
    fn mul_add_into(&mut self, dst: usize, src: usize, table: &F::MulTable) {
        let (dst, src) = self.pair(dst, src);
        F::mul_add_slice(table, dst, src);
    }
}

/// Inverse transform (interpolation) of the first `size` rows in place
///
/// Rows at or past `truncated` must be zero on entry.
pub fn ifft<F: Field, R: ButterflyRows<F>>(
    rows: &mut R,
    skew: &[F::Elem],
    size: usize,
    truncated: usize,
    offset: usize,
) {
    debug_assert!(size.is_power_of_two());
    debug_assert!(rows.row_count() >= size);

    let mut dist = 1;
    while dist < size {
        for r in (0..truncated).step_by(dist * 2) {
            let log_m = skew[r + dist + offset - 1];
            for i in r..r + dist {
                rows.xor_into(i + dist, i);
            }
            if log_m.to_u32() != F::MODULUS {
                let m = rows.multiplier(log_m);
                for i in r..r + dist {
                    rows.mul_add_into(i, i + dist, &m);
                }
            }
        }
        dist <<= 1;
    }
}

/// Forward transform (evaluation) of the first `size` rows in place
///
/// Only rows below `truncated` hold meaningful output.
pub fn fft<F: Field, R: ButterflyRows<F>>(
    rows: &mut R,
    skew: &[F::Elem],
    size: usize,
    truncated: usize,
    offset: usize,
) {
    debug_assert!(size.is_power_of_two());
    debug_assert!(rows.row_count() >= size);

    let mut dist = size >> 1;
    while dist > 0 {
        for r in (0..truncated).step_by(dist * 2) {
            let log_m = skew[r + dist + offset - 1];
            if log_m.to_u32() != F::MODULUS {
                let m = rows.multiplier(log_m);
                for i in r..r + dist {
                    rows.mul_add_into(i, i + dist, &m);
                }
            }
            for i in r..r + dist {
                rows.xor_into(i + dist, i);
            }
        }
        dist >>= 1;
    }
}

/// Formal derivative in the novel polynomial basis
pub fn formal_derivative<F: Field, R: ButterflyRows<F>>(rows: &mut R, size: usize) {
    for i in 1..size {
        let width = ((i ^ (i - 1)) + 1) >> 1;
        for j in 0..width {
            rows.xor_into(i - width + j, i + j);
        }
    }
}

/// Fast Walsh-Hadamard transform in log-domain (mod `MODULUS`) arithmetic
///
/// Entries at or past `truncated` must be zero on entry.
pub fn fwht<F: Field>(data: &mut [F::Elem], truncated: usize, stats: &mut BoundaryStats) {
    let size = data.len();
    debug_assert!(size.is_power_of_two());

    let mut dist = 1;
    while dist < size {
        for r in (0..truncated).step_by(dist * 2) {
            for i in r..r + dist {
                let (a, b) = (data[i], data[i + dist]);
                data[i] = stats.add_mod::<F>(a, b);
                data[i + dist] = stats.sub_mod::<F>(a, b);
            }
        }
        dist <<= 1;
    }
}

/// Precomputed transform tables for one field
pub struct FftTables<F: Field> {
    skew: Box<[F::Elem]>,
    log_walsh: Box<[F::Elem]>,
}

impl<F: Field> fmt::Debug for FftTables<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftTables")
            .field("field", &F::NAME)
            .field("skew_len", &self.skew.len())
            .finish_non_exhaustive()
    }
}

impl<F: Field> FftTables<F> {
    pub fn new(gf: &GaloisTables<F>) -> Self {
        let bits = F::BITS as usize;
        let modulus = F::MODULUS;
        let elem = <F::Elem as FieldElement>::from_u32;

        // Subspace basis being reduced, one level per layer
        let mut temp: Vec<u32> = (1..bits).map(|i| 1u32 << i).collect();
        let mut skew = vec![0u32; modulus as usize];

        for m in 0..bits - 1 {
            let step = 1usize << (m + 1);
            skew[(1 << m) - 1] = 0;

            for i in m..bits - 1 {
                let s = 1usize << (i + 1);
                let mut j = (1usize << m) - 1;
                while j < s {
                    skew[j + s] = skew[j] ^ temp[i];
                    j += step;
                }
            }

            let product = gf.mul_log(elem(temp[m]), gf.log(elem(temp[m] ^ 1)));
            temp[m] = modulus - gf.log(product).to_u32();

            for i in m + 1..bits - 1 {
                let sum = F::add_mod(gf.log(elem(temp[i] ^ 1)), elem(temp[m]));
                temp[i] = gf.mul_log(elem(temp[i]), sum).to_u32();
            }
        }

        let skew: Box<[F::Elem]> = skew.into_iter().map(|s| gf.log(elem(s))).collect();

        let mut log_walsh: Vec<F::Elem> = (0..F::ORDER).map(|i| gf.log(elem(i as u32))).collect();
        log_walsh[0] = F::Elem::default();
        fwht::<F>(&mut log_walsh, F::ORDER, &mut BoundaryStats::default());

        Self {
            skew,
            log_walsh: log_walsh.into_boxed_slice(),
        }
    }

    /// Skew factor logs, indexed by domain position minus one
    pub fn skew(&self) -> &[F::Elem] {
        &self.skew
    }

    /// Walsh-Hadamard transform of the log table
    pub fn log_walsh(&self) -> &[F::Elem] {
        &self.log_walsh
    }

    /// Evaluate in place the polynomial whose coefficients are `data`
    ///
    /// `data.len()` must be a power of two and `offset` a multiple of it with
    /// `offset + data.len() <= ORDER`.
    pub fn forward(&self, gf: &GaloisTables<F>, data: &mut [F::Elem], offset: usize) {
        let size = data.len();
        debug_assert!(offset + size <= F::ORDER);
        fft::<F, _>(&mut ElementRows::new(data, gf), &self.skew, size, size, offset);
    }

    /// Interpolate in place; exact inverse of [`FftTables::forward`] at the same offset
    pub fn inverse(&self, gf: &GaloisTables<F>, data: &mut [F::Elem], offset: usize) {
        let size = data.len();
        debug_assert!(offset + size <= F::ORDER);
        ifft::<F, _>(&mut ElementRows::new(data, gf), &self.skew, size, size, offset);
    }
}
