//! Galois Field GF(2^8) and GF(2^16) arithmetic for the FFT codec
//!
//! ## Representation
//!
//! Elements are stored in the **Cantor basis** rather than the usual polynomial
//! basis. The log/exp tables are generated from a primitive polynomial with an
//! LFSR and then re-indexed through the basis, so addition stays XOR while the
//! additive FFT gets subspace polynomials with simple twiddle factors.
//!
//! - **GF(2^8)**: 0x11D (x⁸ + x⁴ + x³ + x² + 1)
//! - **GF(2^16)**: 0x1002D (x¹⁶ + x⁵ + x³ + x² + 1)
//!
//! ## Log-domain arithmetic
//!
//! The multiplicative group has order `2^n - 1`, so every exponent sum or
//! difference reduces modulo [`Field::MODULUS`] (255 or 65535), never modulo
//! the field size. [`Field::add_mod`] returns `0` when `a + b == MODULUS`.
//! Getting this wrong produces no error, only wrong bytes.

use super::slice_ops::{self, ByteMulTable, SplitMulTable};
use crate::error::{Result, RsError};
use std::fmt::{self, Debug};

/// Unsigned integer sized to the field width, used for elements and logs alike
pub trait FieldElement:
    Copy + Clone + Debug + Default + PartialEq + Eq + Send + Sync + 'static
{
    /// Bytes one element occupies inside a shard
    const BYTES: usize;

    /// Truncating conversion from a wider integer
    fn from_u32(value: u32) -> Self;

    fn to_u32(self) -> u32;

    #[inline]
    fn to_usize(self) -> usize {
        self.to_u32() as usize
    }
}

impl FieldElement for u8 {
    const BYTES: usize = 1;

    #[inline]
    fn from_u32(value: u32) -> Self {
        value as u8
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }
}

impl FieldElement for u16 {
    const BYTES: usize = 2;

    #[inline]
    fn from_u32(value: u32) -> Self {
        value as u16
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }
}

/// Field variant a codec instance was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Gf8,
    Gf16,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Gf8 => Gf8::NAME,
            FieldKind::Gf16 => Gf16::NAME,
        })
    }
}

/// Capability set the codec core is generic over
///
/// Implemented by the zero-sized markers [`Gf8`] and [`Gf16`]. Each carries its
/// own constants and byte-slice kernels; the variant is chosen once when a
/// codec is constructed.
pub trait Field: Copy + Debug + Send + Sync + 'static {
    /// Element (and log value) type
    type Elem: FieldElement;
    /// Precomputed multiply-by-constant table for shard kernels
    type MulTable: Send + Sync;

    const KIND: FieldKind;
    const NAME: &'static str;
    const BITS: u32;
    /// Number of field elements
    const ORDER: usize = 1 << Self::BITS;
    /// Multiplicative group order, the modulus of all log-domain arithmetic
    const MODULUS: u32 = (1 << Self::BITS) - 1;
    /// Primitive polynomial including the x^BITS term
    const POLYNOMIAL: u32;
    /// Cantor basis, in polynomial representation
    const CANTOR_BASIS: &'static [Self::Elem];

    /// `(a + b) mod MODULUS` for log values `a, b` in `[0, MODULUS]`, not both `MODULUS`
    #[inline]
    fn add_mod(a: Self::Elem, b: Self::Elem) -> Self::Elem {
        let sum = a.to_u32() + b.to_u32();
        Self::Elem::from_u32(if sum >= Self::MODULUS {
            sum - Self::MODULUS
        } else {
            sum
        })
    }

    /// `(a - b) mod MODULUS` for log values `a, b` in `[0, MODULUS]`
    #[inline]
    fn sub_mod(a: Self::Elem, b: Self::Elem) -> Self::Elem {
        let (a, b) = (a.to_u32(), b.to_u32());
        Self::Elem::from_u32(if a >= b { a - b } else { a + Self::MODULUS - b })
    }

    /// Table multiplying by `exp(log_m)`
    fn mul_table(tables: &GaloisTables<Self>, log_m: Self::Elem) -> Self::MulTable;

    /// `dst = src * m`
    fn mul_slice(table: &Self::MulTable, dst: &mut [u8], src: &[u8]);

    /// `dst ^= src * m`
    fn mul_add_slice(table: &Self::MulTable, dst: &mut [u8], src: &[u8]);
}

/// GF(2^8) marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gf8;

/// GF(2^16) marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gf16;

impl Field for Gf8 {
    type Elem = u8;
    type MulTable = ByteMulTable;

    const KIND: FieldKind = FieldKind::Gf8;
    const NAME: &'static str = "GF(2^8)";
    const BITS: u32 = 8;
    const POLYNOMIAL: u32 = 0x11D;
    const CANTOR_BASIS: &'static [u8] = &[1, 214, 152, 146, 86, 200, 88, 230];

    fn mul_table(tables: &GaloisTables<Self>, log_m: u8) -> ByteMulTable {
        slice_ops::build_byte_mul_table(tables, log_m)
    }

    #[inline]
    fn mul_slice(table: &ByteMulTable, dst: &mut [u8], src: &[u8]) {
        slice_ops::process_slice_multiply_gf8(table, dst, src);
    }

    #[inline]
    fn mul_add_slice(table: &ByteMulTable, dst: &mut [u8], src: &[u8]) {
        slice_ops::process_slice_multiply_add_gf8(table, dst, src);
    }
}

impl Field for Gf16 {
    type Elem = u16;
    type MulTable = SplitMulTable;

    const KIND: FieldKind = FieldKind::Gf16;
    const NAME: &'static str = "GF(2^16)";
    const BITS: u32 = 16;
    const POLYNOMIAL: u32 = 0x1002D;
    const CANTOR_BASIS: &'static [u16] = &[
        0x0001, 0xACCA, 0x3C0E, 0x163E, 0xC582, 0xED2E, 0x914C, 0x4012, 0x6C98, 0x10D8, 0x6A72,
        0xB900, 0xFDB8, 0xFB34, 0xFF38, 0x991E,
    ];

    fn mul_table(tables: &GaloisTables<Self>, log_m: u16) -> SplitMulTable {
        slice_ops::build_split_mul_table(tables, log_m)
    }

    #[inline]
    fn mul_slice(table: &SplitMulTable, dst: &mut [u8], src: &[u8]) {
        slice_ops::process_slice_multiply_direct(table, dst, src);
    }

    #[inline]
    fn mul_add_slice(table: &SplitMulTable, dst: &mut [u8], src: &[u8]) {
        slice_ops::process_slice_multiply_add(table, dst, src);
    }
}

/// Exact-boundary counters for one call's log-domain arithmetic
///
/// Passed explicitly into the functions being observed; nothing is global.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundaryStats {
    pub add_calls: u64,
    /// `add_mod` calls where `a + b` landed exactly on the modulus
    pub add_boundary_hits: u64,
    pub sub_calls: u64,
    /// `sub_mod` calls that had to borrow the modulus
    pub sub_borrows: u64,
}

impl BoundaryStats {
    #[inline]
    pub fn add_mod<F: Field>(&mut self, a: F::Elem, b: F::Elem) -> F::Elem {
        self.add_calls += 1;
        if a.to_u32() + b.to_u32() == F::MODULUS {
            self.add_boundary_hits += 1;
        }
        F::add_mod(a, b)
    }

    #[inline]
    pub fn sub_mod<F: Field>(&mut self, a: F::Elem, b: F::Elem) -> F::Elem {
        self.sub_calls += 1;
        if a.to_u32() < b.to_u32() {
            self.sub_borrows += 1;
        }
        F::sub_mod(a, b)
    }
}

/// Galois Field lookup tables for fast arithmetic
pub struct GaloisTables<F: Field> {
    log: Box<[F::Elem]>,
    exp: Box<[F::Elem]>,
}

impl<F: Field> Debug for GaloisTables<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaloisTables")
            .field("field", &F::NAME)
            .finish_non_exhaustive()
    }
}

impl<F: Field> Default for GaloisTables<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Field> GaloisTables<F> {
    pub fn new() -> Self {
        let order = F::ORDER;
        let modulus = F::MODULUS;

        // LFSR discrete logs in the polynomial basis
        let mut lfsr_log = vec![0u32; order];
        let mut state = 1usize;
        for l in 0..modulus {
            lfsr_log[state] = l;
            state <<= 1;
            if state >= order {
                state ^= F::POLYNOMIAL as usize;
            }
        }
        lfsr_log[0] = modulus;

        // Cantor index -> polynomial representation
        let mut cantor = vec![0u32; order];
        for (i, basis) in F::CANTOR_BASIS.iter().enumerate() {
            let width = 1usize << i;
            for j in 0..width {
                cantor[j + width] = cantor[j] ^ basis.to_u32();
            }
        }

        let log: Box<[F::Elem]> = cantor
            .iter()
            .map(|&poly| F::Elem::from_u32(lfsr_log[poly as usize]))
            .collect();

        let mut exp = vec![F::Elem::default(); order].into_boxed_slice();
        for (element, l) in log.iter().enumerate() {
            exp[l.to_usize()] = F::Elem::from_u32(element as u32);
        }
        // log(0) is stored as MODULUS; exp(MODULUS) aliases exp(0)
        exp[modulus as usize] = exp[0];

        Self { log, exp }
    }

    /// Discrete log of `a`; `MODULUS` for zero
    #[inline]
    pub fn log(&self, a: F::Elem) -> F::Elem {
        self.log[a.to_usize()]
    }

    #[inline]
    pub fn exp(&self, l: F::Elem) -> F::Elem {
        self.exp[l.to_usize()]
    }

    /// `a * exp(log_b)`
    #[inline]
    pub fn mul_log(&self, a: F::Elem, log_b: F::Elem) -> F::Elem {
        if a.to_u32() == 0 {
            return F::Elem::default();
        }
        self.exp[F::add_mod(self.log(a), log_b).to_usize()]
    }

    #[inline]
    pub fn mul(&self, a: F::Elem, b: F::Elem) -> F::Elem {
        if a.to_u32() == 0 || b.to_u32() == 0 {
            return F::Elem::default();
        }
        self.exp[F::add_mod(self.log(a), self.log(b)).to_usize()]
    }

    pub fn div(&self, a: F::Elem, b: F::Elem) -> Result<F::Elem> {
        if b.to_u32() == 0 {
            return Err(RsError::DivideByZero);
        }
        if a.to_u32() == 0 {
            return Ok(F::Elem::default());
        }
        Ok(self.exp[F::sub_mod(self.log(a), self.log(b)).to_usize()])
    }

    /// Multiplicative inverse
    pub fn inv(&self, a: F::Elem) -> Result<F::Elem> {
        self.div(F::Elem::from_u32(1), a)
    }
}
