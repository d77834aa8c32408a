//! Reed-Solomon erasure coding over GF(2^8) and GF(2^16)
//!
//! Layers, leaf first:
//! - [`galois`]: log/exp tables and log-domain modular arithmetic
//! - [`slice_ops`]: multiply-by-constant kernels over shard byte slices
//! - [`fft`]: additive FFT, its inverse, and the Walsh-Hadamard transform
//! - [`leopard`]: encode and erasure decode for one field
//! - [`codec`]: the public [`ReedSolomon`] codec

pub mod codec;
pub mod fft;
pub mod galois;
pub mod leopard;
pub mod slice_ops;

pub use codec::{ReedSolomon, SHARD_ALIGNMENT};
pub use galois::{BoundaryStats, Field, FieldKind, GaloisTables, Gf16, Gf8};
