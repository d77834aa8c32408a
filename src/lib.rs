//! Leopard-style FFT Reed-Solomon erasure coding
//!
//! Encode K data shards into M parity shards so that any K of the K+M shards
//! recover the rest. Small codes run over GF(2^8), larger ones over GF(2^16);
//! the field is picked once when the codec is built.

pub mod config;
pub mod error;
pub mod reed_solomon;
pub mod shards;

pub use config::{CodecOptions, FieldChoice};
pub use error::{Result, RsError};
pub use reed_solomon::{BoundaryStats, FieldKind, ReedSolomon, SHARD_ALIGNMENT};
pub use shards::FRAME_TRAILER_BYTES;
