//! Error types for erasure coding operations

use thiserror::Error;

/// Errors that can occur while constructing a codec or processing a shard set
#[derive(Debug, Error)]
pub enum RsError {
    /// Slot count does not match the codec, or too many slots are absent
    #[error("Too few shards given")]
    TooFewShards,

    /// Source buffer empty, or requested output longer than the shards hold
    #[error("Not enough data to fill the requested shards or output")]
    ShortData,

    /// Join attempted while a needed shard is still absent
    #[error("Reconstruction required as one or more required data shards are absent")]
    ReconstructRequired,

    /// Shard lengths unequal, zero, or not a multiple of the word alignment
    #[error("Shard sizes do not match or are not a multiple of {alignment} bytes")]
    InvalidShardSize { alignment: usize },

    /// Field division by the zero element
    #[error("Division by zero in Galois field")]
    DivideByZero,

    /// Codec requested with no data shards
    #[error("Cannot create codec with {data} data shards")]
    InvalidShardNum { data: usize },

    /// Selected field has too few evaluation points for the requested code
    #[error("{data} data + {parity} parity shards do not fit in {field}")]
    MaxShardNum {
        data: usize,
        parity: usize,
        field: &'static str,
    },

    /// Dedicated worker pool could not be created
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Writing joined output failed
    #[error("I/O error while joining shards: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for codec results
pub type Result<T> = std::result::Result<T, RsError>;
