//! Splitting byte buffers into shards and joining them back
//!
//! Data is laid out contiguously: shard 0 holds the first `shard_size` bytes,
//! shard 1 the next, and so on. Bytes past the end of the input are zero.
//! Parity slots are returned zero-filled so a split result can be passed
//! straight to [`ReedSolomon::encode`].

use crate::error::{Result, RsError};
use crate::reed_solomon::{ReedSolomon, SHARD_ALIGNMENT};
use log::debug;
use std::io::Write;

/// Width of the length trailer written by [`ReedSolomon::split_framed`]
pub const FRAME_TRAILER_BYTES: usize = 8;

impl ReedSolomon {
    /// Shard length needed to hold `len` bytes of data
    ///
    /// Rounded up to [`SHARD_ALIGNMENT`].
    pub fn shard_size(&self, len: usize) -> usize {
        len.div_ceil(self.data_shard_count())
            .next_multiple_of(SHARD_ALIGNMENT)
    }

    /// Split `data` into K data shards plus M zeroed parity shards
    ///
    /// The original length is not stored; pass it to [`ReedSolomon::join`].
    pub fn split(&self, data: &[u8]) -> Result<Vec<Vec<u8>>> {
        if data.is_empty() {
            return Err(RsError::ShortData);
        }
        Ok(self.split_with_size(data, self.shard_size(data.len())))
    }

    /// Like [`ReedSolomon::split`], but stores `data.len()` as a little-endian
    /// `u64` in the final bytes of the last data shard
    pub fn split_framed(&self, data: &[u8]) -> Result<Vec<Vec<u8>>> {
        if data.is_empty() {
            return Err(RsError::ShortData);
        }

        let size = self.shard_size(data.len() + FRAME_TRAILER_BYTES);
        let mut shards = self.split_with_size(data, size);
        let last = &mut shards[self.data_shard_count() - 1];
        last[size - FRAME_TRAILER_BYTES..].copy_from_slice(&(data.len() as u64).to_le_bytes());
        Ok(shards)
    }

    fn split_with_size(&self, data: &[u8], size: usize) -> Vec<Vec<u8>> {
        let mut shards = Vec::with_capacity(self.total_shard_count());

        for i in 0..self.data_shard_count() {
            let start = (i * size).min(data.len());
            let end = (start + size).min(data.len());
            let mut shard = vec![0u8; size];
            shard[..end - start].copy_from_slice(&data[start..end]);
            shards.push(shard);
        }
        shards.resize_with(self.total_shard_count(), || vec![0u8; size]);

        debug!(
            "Split {} bytes into {} shards of {} bytes",
            data.len(),
            shards.len(),
            size
        );
        shards
    }

    /// Write the first `out_size` bytes held by the data shards to `dst`
    ///
    /// Only the data shards needed to cover `out_size` must be present.
    pub fn join_into<W, T>(&self, dst: &mut W, shards: &[Option<T>], out_size: usize) -> Result<()>
    where
        W: Write,
        T: AsRef<[u8]>,
    {
        if shards.len() < self.data_shard_count() {
            return Err(RsError::TooFewShards);
        }
        let shards = &shards[..self.data_shard_count()];

        let mut available = 0;
        for shard in shards {
            if available >= out_size {
                break;
            }
            match shard {
                Some(shard) => available += shard.as_ref().len(),
                None => return Err(RsError::ReconstructRequired),
            }
        }
        if available < out_size {
            return Err(RsError::ShortData);
        }

        let mut remaining = out_size;
        for shard in shards.iter().flatten() {
            if remaining == 0 {
                break;
            }
            let shard = shard.as_ref();
            let take = remaining.min(shard.len());
            dst.write_all(&shard[..take])?;
            remaining -= take;
        }
        Ok(())
    }

    /// Concatenate the first `out_size` bytes held by the data shards
    pub fn join<T: AsRef<[u8]>>(&self, shards: &[Option<T>], out_size: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(out_size);
        self.join_into(&mut out, shards, out_size)?;
        Ok(out)
    }

    /// Join shards produced by [`ReedSolomon::split_framed`] using the stored length
    pub fn join_framed<T: AsRef<[u8]>>(&self, shards: &[Option<T>]) -> Result<Vec<u8>> {
        let k = self.data_shard_count();
        if shards.len() < k {
            return Err(RsError::TooFewShards);
        }

        let last = shards[k - 1]
            .as_ref()
            .ok_or(RsError::ReconstructRequired)?
            .as_ref();
        if last.len() < FRAME_TRAILER_BYTES {
            return Err(RsError::ShortData);
        }

        let mut trailer = [0u8; FRAME_TRAILER_BYTES];
        trailer.copy_from_slice(&last[last.len() - FRAME_TRAILER_BYTES..]);
        let len = usize::try_from(u64::from_le_bytes(trailer)).map_err(|_| RsError::ShortData)?;

        // Stored length may not reach into the trailer itself
        let capacity = (k * last.len()).saturating_sub(FRAME_TRAILER_BYTES);
        if len > capacity {
            return Err(RsError::ShortData);
        }
        self.join(shards, len)
    }
}
