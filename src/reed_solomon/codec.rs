//! Public erasure codec over shard sets
//!
//! [`ReedSolomon`] validates shard sets, resolves the field variant once at
//! construction, and splits each operation into independent byte-range
//! stripes that run on rayon. All numeric work is delegated to
//! [`LeopardCodec`].
//!
//! A shard set is ordered `[data 0..K, parity 0..M]`. Encode and verify take
//! every slot present; reconstruct takes `Option` slots where `None` marks an
//! erasure.

use super::galois::{BoundaryStats, Field, FieldKind, Gf16, Gf8};
use super::leopard::{fits, LeopardCodec};
use crate::config::{CodecOptions, FieldChoice};
use crate::error::{Result, RsError};
use log::{debug, trace};
use rayon::prelude::*;
use smallvec::SmallVec;
use std::ops::Range;

/// Shard lengths must be a multiple of this many bytes
pub const SHARD_ALIGNMENT: usize = 8;

const MIN_STRIPE_BYTES: usize = 64;
const MAX_STRIPE_BYTES: usize = 256 << 10;

type SliceList<'a> = SmallVec<[&'a [u8]; 32]>;
type SliceListMut<'a> = SmallVec<[&'a mut [u8]; 32]>;

#[derive(Debug)]
enum Engine {
    Gf8(Box<LeopardCodec<Gf8>>),
    Gf16(Box<LeopardCodec<Gf16>>),
}

/// Reed-Solomon erasure codec for a fixed number of data and parity shards
///
/// ```
/// use leopard_rs::ReedSolomon;
///
/// let rs = ReedSolomon::new(4, 2)?;
/// let mut shards = rs.split(b"hello erasure coding")?;
/// rs.encode(&mut shards)?;
///
/// let mut slots: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
/// slots[1] = None;
/// slots[4] = None;
/// rs.reconstruct(&mut slots)?;
///
/// let joined = rs.join(&slots, 20)?;
/// assert_eq!(&joined, b"hello erasure coding");
/// # Ok::<(), leopard_rs::RsError>(())
/// ```
#[derive(Debug)]
pub struct ReedSolomon {
    engine: Engine,
    options: CodecOptions,
    pool: Option<rayon::ThreadPool>,
    data_shards: usize,
    parity_shards: usize,
}

impl ReedSolomon {
    /// Create a codec with default options
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        Self::with_options(data_shards, parity_shards, CodecOptions::default())
    }

    pub fn with_options(
        data_shards: usize,
        parity_shards: usize,
        options: CodecOptions,
    ) -> Result<Self> {
        if data_shards == 0 {
            return Err(RsError::InvalidShardNum { data: data_shards });
        }

        let use_gf8 = match options.field {
            FieldChoice::Auto => fits::<Gf8>(data_shards, parity_shards),
            FieldChoice::Gf8 => true,
            FieldChoice::Gf16 => false,
        };
        let engine = if use_gf8 {
            Engine::Gf8(Box::new(LeopardCodec::new(data_shards, parity_shards)?))
        } else {
            Engine::Gf16(Box::new(LeopardCodec::new(data_shards, parity_shards)?))
        };

        let pool = if options.parallel && options.threads > 0 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(options.threads)
                    .build()?,
            )
        } else {
            None
        };

        let codec = Self {
            engine,
            options,
            pool,
            data_shards,
            parity_shards,
        };
        debug!(
            "Created codec: {} data + {} parity shards over {} ({} threads)",
            data_shards,
            parity_shards,
            codec.field(),
            codec.options.effective_threads()
        );
        Ok(codec)
    }

    pub fn data_shard_count(&self) -> usize {
        self.data_shards
    }

    pub fn parity_shard_count(&self) -> usize {
        self.parity_shards
    }

    pub fn total_shard_count(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// Field variant chosen at construction
    pub fn field(&self) -> FieldKind {
        match &self.engine {
            Engine::Gf8(_) => FieldKind::Gf8,
            Engine::Gf16(_) => FieldKind::Gf16,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Overwrite the parity slots with parity computed from the data slots
    pub fn encode<T>(&self, shards: &mut [T]) -> Result<()>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.check_slot_count(shards.len())?;
        let len = shard_len(shards.iter().map(|s| s.as_ref().len()))?;
        if self.parity_shards == 0 {
            return Ok(());
        }

        let (data, parity) = shards.split_at_mut(self.data_shards);
        let data: SliceList = data.iter().map(|s| s.as_ref()).collect();
        let parity: SliceListMut = parity.iter_mut().map(|s| s.as_mut()).collect();

        self.encode_slices(&data, parity, len);
        Ok(())
    }

    /// Recompute parity into scratch space and compare with the parity slots
    ///
    /// A mismatch is `Ok(false)`; the shards are never modified.
    pub fn verify<T: AsRef<[u8]>>(&self, shards: &[T]) -> Result<bool> {
        self.check_slot_count(shards.len())?;
        let len = shard_len(shards.iter().map(|s| s.as_ref().len()))?;
        if self.parity_shards == 0 {
            return Ok(true);
        }

        let data: SliceList = shards[..self.data_shards]
            .iter()
            .map(|s| s.as_ref())
            .collect();
        let mut scratch = vec![vec![0u8; len]; self.parity_shards];
        let outputs: SliceListMut = scratch.iter_mut().map(Vec::as_mut_slice).collect();
        self.encode_slices(&data, outputs, len);

        let matched = scratch
            .iter()
            .zip(&shards[self.data_shards..])
            .all(|(expected, actual)| expected.as_slice() == actual.as_ref());
        if !matched {
            debug!("Verification failed: parity does not match data");
        }
        Ok(matched)
    }

    /// Fill every `None` slot, data and parity alike
    ///
    /// Present slots are trusted as-is and never rewritten. Fails with
    /// [`RsError::TooFewShards`] before any work when more than M slots are
    /// absent, leaving every slot untouched.
    pub fn reconstruct(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        self.reconstruct_impl(shards, false, &mut BoundaryStats::default())
    }

    /// Fill only the absent data slots; absent parity slots stay `None`
    pub fn reconstruct_data(&self, shards: &mut [Option<Vec<u8>>]) -> Result<()> {
        self.reconstruct_impl(shards, true, &mut BoundaryStats::default())
    }

    /// [`ReedSolomon::reconstruct`], also returning log-domain boundary counters
    /// for the erasure locator evaluation
    pub fn reconstruct_with_stats(&self, shards: &mut [Option<Vec<u8>>]) -> Result<BoundaryStats> {
        let mut stats = BoundaryStats::default();
        self.reconstruct_impl(shards, false, &mut stats)?;
        Ok(stats)
    }

    fn reconstruct_impl(
        &self,
        shards: &mut [Option<Vec<u8>>],
        data_only: bool,
        stats: &mut BoundaryStats,
    ) -> Result<()> {
        self.check_slot_count(shards.len())?;

        let erased = shards.iter().filter(|s| s.is_none()).count();
        if erased > self.parity_shards {
            debug!(
                "Cannot reconstruct: {} shards missing, at most {} recoverable",
                erased, self.parity_shards
            );
            return Err(RsError::TooFewShards);
        }

        let len = shard_len(shards.iter().flatten().map(Vec::len))?;

        let limit = if data_only {
            self.data_shards
        } else {
            shards.len()
        };
        let targets: SmallVec<[usize; 32]> = (0..limit).filter(|&i| shards[i].is_none()).collect();
        if targets.is_empty() {
            return Ok(());
        }

        debug!(
            "Reconstructing {} of {} missing shards ({} bytes each)",
            targets.len(),
            erased,
            len
        );

        let recovered = match &self.engine {
            Engine::Gf8(codec) => self.decode_striped(&**codec, shards, &targets, len, stats),
            Engine::Gf16(codec) => self.decode_striped(&**codec, shards, &targets, len, stats),
        };

        for (index, buffer) in targets.into_iter().zip(recovered) {
            shards[index] = Some(buffer);
        }
        Ok(())
    }

    fn check_slot_count(&self, slots: usize) -> Result<()> {
        if slots != self.total_shard_count() {
            return Err(RsError::TooFewShards);
        }
        Ok(())
    }

    fn encode_slices(&self, data: &[&[u8]], parity: SliceListMut<'_>, len: usize) {
        match &self.engine {
            Engine::Gf8(codec) => self.encode_striped(&**codec, data, parity, len),
            Engine::Gf16(codec) => self.encode_striped(&**codec, data, parity, len),
        }
    }

    fn encode_striped<F: Field>(
        &self,
        codec: &LeopardCodec<F>,
        data: &[&[u8]],
        parity: SliceListMut<'_>,
        len: usize,
    ) {
        let stripe = self.stripe_len(codec.encode_rows(), len);
        let mut jobs: Vec<SliceListMut> = (0..len.div_ceil(stripe))
            .map(|_| SmallVec::with_capacity(parity.len()))
            .collect();
        for shard in parity {
            for (job, chunk) in jobs.iter_mut().zip(shard.chunks_mut(stripe)) {
                job.push(chunk);
            }
        }

        trace!("Encoding {} stripes of {} bytes", jobs.len(), stripe);

        self.run_striped(jobs, |index, mut outputs| {
            let range = stripe_range(index, stripe, len);
            let inputs: SliceList = data.iter().map(|d| &d[range.clone()]).collect();
            codec.encode_stripe(&inputs, &mut outputs);
        });
    }

    fn decode_striped<F: Field>(
        &self,
        codec: &LeopardCodec<F>,
        shards: &[Option<Vec<u8>>],
        targets: &[usize],
        len: usize,
        stats: &mut BoundaryStats,
    ) -> Vec<Vec<u8>> {
        let erased: SmallVec<[bool; 64]> = shards.iter().map(Option::is_none).collect();
        let locator = codec.error_locator(&erased, stats);
        trace!(
            "Erasure locator: {} add_mod calls, {} exact modulus wraps, {} sub_mod borrows",
            stats.add_calls,
            stats.add_boundary_hits,
            stats.sub_borrows
        );

        let stripe = self.stripe_len(codec.decode_rows(), len);
        let mut recovered = vec![vec![0u8; len]; targets.len()];
        let mut jobs: Vec<SmallVec<[(usize, &mut [u8]); 32]>> = (0..len.div_ceil(stripe))
            .map(|_| SmallVec::with_capacity(targets.len()))
            .collect();
        for (&index, buffer) in targets.iter().zip(recovered.iter_mut()) {
            for (job, chunk) in jobs.iter_mut().zip(buffer.chunks_mut(stripe)) {
                job.push((index, chunk));
            }
        }

        trace!("Decoding {} stripes of {} bytes", jobs.len(), stripe);

        self.run_striped(jobs, |index, mut outputs| {
            let range = stripe_range(index, stripe, len);
            let inputs: SmallVec<[Option<&[u8]>; 32]> = shards
                .iter()
                .map(|s| s.as_deref().map(|b| &b[range.clone()]))
                .collect();
            codec.decode_stripe(&inputs, &locator, &mut outputs);
        });

        recovered
    }

    /// Bytes per stripe for a transform needing `rows` rows of workspace
    fn stripe_len(&self, rows: usize, len: usize) -> usize {
        let per_row = (self.options.stripe_bytes / rows.max(1))
            .clamp(MIN_STRIPE_BYTES, MAX_STRIPE_BYTES);
        let per_row = per_row - per_row % SHARD_ALIGNMENT;
        per_row.min(len)
    }

    /// Run one job per stripe, in parallel when enabled
    fn run_striped<T, J>(&self, jobs: Vec<T>, job: J)
    where
        T: Send,
        J: Fn(usize, T) + Send + Sync,
    {
        if !self.options.parallel || jobs.len() < 2 {
            for (index, item) in jobs.into_iter().enumerate() {
                job(index, item);
            }
            return;
        }

        let run = move || {
            jobs.into_par_iter()
                .enumerate()
                .for_each(|(index, item)| job(index, item))
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

fn stripe_range(index: usize, stripe: usize, len: usize) -> Range<usize> {
    let start = index * stripe;
    start..(start + stripe).min(len)
}

/// Common length of a shard set; equal, nonzero and word-aligned
fn shard_len<I: IntoIterator<Item = usize>>(sizes: I) -> Result<usize> {
    let invalid = RsError::InvalidShardSize {
        alignment: SHARD_ALIGNMENT,
    };
    let mut sizes = sizes.into_iter();
    let Some(len) = sizes.next() else {
        return Err(invalid);
    };
    if len == 0 || len % SHARD_ALIGNMENT != 0 || sizes.any(|size| size != len) {
        return Err(invalid);
    }
    Ok(len)
}
