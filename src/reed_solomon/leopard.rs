//! FFT-based Reed-Solomon encode and erasure decode for one field
//!
//! ## Codeword layout
//!
//! ```text
//! padded:    0 .. M    M .. m           m .. m+K    m+K .. n
//!            parity    virtual parity   data        zero padding
//!
//! compact:   0 .. M    M .. M+K         M+K .. n
//!            parity    data             zero padding
//! ```
//!
//! The padded layout is used whenever `m = ceil_pow2(M)` plus K fits the
//! field, with `n = ceil_pow2(m + K)`. The virtual parity rows are never stored
//! and are always treated as erased. Data occupies the evaluation points
//! directly after the parity block, which is what lets the encoder produce
//! parity with one inverse transform per `m`-sized data chunk and a single
//! forward transform.
//!
//! When padding the parity block would overflow the field, the compact layout
//! packs data right after the M parity rows and `n = ceil_pow2(M + K)`. Parity
//! is then computed by the erasure decoder with every parity row marked erased,
//! using a locator built once at construction.
//!
//! ## Decoding
//!
//! The erasure locator `e(x)` vanishes exactly on the erased positions. Its
//! logarithm at every point is computed with two Walsh-Hadamard transforms in
//! log-domain arithmetic. Each present shard is multiplied by `e(x)`, the
//! product is interpolated, differentiated formally, re-evaluated, and divided
//! by `e(x)` again at the erased positions (Forney's formula in this basis).
//!
//! Everything here operates on one byte-range stripe of the shards; the
//! caller is responsible for validation and striping.

use super::fft::{fft, formal_derivative, fwht, ifft, FftTables, ShardRows};
use super::galois::{BoundaryStats, Field, FieldElement, GaloisTables};
use super::slice_ops::xor_slice;
use crate::error::{Result, RsError};
use log::debug;

/// Whether `data + parity` shards fit in the evaluation domain of `F`
pub fn fits<F: Field>(data_shards: usize, parity_shards: usize) -> bool {
    data_shards
        .checked_add(parity_shards)
        .is_some_and(|total| total <= F::ORDER)
}

enum Layout<E> {
    /// Data at `ceil_pow2(M)`; chunked encode
    Padded,
    /// Data at M; encode runs the decoder against this all-parity-erased locator
    Compact { parity_locator: Box<[E]> },
}

/// Codec core for a fixed `(K, M)` over field `F`
pub struct LeopardCodec<F: Field> {
    data_shards: usize,
    parity_shards: usize,
    /// Padded parity block size, `ceil_pow2(M)`
    m: usize,
    /// Codeword position of data shard 0
    data_offset: usize,
    n: usize,
    layout: Layout<F::Elem>,
    gf: GaloisTables<F>,
    fft: FftTables<F>,
}

impl<F: Field> std::fmt::Debug for LeopardCodec<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeopardCodec")
            .field("field", &F::NAME)
            .field("data_shards", &self.data_shards)
            .field("parity_shards", &self.parity_shards)
            .field("compact", &self.is_compact())
            .field("data_offset", &self.data_offset)
            .field("n", &self.n)
            .finish()
    }
}

impl<F: Field> LeopardCodec<F> {
    pub fn new(data_shards: usize, parity_shards: usize) -> Result<Self> {
        if data_shards == 0 {
            return Err(RsError::InvalidShardNum { data: data_shards });
        }
        if !fits::<F>(data_shards, parity_shards) {
            return Err(RsError::MaxShardNum {
                data: data_shards,
                parity: parity_shards,
                field: F::NAME,
            });
        }

        let m = parity_shards.next_power_of_two();
        let compact = m + data_shards > F::ORDER;
        let data_offset = if compact { parity_shards } else { m };
        let n = (data_offset + data_shards).next_power_of_two();

        let gf = GaloisTables::new();
        let fft = FftTables::new(&gf);

        let mut codec = Self {
            data_shards,
            parity_shards,
            m,
            data_offset,
            n,
            layout: Layout::Padded,
            gf,
            fft,
        };

        if compact {
            let mut erased = vec![false; data_shards + parity_shards];
            erased[data_shards..].fill(true);
            let parity_locator = codec.error_locator(&erased, &mut BoundaryStats::default());
            codec.layout = Layout::Compact {
                parity_locator: parity_locator.into_boxed_slice(),
            };
        }

        debug!(
            "Leopard codec over {}: K={} M={} data_offset={} n={}{}",
            F::NAME,
            data_shards,
            parity_shards,
            data_offset,
            n,
            if compact { " (compact)" } else { "" }
        );

        Ok(codec)
    }

    pub fn data_shards(&self) -> usize {
        self.data_shards
    }

    pub fn parity_shards(&self) -> usize {
        self.parity_shards
    }

    /// Rows of workspace one decode stripe needs
    pub fn decode_rows(&self) -> usize {
        self.n
    }

    /// Whether data is packed directly after the M parity rows
    pub fn is_compact(&self) -> bool {
        matches!(self.layout, Layout::Compact { .. })
    }

    /// Rows of workspace one encode stripe needs
    pub fn encode_rows(&self) -> usize {
        match self.layout {
            Layout::Compact { .. } => self.n,
            Layout::Padded if self.data_shards > self.m => 2 * self.m,
            Layout::Padded => self.m,
        }
    }

    /// Compute parity for one stripe
    ///
    /// `data` holds K equal-length slices, `parity` M slices of the same length.
    pub fn encode_stripe(&self, data: &[&[u8]], parity: &mut [&mut [u8]]) {
        debug_assert_eq!(data.len(), self.data_shards);
        debug_assert_eq!(parity.len(), self.parity_shards);

        if self.parity_shards == 0 {
            return;
        }

        match &self.layout {
            Layout::Padded => self.encode_padded(data, parity),
            Layout::Compact { parity_locator } => {
                let inputs: Vec<Option<&[u8]>> = data
                    .iter()
                    .map(|&shard| Some(shard))
                    .chain(std::iter::repeat(None).take(self.parity_shards))
                    .collect();
                let mut outputs: Vec<(usize, &mut [u8])> = parity
                    .iter_mut()
                    .enumerate()
                    .map(|(i, out)| (self.data_shards + i, &mut **out))
                    .collect();
                self.decode_stripe(&inputs, parity_locator, &mut outputs);
            }
        }
    }

    fn encode_padded(&self, data: &[&[u8]], parity: &mut [&mut [u8]]) {
        let len = data[0].len();
        let m = self.m;
        let skew = self.fft.skew();

        let mut work = vec![vec![0u8; len]; m];
        let mut temp = if self.data_shards > m {
            vec![vec![0u8; len]; m]
        } else {
            Vec::new()
        };

        for (chunk_index, chunk) in data.chunks(m).enumerate() {
            let start = chunk_index * m;
            let target = if start == 0 { &mut work } else { &mut temp };

            for (row, shard) in target.iter_mut().zip(chunk) {
                row.copy_from_slice(shard);
            }
            for row in target[chunk.len()..].iter_mut() {
                row.fill(0);
            }

            ifft(
                &mut ShardRows::new(target, &self.gf),
                skew,
                m,
                chunk.len(),
                m + start,
            );

            if start != 0 {
                for (acc, row) in work.iter_mut().zip(&temp) {
                    xor_slice(acc, row);
                }
            }
        }

        fft(
            &mut ShardRows::new(&mut work, &self.gf),
            skew,
            m,
            self.parity_shards,
            0,
        );

        for (out, row) in parity.iter_mut().zip(&work) {
            out.copy_from_slice(row);
        }
    }

    /// Log of the erasure locator polynomial at every evaluation point
    ///
    /// `erased` is indexed in shard-set order: data `0..K`, then parity `0..M`.
    pub fn error_locator(&self, erased: &[bool], stats: &mut BoundaryStats) -> Vec<F::Elem> {
        debug_assert_eq!(erased.len(), self.data_shards + self.parity_shards);

        let one = F::Elem::from_u32(1);
        let mut locator = vec![F::Elem::default(); F::ORDER];

        for (i, slot) in locator[..self.parity_shards].iter_mut().enumerate() {
            if erased[self.data_shards + i] {
                *slot = one;
            }
        }
        // Virtual parity rows; empty in the compact layout
        for slot in &mut locator[self.parity_shards..self.data_offset] {
            *slot = one;
        }
        for (i, &is_erased) in erased[..self.data_shards].iter().enumerate() {
            if is_erased {
                locator[self.data_offset + i] = one;
            }
        }

        fwht::<F>(&mut locator, self.data_offset + self.data_shards, stats);

        let modulus = u64::from(F::MODULUS);
        for (value, walsh) in locator.iter_mut().zip(self.fft.log_walsh()) {
            let product = u64::from(value.to_u32()) * u64::from(walsh.to_u32());
            *value = F::Elem::from_u32((product % modulus) as u32);
        }

        fwht::<F>(&mut locator, F::ORDER, stats);
        locator
    }

    /// Codeword position of a shard-set index
    fn position(&self, index: usize) -> usize {
        if index < self.data_shards {
            self.data_offset + index
        } else {
            index - self.data_shards
        }
    }

    /// Recover erased shards for one stripe
    ///
    /// `inputs` is the full shard set for this stripe with `None` for erased
    /// slots. Each `(index, buffer)` in `outputs` names an erased slot and the
    /// buffer its recovered bytes go to.
    pub fn decode_stripe(
        &self,
        inputs: &[Option<&[u8]>],
        locator: &[F::Elem],
        outputs: &mut [(usize, &mut [u8])],
    ) {
        debug_assert_eq!(inputs.len(), self.data_shards + self.parity_shards);

        let Some(len) = inputs.iter().flatten().map(|s| s.len()).next() else {
            return;
        };

        let skew = self.fft.skew();
        let truncated = self.data_offset + self.data_shards;
        let mut work = vec![vec![0u8; len]; self.n];

        for (index, input) in inputs.iter().enumerate() {
            if let Some(shard) = input {
                let pos = self.position(index);
                let table = F::mul_table(&self.gf, locator[pos]);
                F::mul_slice(&table, &mut work[pos], shard);
            }
        }

        let mut rows = ShardRows::new(&mut work, &self.gf);
        ifft(&mut rows, skew, self.n, truncated, 0);
        formal_derivative(&mut rows, self.n);
        fft(&mut rows, skew, self.n, truncated, 0);

        for (index, out) in outputs.iter_mut() {
            let pos = self.position(*index);
            let log_inv = F::Elem::from_u32(F::MODULUS - locator[pos].to_u32());
            let table = F::mul_table(&self.gf, log_inv);
            F::mul_slice(&table, out, &work[pos]);
        }
    }
}
