//! Byte-slice kernels applied across whole shard rows
//!
//! Every FFT butterfly multiplies one row by a constant and XORs it into
//! another. Multiplication by a fixed constant is GF(2)-linear, so for
//! GF(2^16) it splits into two 256-entry lookups (low byte, high byte) whose
//! results XOR together. GF(2^8) uses a single 256-entry table.
//!
//! GF(2^16) elements are stored in shards as little-endian `u16` words.

use super::galois::{Gf16, Gf8, GaloisTables};

/// Products of a fixed GF(2^16) constant with every low byte and every high byte
#[derive(Clone)]
pub struct SplitMulTable {
    pub low: [u16; 256],
    pub high: [u16; 256],
}

/// Products of a fixed GF(2^8) constant with every byte
#[derive(Clone)]
pub struct ByteMulTable(pub [u8; 256]);

/// Build split multiplication table for multiplying by `exp(log_m)`
pub fn build_split_mul_table(tables: &GaloisTables<Gf16>, log_m: u16) -> SplitMulTable {
    let mut low = [0u16; 256];
    let mut high = [0u16; 256];

    for i in 0..256u16 {
        low[i as usize] = tables.mul_log(i, log_m);
        high[i as usize] = tables.mul_log(i << 8, log_m);
    }

    SplitMulTable { low, high }
}

pub fn build_byte_mul_table(tables: &GaloisTables<Gf8>, log_m: u8) -> ByteMulTable {
    let mut products = [0u8; 256];
    for (i, product) in products.iter_mut().enumerate() {
        *product = tables.mul_log(i as u8, log_m);
    }
    ByteMulTable(products)
}

#[inline]
fn lookup(tables: &SplitMulTable, word: u16) -> u16 {
    tables.low[(word & 0xFF) as usize] ^ tables.high[(word >> 8) as usize]
}

/// `output = coefficient * input` over GF(2^16) words
#[inline]
pub fn process_slice_multiply_direct(tables: &SplitMulTable, output: &mut [u8], input: &[u8]) {
    debug_assert_eq!(output.len(), input.len());

    // Word view is only valid when native order matches the shard layout
    if cfg!(target_endian = "little") {
        if let (Ok(out_words), Ok(in_words)) = (
            bytemuck::try_cast_slice_mut::<u8, u16>(output),
            bytemuck::try_cast_slice::<u8, u16>(input),
        ) {
            for (out_word, &in_word) in out_words.iter_mut().zip(in_words) {
                *out_word = lookup(tables, in_word);
            }
            return;
        }
    }

    for (out_pair, in_pair) in output.chunks_exact_mut(2).zip(input.chunks_exact(2)) {
        let word = u16::from_le_bytes([in_pair[0], in_pair[1]]);
        out_pair.copy_from_slice(&lookup(tables, word).to_le_bytes());
    }
}

/// `output ^= coefficient * input` over GF(2^16) words
#[inline]
pub fn process_slice_multiply_add(tables: &SplitMulTable, output: &mut [u8], input: &[u8]) {
    debug_assert_eq!(output.len(), input.len());

    if cfg!(target_endian = "little") {
        if let (Ok(out_words), Ok(in_words)) = (
            bytemuck::try_cast_slice_mut::<u8, u16>(output),
            bytemuck::try_cast_slice::<u8, u16>(input),
        ) {
            for (out_word, &in_word) in out_words.iter_mut().zip(in_words) {
                *out_word ^= lookup(tables, in_word);
            }
            return;
        }
    }

    for (out_pair, in_pair) in output.chunks_exact_mut(2).zip(input.chunks_exact(2)) {
        let word = u16::from_le_bytes([in_pair[0], in_pair[1]]);
        let current = u16::from_le_bytes([out_pair[0], out_pair[1]]);
        out_pair.copy_from_slice(&(current ^ lookup(tables, word)).to_le_bytes());
    }
}

#[inline]
pub fn process_slice_multiply_gf8(table: &ByteMulTable, output: &mut [u8], input: &[u8]) {
    debug_assert_eq!(output.len(), input.len());
    for (out_byte, &in_byte) in output.iter_mut().zip(input) {
        *out_byte = table.0[in_byte as usize];
    }
}

#[inline]
pub fn process_slice_multiply_add_gf8(table: &ByteMulTable, output: &mut [u8], input: &[u8]) {
    debug_assert_eq!(output.len(), input.len());
    for (out_byte, &in_byte) in output.iter_mut().zip(input) {
        *out_byte ^= table.0[in_byte as usize];
    }
}

/// `output ^= input`, a word at a time when alignment allows
#[inline]
pub fn xor_slice(output: &mut [u8], input: &[u8]) {
    debug_assert_eq!(output.len(), input.len());

    if let (Ok(out_words), Ok(in_words)) = (
        bytemuck::try_cast_slice_mut::<u8, u64>(output),
        bytemuck::try_cast_slice::<u8, u64>(input),
    ) {
        for (out_word, in_word) in out_words.iter_mut().zip(in_words) {
            *out_word ^= in_word;
        }
        return;
    }

    for (out_byte, in_byte) in output.iter_mut().zip(input) {
        *out_byte ^= in_byte;
    }
}
