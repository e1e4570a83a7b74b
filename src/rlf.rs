//! # Random Linear Fountain (RLF) codec
//!
//! A dense fountain code over GF(2): every encoded symbol is the XOR of a
//! random subset of all `k` source symbols, one coin flip per source symbol
//! per encoded symbol. The decoder collects `k` (or more) linearly
//! independent rows and solves the resulting GF(2) linear system with
//! Gauss-Jordan elimination — no peeling, no sparse graph, but a higher
//! per-symbol decode cost than LT.
//!
//! Unlike LT, a received row's coefficient vector is retained alongside its
//! data for the lifetime of the decoder (`RlfRow::hash_bits`), both as the
//! elimination scratchpad and for tracing introspection — mirroring how the
//! original keeps `_hash_bits` around rather than discarding it after use.

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::FountainError;
use crate::prng::Prng;

enum Buffer<'a> {
    Owned(Box<[u8]>),
    Borrowed(&'a [u8]),
}

impl<'a> Buffer<'a> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Owned(b) => b,
            Buffer::Borrowed(b) => b,
        }
    }
}

enum RowBuffer<'a> {
    Owned(Box<[u8]>),
    Borrowed(&'a mut [u8]),
}

impl<'a> RowBuffer<'a> {
    fn as_slice(&self) -> &[u8] {
        match self {
            RowBuffer::Owned(b) => b,
            RowBuffer::Borrowed(b) => b,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            RowBuffer::Owned(b) => b,
            RowBuffer::Borrowed(b) => b,
        }
    }
}

/// One received encoded symbol together with the coefficient row (one bit
/// per source symbol) that produced it.
struct RlfRow<'a> {
    data: RowBuffer<'a>,
    hash_bits: Vec<u8>,
}

/// Random Linear Fountain encoder/decoder.
pub struct RlfCodec<'a> {
    symbol_length: usize,
    input_symbols: usize,
    input_data_size: usize,
    input_data: Option<Buffer<'a>>,

    prng: Prng,
    current_hash_bits: Vec<u8>,
    current_symbol: usize,

    rows: Vec<RlfRow<'a>>,
}

impl<'a> RlfCodec<'a> {
    pub fn new() -> Self {
        RlfCodec {
            symbol_length: 0,
            input_symbols: 0,
            input_data_size: 0,
            input_data: None,
            prng: Prng::new(),
            current_hash_bits: Vec::new(),
            current_symbol: 0,
            rows: Vec::new(),
        }
    }

    pub fn set_seed(&mut self, seed: u32) {
        self.prng.set_seed(seed);
    }

    pub fn set_input_data_size(&mut self, len: usize) {
        self.input_data_size = len;
    }

    pub fn set_input_data(&mut self, data: &[u8]) {
        self.input_data = Some(Buffer::Owned(data.to_vec().into_boxed_slice()));
        self.set_input_data_size(data.len());
    }

    pub fn set_input_data_view(&mut self, data: &'a [u8]) {
        self.input_data_size = data.len();
        self.input_data = Some(Buffer::Borrowed(data));
    }

    pub fn set_symbol_length(&mut self, len: usize) -> Result<(), FountainError> {
        if len == 0 {
            return Err(FountainError::ZeroSymbolLength);
        }
        if self.input_data_size == 0 {
            return Err(FountainError::MissingInputSize);
        }
        if self.input_data_size % len != 0 {
            return Err(FountainError::SizeNotMultiple {
                input_data_size: self.input_data_size,
                symbol_length: len,
            });
        }
        self.symbol_length = len;
        self.input_symbols = self.input_data_size / len;
        Ok(())
    }

    /// Advance the PRNG by one full coefficient row, optionally discarding
    /// the draws (`discard = true`) instead of recording them as the
    /// current row. Shared by the live draw and `feed`'s fast-forward loop.
    fn advance(&mut self, discard: bool) {
        if !discard {
            self.current_hash_bits.clear();
            self.current_hash_bits.resize(self.input_symbols, 0);
            for bit in self.current_hash_bits.iter_mut() {
                *bit = self.prng.rand_bit();
            }
        } else {
            for _ in 0..self.input_symbols {
                self.prng.rand_bit();
            }
        }
        self.current_symbol += 1;
    }

    pub fn generate_symbol(&mut self) -> Result<Bytes, FountainError> {
        let data = self
            .input_data
            .as_ref()
            .ok_or(FountainError::InputDataNotSet)?;
        if self.symbol_length == 0 {
            return Err(FountainError::SymbolLengthNotSet);
        }

        self.advance(false);
        let mut out = vec![0u8; self.symbol_length];
        let source = data.as_slice();
        for (idx, &bit) in self.current_hash_bits.iter().enumerate() {
            if bit != 0 {
                let start = idx * self.symbol_length;
                for (o, s) in out.iter_mut().zip(&source[start..start + self.symbol_length]) {
                    *o ^= s;
                }
            }
        }
        trace!(symbol = self.current_symbol - 1, "generate_symbol");
        Ok(Bytes::from(out))
    }

    /// Fold a received encoded symbol (external index `number`) into the
    /// row set. Rows must arrive with non-decreasing `number` in PRNG order,
    /// same discipline as [`crate::lt::LtCodec::feed`].
    pub fn feed(&mut self, data: &[u8], number: usize) {
        self.fast_forward_to(number);
        self.rows.push(RlfRow {
            data: RowBuffer::Owned(data.to_vec().into_boxed_slice()),
            hash_bits: self.current_hash_bits.clone(),
        });
    }

    /// Like [`RlfCodec::feed`], but borrows `data` for the codec's lifetime
    /// instead of copying it (`Ownership::View`). The row's
    /// coefficient vector still lives in an owned `Vec`; only the symbol
    /// payload is borrowed.
    pub fn feed_view(&mut self, data: &'a mut [u8], number: usize) {
        self.fast_forward_to(number);
        self.rows.push(RlfRow {
            data: RowBuffer::Borrowed(data),
            hash_bits: self.current_hash_bits.clone(),
        });
    }

    fn fast_forward_to(&mut self, number: usize) {
        trace!(number, "feed");
        while self.current_symbol != number + 1 {
            let discard = self.current_symbol != number;
            self.advance(discard);
        }
    }

    /// Reduce the collected rows to row-echelon form and back-substitute,
    /// solving for each source symbol. Returns whether every source symbol
    /// was recovered. With `allow_partial = false`, fewer than `k` rows
    /// short-circuits to `false` without touching the row set.
    pub fn decode(&mut self, allow_partial: bool) -> bool {
        if !allow_partial && self.rows.len() < self.input_symbols {
            trace!("not enough rows for a full decode");
            return false;
        }

        let pivot_count = self.input_symbols.min(self.rows.len());
        for idx in 0..pivot_count {
            if self.rows[idx].hash_bits[idx] != 1 {
                let swap_idx = (idx + 1..self.rows.len()).find(|&c| self.rows[c].hash_bits[idx] != 0);
                match swap_idx {
                    Some(swap_idx) => self.rows.swap(idx, swap_idx),
                    None => {
                        trace!(idx, "no pivot candidate, decode fails");
                        return false;
                    }
                }
            }

            for following in (idx + 1)..self.rows.len() {
                if self.rows[following].hash_bits[idx] != 0 {
                    eliminate(&mut self.rows, idx, following, self.symbol_length);
                }
            }
        }

        let mut valid = self.rows.len() >= self.input_symbols;
        for idx in 0..pivot_count {
            if self.rows[idx].hash_bits[idx] != 1 {
                valid = false;
                break;
            }
            for preceding in 0..idx {
                if self.rows[preceding].hash_bits[idx] != 0 {
                    eliminate(&mut self.rows, idx, preceding, self.symbol_length);
                }
            }
        }

        debug!(valid, rows = self.rows.len(), k = self.input_symbols, "decode settled");
        valid
    }

    /// The fully reassembled input data, if [`RlfCodec::decode`] last
    /// returned `true`.
    pub fn decoded_buffer(&self) -> Option<Bytes> {
        if self.rows.len() < self.input_symbols {
            return None;
        }
        for idx in 0..self.input_symbols {
            if self.rows[idx].hash_bits[idx] != 1 {
                return None;
            }
        }
        let mut buffer = vec![0u8; self.input_data_size];
        for idx in 0..self.input_symbols {
            let start = idx * self.symbol_length;
            buffer[start..start + self.symbol_length]
                .copy_from_slice(self.rows[idx].data.as_slice());
        }
        Some(Bytes::from(buffer))
    }
}

impl<'a> Default for RlfCodec<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// XOR row `source` into row `target`, both the data buffer and the
/// coefficient row, in place. Uses `split_at_mut` so both rows can be
/// borrowed mutably from the same `Vec` at once.
fn eliminate(rows: &mut [RlfRow<'_>], source: usize, target: usize, symbol_length: usize) {
    let hi = source.max(target);
    let (left, right) = rows.split_at_mut(hi);
    let (src_row, dst_row) = if source < target {
        (&left[source], &mut right[0])
    } else {
        (&right[0], &mut left[target])
    };
    let src_data = src_row.data.as_slice();
    let dst_data = dst_row.data.as_mut_slice();
    for i in 0..symbol_length {
        dst_data[i] ^= src_data[i];
    }
    for i in 0..dst_row.hash_bits.len() {
        dst_row.hash_bits[i] ^= src_row.hash_bits[i];
    }
}
