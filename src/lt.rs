//! # Luby Transform (LT) fountain codec
//!
//! A rateless, sparse-graph erasure code over GF(2). The encoder draws a
//! degree `d` from a [`DegreeDistribution`], picks `d` distinct source
//! symbols, and XORs them together. The decoder rebuilds a bipartite graph
//! between encoded and source symbols as packets arrive and peels it:
//! whenever an encoded symbol's remaining edge count drops to one, its
//! value is exactly the one source symbol it still touches.
//!
//! Encoder and decoder must be constructed with the same seed — the degree
//! sequence and edge sets are never transmitted, only replayed from the
//! shared PRNG.

use std::collections::BTreeSet;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::degree::DegreeDistribution;
use crate::error::FountainError;
use crate::node::{xor_into, Node};
use crate::prng::Prng;

/// Whether `feed` should attempt to finish decoding immediately after
/// folding in a symbol, or only update the graph and let the caller call
/// [`LtCodec::decode`] later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Run the peeling loop to completion (or exhaustion) inside `feed`.
    Eager,
    /// Only update the graph; the caller drives decoding explicitly.
    Deferred,
}

/// Luby Transform encoder/decoder.
///
/// `'a` is the lifetime of a caller-supplied input buffer passed to
/// [`LtCodec::set_input_data_view`]; codecs built from owned/copied data
/// have no such constraint and `'a` defaults to `'static`.
pub struct LtCodec<'a> {
    symbol_length: usize,
    input_symbols: usize,
    input_data_size: usize,
    input_data: Option<Buffer<'a>>,

    prng: Prng,
    degree_dist: Box<dyn DegreeDistribution>,

    current_hash_bits: Vec<usize>,
    samples: usize,
    current_symbol: usize,
    degrees: Vec<usize>,

    data_nodes: Vec<Node<'a>>,
    encoded_nodes: Vec<Node<'a>>,

    data_queue: Vec<usize>,
    encoded_queue: Vec<usize>,

    unknown_blocks: usize,
}

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

impl<'a> LtCodec<'a> {
    /// Build a codec around a given degree distribution (`IdealSoliton`,
    /// `RobustSoliton`, or any other implementation).
    pub fn new(degree_dist: Box<dyn DegreeDistribution>) -> Self {
        LtCodec {
            symbol_length: 0,
            input_symbols: 0,
            input_data_size: 0,
            input_data: None,
            prng: Prng::new(),
            degree_dist,
            current_hash_bits: Vec::new(),
            samples: 0,
            current_symbol: 0,
            degrees: Vec::new(),
            data_nodes: Vec::new(),
            encoded_nodes: Vec::new(),
            data_queue: Vec::new(),
            encoded_queue: Vec::new(),
            unknown_blocks: 0,
        }
    }

    /// Seed both the codec's own PRNG and its degree distribution's PRNG.
    /// Encoder and decoder must agree on this seed.
    pub fn set_seed(&mut self, seed: u32) {
        self.prng.set_seed(seed);
        self.degree_dist.set_seed(seed);
    }

    /// Provide the input data size before the full buffer is available —
    /// used when the caller will stream data in later, or when only
    /// decoding is needed and no source data exists yet.
    pub fn set_input_data_size(&mut self, len: usize) {
        self.input_data_size = len;
    }

    /// Take ownership of a private copy of `data`.
    pub fn set_input_data(&mut self, data: &[u8]) {
        self.input_data = Some(Buffer::Owned(data.to_vec().into_boxed_slice()));
        self.set_input_data_size(data.len());
    }

    /// Borrow `data` for the codec's lifetime rather than copying it.
    pub fn set_input_data_view(&mut self, data: &'a [u8]) {
        self.input_data_size = data.len();
        self.input_data = Some(Buffer::Borrowed(data));
    }

    /// Fix the symbol length and derive the source-symbol count from the
    /// input data size set via [`LtCodec::set_input_data`] /
    /// [`LtCodec::set_input_data_size`].
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
        self.samples = self.input_symbols;
        self.degree_dist.set_input_size(self.input_symbols);

        self.data_nodes = (0..self.input_symbols).map(|_| Node::zeroed(len)).collect();
        self.encoded_nodes = Vec::with_capacity(self.input_symbols + self.input_symbols / 5);
        self.unknown_blocks = self.input_symbols;
        Ok(())
    }

    /// The degree drawn for the symbol most recently produced by
    /// [`LtCodec::generate_symbol`] or consumed by [`LtCodec::feed`].
    pub fn symbol_degree(&self) -> usize {
        self.degrees.last().copied().unwrap_or(0)
    }

    /// The degree drawn for symbol index `n`, if it has been produced or
    /// fed yet. Reads from history rather than sampling, so it never
    /// disturbs PRNG state.
    pub fn symbol_degree_at(&self, n: usize) -> Option<usize> {
        self.degrees.get(n).copied()
    }

    /// Advance the shared PRNG by one symbol's worth of draws, optionally
    /// discarding the result (`discard = true`) rather than recording it
    /// as the current edge set. Backs both the live draw in
    /// `generate_symbol`/`feed` and the fast-forward loop `feed` uses to
    /// catch up to an out-of-order or skipped index.
    fn advance(&mut self, discard: bool) {
        let degree = self.degree_dist.sample_degree();
        let mut chosen = BTreeSet::new();
        while chosen.len() < degree {
            let value = self.prng.next_below(self.samples);
            chosen.insert(value);
        }
        if !discard {
            self.current_hash_bits.clear();
            self.current_hash_bits.extend(chosen.iter().copied());
            self.degrees.push(degree);
        }
        self.current_symbol += 1;
    }

    /// Produce the next encoded symbol in sequence. Requires input data and
    /// symbol length to already be set.
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
        for &idx in &self.current_hash_bits {
            let start = idx * self.symbol_length;
            xor_into(&mut out, &source[start..start + self.symbol_length]);
        }
        trace!(symbol = self.current_symbol - 1, edges = ?self.current_hash_bits, "generate_symbol");
        Ok(Bytes::from(out))
    }

    /// Fold a received encoded symbol (external index `number`) into the
    /// decode graph, then optionally drive the peeling loop.
    ///
    /// Returns `true` if the codec is fully decoded after this call (always
    /// `false` under [`DecodeMode::Deferred`]). Indices must be
    /// non-decreasing across calls in the order the shared PRNG advances —
    /// a repeat of the index most recently consumed is rejected (returns
    /// `false` without mutating decoder state) rather than left undefined.
    pub fn feed(&mut self, data: &[u8], number: usize, mode: DecodeMode) -> bool {
        if !self.prepare_edges(number) {
            return false;
        }
        let mut buffer = data.to_vec().into_boxed_slice();
        let edges = self.reduce_buffer_and_collect_edges(&mut buffer, number);
        let mut node = Node::from_box(buffer);
        node.init_edges(edges);
        self.install_node(node, number, mode)
    }

    /// Like [`LtCodec::feed`], but borrows `data` for the codec's lifetime
    /// instead of copying it (`Ownership::View`). The caller
    /// must not mutate `data` again — the decoder reduces edges into it in
    /// place and may still need its current contents after this call
    /// returns, for as long as the codec lives.
    pub fn feed_view(&mut self, data: &'a mut [u8], number: usize, mode: DecodeMode) -> bool {
        if !self.prepare_edges(number) {
            return false;
        }
        let edges = self.reduce_buffer_and_collect_edges(data, number);
        let mut node = Node::view(data);
        node.init_edges(edges);
        self.install_node(node, number, mode)
    }

    /// Reject a duplicate `number`, then fast-forward the shared PRNG to
    /// `number`'s draw, leaving `current_hash_bits` holding its edge set.
    /// Returns `false` (without touching PRNG state) for a rejected
    /// duplicate, `true` otherwise.
    fn prepare_edges(&mut self, number: usize) -> bool {
        trace!(number, "feed begin");
        if self.current_symbol > 0 && number + 1 == self.current_symbol && self.already_fed(number)
        {
            trace!(number, "duplicate index rejected");
            return false;
        }
        while self.current_symbol != number + 1 {
            let discard = self.current_symbol != number;
            self.advance(discard);
        }
        true
    }

    /// Peel already-known source symbols out of `buffer` and return the
    /// edge set that remains. Shared by `feed` and `feed_view` regardless
    /// of how the caller's buffer is owned.
    fn reduce_buffer_and_collect_edges(&mut self, buffer: &mut [u8], number: usize) -> Vec<usize> {
        let mut edges: Vec<usize> = self.current_hash_bits.clone();
        for &input_idx in &self.current_hash_bits {
            if self.data_nodes[input_idx].is_known() {
                if let Some(pos) = edges.iter().position(|&e| e == input_idx) {
                    edges.swap_remove(pos);
                }
                xor_into(buffer, self.data_nodes[input_idx].data());
            }
            self.data_nodes[input_idx].add_edge(number);
        }
        edges
    }

    fn install_node(&mut self, node: Node<'a>, number: usize, mode: DecodeMode) -> bool {
        if self.encoded_nodes.len() <= number {
            self.encoded_nodes
                .resize_with(number + 1, || Node::zeroed(0));
        }
        if node.edges_num() == 1 {
            self.encoded_queue.push(number);
        }
        self.encoded_nodes[number] = node;
        trace!(number, "feed end");
        match mode {
            DecodeMode::Eager => self.decode(),
            DecodeMode::Deferred => false,
        }
    }

    fn already_fed(&self, number: usize) -> bool {
        self.encoded_nodes
            .get(number)
            .map(|n| n.is_known() || n.edges_num() > 0)
            .unwrap_or(false)
    }

    /// Run the peeling loop until both work queues are empty. Returns
    /// whether every source symbol is now known.
    pub fn decode(&mut self) -> bool {
        while !self.data_queue.is_empty() || !self.encoded_queue.is_empty() {
            let encoded_batch = std::mem::take(&mut self.encoded_queue);
            let data_batch = std::mem::take(&mut self.data_queue);

            for idx in encoded_batch {
                self.process_encoded_node(idx);
            }
            for idx in data_batch {
                self.process_input_node(idx);
            }
        }
        debug!(unknown_blocks = self.unknown_blocks, "decode loop settled");
        self.unknown_blocks == 0
    }

    fn process_encoded_node(&mut self, num: usize) {
        let edge = {
            let node = &self.encoded_nodes[num];
            if node.edges_num() != 1 {
                return;
            }
            node.edges()[0]
        };
        self.encoded_nodes[num].clear_edges();

        if self.data_nodes[edge].is_known() {
            return;
        }

        let value = self.encoded_nodes[num].data().to_vec();
        let data_node = &mut self.data_nodes[edge];
        data_node.data_mut().copy_from_slice(&value);
        data_node.make_known();
        data_node.erase_edge(num);
        self.unknown_blocks -= 1;
        trace!(edge, "source symbol decoded");
        self.data_queue.push(edge);
    }

    fn process_input_node(&mut self, num: usize) {
        let edges = self.data_nodes[num].edges().to_vec();
        let (data_nodes, encoded_nodes) = (&mut self.data_nodes, &mut self.encoded_nodes);
        let source_value = data_nodes[num].data().to_vec();

        for edge in edges {
            let droplet = &mut encoded_nodes[edge];
            droplet.erase_edge(num);
            if droplet.edges_num() == 0 {
                continue;
            }
            xor_into(droplet.data_mut(), &source_value);
            if droplet.edges_num() == 1 {
                self.encoded_queue.push(edge);
            }
        }
        self.data_nodes[num].clear_edges();
    }

    /// The fully reassembled input data, if every source symbol has been
    /// decoded.
    pub fn decoded_buffer(&self) -> Option<Bytes> {
        if self.unknown_blocks != 0 {
            return None;
        }
        let mut buffer = vec![0u8; self.input_data_size];
        for (idx, node) in self.data_nodes.iter().enumerate() {
            let start = idx * self.symbol_length;
            buffer[start..start + self.symbol_length].copy_from_slice(node.data());
        }
        Some(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::degree::IdealSoliton;

    fn roundtrip(k: usize, symbol_length: usize, seed: u32, extra_symbols: usize) -> bool {
        let input: Vec<u8> = (0..k * symbol_length).map(|i| (i * 7 + 3) as u8).collect();

        let mut encoder = LtCodec::new(Box::new(IdealSoliton::new()));
        encoder.set_seed(seed);
        encoder.set_input_data(&input);
        encoder.set_symbol_length(symbol_length).unwrap();

        let mut decoder = LtCodec::new(Box::new(IdealSoliton::new()));
        decoder.set_seed(seed);
        decoder.set_input_data_size(input.len());
        decoder.set_symbol_length(symbol_length).unwrap();

        let mut done = false;
        for n in 0..(k + extra_symbols) {
            let symbol = encoder.generate_symbol().unwrap();
            if decoder.feed(&symbol, n, DecodeMode::Eager) {
                done = true;
                break;
            }
        }
        if !done {
            return false;
        }
        decoder.decoded_buffer().as_deref() == Some(input.as_slice())
    }

    #[test]
    fn small_input_decodes_with_enough_symbols() {
        assert!(roundtrip(20, 4, 1234, 20));
    }

    #[test]
    fn deterministic_across_two_runs() {
        let a = roundtrip(16, 8, 99, 16);
        let b = roundtrip(16, 8, 99, 16);
        assert_eq!(a, b);
    }

    #[test]
    fn generate_symbol_before_setup_errors() {
        let mut codec = LtCodec::new(Box::new(IdealSoliton::new()));
        assert_eq!(
            codec.generate_symbol().unwrap_err(),
            FountainError::InputDataNotSet
        );
    }

    #[test]
    fn symbol_length_must_divide_input_size() {
        let mut codec = LtCodec::new(Box::new(IdealSoliton::new()));
        codec.set_input_data(&[0u8; 10]);
        assert_eq!(
            codec.set_symbol_length(3).unwrap_err(),
            FountainError::SizeNotMultiple {
                input_data_size: 10,
                symbol_length: 3,
            }
        );
    }

    #[test]
    fn symbol_degree_reads_history_without_consuming_prng() {
        let mut encoder = LtCodec::new(Box::new(IdealSoliton::new()));
        encoder.set_seed(5);
        encoder.set_input_data(&[0u8; 40]);
        encoder.set_symbol_length(4).unwrap();
        let _ = encoder.generate_symbol().unwrap();
        let d1 = encoder.symbol_degree();
        let d2 = encoder.symbol_degree();
        assert_eq!(d1, d2);
    }

    #[test]
    fn duplicate_index_is_rejected_without_mutating_state() {
        let mut decoder = LtCodec::new(Box::new(IdealSoliton::new()));
        decoder.set_seed(1);
        decoder.set_input_data_size(40);
        decoder.set_symbol_length(4).unwrap();

        let mut encoder = LtCodec::new(Box::new(IdealSoliton::new()));
        encoder.set_seed(1);
        encoder.set_input_data(&[1u8; 40]);
        encoder.set_symbol_length(4).unwrap();
        let symbol = encoder.generate_symbol().unwrap();

        assert!(!decoder.feed(&symbol, 0, DecodeMode::Deferred));
        let before = decoder.unknown_blocks;
        assert!(!decoder.feed(&symbol, 0, DecodeMode::Deferred));
        assert_eq!(decoder.unknown_blocks, before);
    }
}
