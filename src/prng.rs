//! WELL-512 pseudo-random generator.
//!
//! Panneton/L'Ecuyer/Matsumoto's WELL-512, seeded the cheap, deliberately
//! non-cryptographic way this codebase uses throughout for reproducible
//! encoder/decoder replay: the seed is value-replicated across all 16 state
//! words rather than hashed. Two `Prng`s constructed from the same seed
//! produce byte-identical output forever after — that property, not
//! statistical strength, is what the fountain codecs depend on.
//!
//! The recurrence's word width is fixed at `u64`: `rand_float` divides by
//! `2^64`, and every other component in this crate assumes the same width
//! when replaying a draw sequence.

const STATE_WORDS: usize = 16;
const BIT_WIDTH: u32 = u64::BITS;

/// WELL-512 generator state.
#[derive(Clone, Debug)]
pub struct Prng {
    state: [u64; STATE_WORDS],
    index: usize,
    bit_pool: u64,
    bit_idx: u32,
}

impl Prng {
    /// A generator seeded to all-zero state words; call [`Prng::set_seed`]
    /// before drawing from it.
    pub fn new() -> Self {
        Prng {
            state: [0u64; STATE_WORDS],
            index: 0,
            bit_pool: 0,
            bit_idx: BIT_WIDTH,
        }
    }

    /// Reset the generator to the state derived from `seed`.
    ///
    /// The seed is replicated across every state word (`word = seed |
    /// seed << 32`) rather than hashed in — cheap and, crucially,
    /// identical between any two implementations that agree on word width.
    pub fn set_seed(&mut self, seed: u32) {
        let half = seed as u64;
        let word = half | (half << 32);
        self.state = [word; STATE_WORDS];
        self.index = 0;
        self.bit_pool = 0;
        self.bit_idx = BIT_WIDTH;
    }

    /// Advance the WELL-512 recurrence by one step and return the new word.
    pub fn next(&mut self) -> u64 {
        let i = self.index;
        let a0 = self.state[i];
        let c0 = self.state[(i + 13) & 15];
        let b = a0 ^ c0 ^ (a0 << 16) ^ (c0 << 15);
        let mut c = self.state[(i + 9) & 15];
        c ^= c >> 11;
        let a = b ^ c;
        self.state[i] = a;
        let d = a ^ ((a << 5) & 0xDA442D24);
        self.index = (i + 15) & 15;
        let j = self.index;
        let aj = self.state[j];
        self.state[j] = aj ^ b ^ d ^ (aj << 2) ^ (b << 18) ^ (c << 28);
        self.state[j]
    }

    /// A uniform double in `[0, 1)`.
    pub fn rand_float(&mut self) -> f64 {
        self.next() as f64 / (u64::MAX as f64 + 1.0)
    }

    /// A single uniform bit, drawn LSB-first from a lazily refilled word.
    pub fn rand_bit(&mut self) -> u8 {
        if self.bit_idx == BIT_WIDTH {
            self.bit_pool = self.next();
            self.bit_idx = 0;
        }
        let bit = (self.bit_pool & 1) as u8;
        self.bit_pool >>= 1;
        self.bit_idx += 1;
        bit
    }

    /// A uniform index in `[0, modulus)`. Used by the rejection sampler
    /// that picks distinct source indices for an encoded symbol's edges.
    pub fn next_below(&mut self, modulus: usize) -> usize {
        debug_assert!(modulus > 0);
        (self.next() % modulus as u64) as usize
    }
}

impl Default for Prng {
    fn default() -> Self {
        Self::new()
    }
}
