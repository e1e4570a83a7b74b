//! # fountain-codes
//!
//! Rateless erasure coding over GF(2): two fountain code families that let a
//! sender produce an unbounded stream of encoded symbols from a fixed set of
//! source symbols, and a receiver reconstruct the source from any
//! sufficiently large subset of them, arriving in any order.
//!
//! ## Crate structure
//!
//! - [`prng`] — WELL-512 pseudo-random generator shared by both codecs
//! - [`degree`] — Degree distributions (Ideal Soliton, Robust Soliton) for LT
//! - [`node`] — Decode-graph vertex shared by both codecs' decoders
//! - [`lt`] — Luby Transform: sparse-graph peeling codec
//! - [`rlf`] — Random Linear Fountain: dense Gauss-Jordan codec
//! - [`error`] — Setup/precondition error type

pub mod degree;
pub mod error;
pub mod lt;
pub mod node;
pub mod prng;
pub mod rlf;

pub use degree::{DegreeDistribution, IdealSoliton, RobustSoliton};
pub use error::FountainError;
pub use lt::{DecodeMode, LtCodec};
pub use prng::Prng;
pub use rlf::RlfCodec;
