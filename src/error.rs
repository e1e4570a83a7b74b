//! Setup/precondition errors.
//!
//! These cover structural misuse of the builder-style setup methods
//! (`set_symbol_length`, `set_input_data`, …). The steady-state `feed`/
//! `decode` contract stays boolean, per the original design — see the
//! module docs on [`crate::lt::LtCodec`] and [`crate::rlf::RlfCodec`].

use thiserror::Error;

/// Errors raised while configuring a codec, before any symbols are
/// generated or fed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FountainError {
    /// `set_symbol_length` was called with a length of zero.
    #[error("symbol length must be nonzero")]
    ZeroSymbolLength,

    /// The input data size is not evenly divisible by the symbol length.
    /// This codec family does not support a trailing partial symbol —
    /// callers must zero-pad.
    #[error(
        "input data size {input_data_size} is not a multiple of symbol length {symbol_length}"
    )]
    SizeNotMultiple {
        input_data_size: usize,
        symbol_length: usize,
    },

    /// `set_symbol_length` was called before `set_input_data`/
    /// `set_input_data_size` established a data size to divide.
    #[error("input data size not set; call set_input_data_size or set_input_data first")]
    MissingInputSize,

    /// `generate_symbol` was called before `set_symbol_length`.
    #[error("symbol length not set; call set_symbol_length before generating symbols")]
    SymbolLengthNotSet,

    /// `generate_symbol` was called before `set_input_data`.
    #[error("input data not set; call set_input_data before generate_symbol")]
    InputDataNotSet,
}
