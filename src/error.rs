//! Error types for the Valli combinatorial codec.
//!
//! Implémentation de valli, un codec entropique basé sur le système de
//! numération combinatoire.

use thiserror::Error;

/// Everything that can go wrong compressing or decompressing a message.
///
/// Every public, fallible operation in this crate returns this type instead
/// of panicking on malformed *input*. Panics remain acceptable only for
/// invariant violations a caller cannot trigger (e.g. an internal index
/// bug), matching how the rest of this codebase treats programmer error.
#[derive(Debug, Error)]
pub enum ValliError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Input uses all 256 byte values; Valli requires at least one unused
    /// byte to serve as the in-place "null" sentinel during encoding.
    #[error("input uses all 256 byte values; at least one must be unused")]
    FullAlphabet,

    /// Fewer than two distinct byte values appear in the input.
    #[error("input has fewer than 2 distinct byte values; nothing to encode")]
    InsufficientAlphabet,

    /// The frequency-table bitstream is truncated or internally inconsistent.
    #[error("malformed frequency table: {0}")]
    MalformedHeader(String),

    /// The compressed big integer is outside the space the frequency table
    /// describes, or the binomial inversion produced an inconsistent state.
    #[error("corrupt compressed data")]
    CorruptCode,

    /// A symbol count does not fit in the 56-bit field reserved for it.
    #[error("symbol count overflows the 56-bit count field")]
    CountOverflow,
}

pub type Result<T> = std::result::Result<T, ValliError>;
