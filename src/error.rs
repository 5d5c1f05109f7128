//! Error types for the canonical Huffman codec.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while compressing or decompressing.
#[derive(Debug, Error)]
pub enum HuffError {
    /// The source or sink failed. Never retried.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// More distinct symbols (sentinel included) than the one byte size field can hold.
    #[error("alphabet of {symbols} symbols does not fit the 1 byte header field (max 255)")]
    AlphabetOverflow { symbols: usize },

    /// The tree produced a code longer than the codec can carry.
    #[error("code length {len} exceeds the maximum of 64 bits")]
    CodeTooLong { len: usize },

    /// Code lengths that cannot form a prefix-free code (Kraft sum above 1).
    #[error("code lengths are oversubscribed and cannot form a prefix-free code")]
    OversubscribedCodes,

    /// The input ended before the symbol table was complete.
    #[error("input ends inside the header")]
    TruncatedHeader,

    /// The symbol table is structurally invalid.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// No prefix of the pending bits is a known code.
    #[error("no code matches the bit stream at payload byte {position}")]
    NoMatchingCode { position: u64 },

    /// The second pass over the input did not see what the first pass counted.
    #[error("input changed between the counting pass and the encoding pass")]
    SourceChanged,

    /// The payload ended before the end-of-stream code. Partial output was written.
    #[error("compressed data ended early; {bytes} bytes were recovered")]
    Incomplete { bytes: u64 },

    /// Refusing to clobber an existing file.
    #[error("output file {} already exists (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, HuffError>;
