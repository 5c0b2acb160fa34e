//! Error types for the codec and its bit-stream plumbing.
//!
//! All operations return structured errors rather than panicking.
//! The binary maps these onto its exit status via `anyhow`.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a failure domain:
/// - Bit I/O: reading/writing bits from/to the underlying byte stream
/// - Format: the encoded stream violates the wire format
/// - I/O: the underlying byte stream itself failed
#[derive(Debug, Error)]
pub enum Error {
    /// Bit-level read or write failed (e.g., reading past end of stream)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// The encoded stream is malformed (e.g., truncated block)
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// Underlying byte stream error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bit-level I/O errors.
#[derive(Debug, Error)]
pub enum BitIoError {
    /// Attempted to read past the end of the bit stream
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Requested field width exceeds what a u64 can carry
    #[error("invalid bit width: {0} (maximum 64)")]
    InvalidBitWidth(usize),

    /// Value does not fit in the requested field width
    #[error("value {value} does not fit in {width} bits")]
    ValueTooWide { value: u64, width: usize },
}

/// Wire-format errors detected while expanding.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The stream ended partway through an encoded block
    #[error("truncated encoded block: stream ended inside a {width}-bit field")]
    TruncatedBlock { width: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
