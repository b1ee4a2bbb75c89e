//! Error types for the SVS core.

use thiserror::Error;

/// Errors that can occur while decoding a state vector.
///
/// Encoding never fails; every vector that can be built through
/// [`StateVector::set`](crate::StateVector::set) has a wire form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A TLV type number did not match the field expected at this position.
    #[error("malformed tag: expected {expected}, found {found}")]
    MalformedTag { expected: u64, found: u64 },

    /// A declared length does not agree with the bytes available.
    ///
    /// Covers an outer length that does not consume exactly the rest of the
    /// buffer, an inner length that runs past the end, and a truncated
    /// TL-number.
    #[error("length mismatch: declared {declared}, available {available}")]
    LengthMismatch { declared: u64, available: u64 },

    /// A sequence number field was not 1, 2, 4 or 8 bytes wide.
    #[error("unsupported sequence number width: {0} bytes")]
    UnsupportedSeqWidth(usize),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
