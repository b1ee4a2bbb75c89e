//! Error types for the sync module.

use thiserror::Error;

use svs_core::{CodecError, WriterId};

/// Errors that can occur during sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A received state vector could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] svs_store::StoreError),

    /// Message validation failed.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Fetching an entry failed in a way retrying will not fix.
    #[error("fetch of {writer}#{seq} failed: {message}")]
    Fetch {
        writer: WriterId,
        seq: u64,
        message: String,
    },

    /// Our own log already holds a different entry at the next seq.
    #[error("sequence conflict publishing {writer}#{seq}")]
    SequenceConflict { writer: WriterId, seq: u64 },

    /// Our own writer has reached the largest representable seq.
    #[error("sequence space exhausted for {writer}")]
    SequenceExhausted { writer: WriterId },
}

impl SyncError {
    /// Errors caused by one bad message; the session can keep going.
    pub fn is_message_error(&self) -> bool {
        matches!(self, SyncError::Codec(_) | SyncError::InvalidMessage(_))
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
