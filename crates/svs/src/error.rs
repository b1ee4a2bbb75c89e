//! Error types for the Node.

use svs_core::CodecError;
use svs_store::StoreError;
use svs_sync::SyncError;
use thiserror::Error;

/// Errors that can occur during Node operations.
#[derive(Debug, Error)]
pub enum SvsError {
    /// Wire codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Sync error.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Invalid operation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for Node operations.
pub type Result<T> = std::result::Result<T, SvsError>;
