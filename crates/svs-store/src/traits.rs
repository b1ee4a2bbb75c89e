//! Store trait: the abstract interface for per-writer log persistence.
//!
//! Every writer owns an append-only log addressed by sequence number. The
//! sync layer reads the highest stored seq per writer to seed its state
//! vector, and writes fetched entries back.

use async_trait::async_trait;
use bytes::Bytes;
use svs_core::{StateVector, WriterId};

use crate::error::Result;

/// Result of inserting an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertResult {
    /// Entry was inserted.
    Inserted,
    /// The same payload is already stored at this position (idempotent).
    AlreadyExists,
    /// A different payload is stored at this position.
    Conflict {
        /// The payload already stored.
        existing: Bytes,
    },
}

/// Async interface for entry persistence.
///
/// # Design Notes
///
/// - **Idempotent inserts**: inserting the same `(writer, seq, payload)`
///   twice returns `AlreadyExists`.
/// - **No overwrite**: a different payload at an occupied position returns
///   `Conflict` and leaves the stored payload untouched.
/// - **Gaps allowed**: entries may arrive out of order; `latest_seq` is the
///   highest stored seq, not the highest contiguous one.
#[async_trait]
pub trait Store: Send + Sync {
    /// Store `payload` at `(writer, seq)`.
    async fn insert_entry(&self, writer: &WriterId, seq: u64, payload: &[u8])
        -> Result<InsertResult>;

    /// Get the payload at `(writer, seq)`.
    async fn get_entry(&self, writer: &WriterId, seq: u64) -> Result<Option<Bytes>>;

    /// Get stored entries with `start <= seq <= end`, ordered by seq.
    async fn get_entries_range(
        &self,
        writer: &WriterId,
        start: u64,
        end: u64,
    ) -> Result<Vec<(u64, Bytes)>>;

    /// Highest stored seq for `writer`, or 0 if none.
    async fn latest_seq(&self, writer: &WriterId) -> Result<u64>;

    /// Highest stored seq for every writer with at least one entry.
    async fn latest_seqs(&self) -> Result<Vec<(WriterId, u64)>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Build a state vector from the highest stored seq of each writer.
    fn load_state_vector(&self) -> impl std::future::Future<Output = Result<StateVector>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn load_state_vector(&self) -> Result<StateVector> {
        let latest = self.latest_seqs().await?;
        Ok(latest.into_iter().collect())
    }
}
