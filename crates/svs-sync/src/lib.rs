//! # SVS Sync
//!
//! State vector sync sessions on top of a [`Store`](svs_store::Store).
//!
//! ## Overview
//!
//! Every node periodically broadcasts its state vector. A node receiving a
//! vector fetches whatever entries it is missing and, if the sender is
//! behind, answers with its own vector. There is no pairwise handshake;
//! the group converges as vectors spread.
//!
//! ## Key Properties
//!
//! - **Idempotent**: Re-handling the same vector fetches nothing new
//! - **Order-insensitive**: Vectors only ever move upward, so arrival order
//!   does not change the final state
//! - **Tolerant**: Malformed vectors are dropped without ending the round
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svs_core::WriterId;
//! use svs_store::MemoryStore;
//! use svs_sync::{MemoryNetwork, SyncConfig, SyncSession};
//!
//! async fn example() {
//!     let network = MemoryNetwork::new();
//!     let store = Arc::new(MemoryStore::new());
//!     network.register_store(Arc::clone(&store)).await;
//!
//!     let transport = network.create_transport(WriterId::from("/ndn/alice")).await;
//!     let mut session =
//!         SyncSession::new(store, transport, network.fetcher(), SyncConfig::default());
//!
//!     session.publish(b"hello").await.unwrap();
//!     let report = session.sync_once().await.unwrap();
//!     println!("fetched {} entries", report.fetched_count());
//! }
//! ```
//!
//! ## Message Flow
//!
//! ```text
//! Node A                              Node B
//!   |-------- Interest(SV_a) -------->|   B compares SV_a with SV_b
//!   |<------- fetch(A, seq) ----------|   for each missing seq
//!   |-------- entry ----------------->|
//!   |<------- Interest(SV_b) ---------|   only if A was outdated
//! ```

pub mod convergence;
pub mod error;
pub mod messages;
pub mod protocol;
pub mod transport;

pub use convergence::{vector_convergence, verify_convergence, ConvergenceResult};
pub use error::{Result, SyncError};
pub use messages::{limits, SyncInterest};
pub use protocol::{FetchedEntry, SyncConfig, SyncReport, SyncSession};
pub use transport::{
    memory::MemoryFetcher, memory::MemoryNetwork, memory::MemoryTransport, Fetcher, Transport,
};
