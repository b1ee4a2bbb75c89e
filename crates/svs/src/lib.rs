//! # SVS
//!
//! State Vector Sync: every writer in a group appends to its own log, and
//! nodes converge on the union of all logs by exchanging compact state
//! vectors.
//!
//! ## Key Concepts
//!
//! - **Writer**: Owns one append-only log. Sequence numbers start at 1.
//! - **State vector**: The highest seq a node knows for each writer.
//! - **Interest**: A broadcast carrying a node's encoded state vector.
//! - **Missing range**: Seqs another node knows about that we have not seen.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use svs::{Node, NodeConfig};
//! use svs::core::WriterId;
//! use svs::store::SqliteStore;
//! use svs::sync::MemoryNetwork;
//!
//! async fn example() {
//!     let network = MemoryNetwork::new();
//!     let store = Arc::new(SqliteStore::open("svs.db").unwrap());
//!     network.register_store(Arc::clone(&store)).await;
//!
//!     let transport = network.create_transport(WriterId::from("/ndn/alice")).await;
//!     let mut node = Node::new(store, transport, network.fetcher(), NodeConfig::default())
//!         .await
//!         .unwrap();
//!
//!     let seq = node.publish(b"hello").await.unwrap();
//!     assert_eq!(seq, 1);
//!
//!     let report = node.sync_round().await.unwrap();
//!     println!("fetched {} entries", report.fetched_count());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `svs::core` - TLV codec, WriterId, StateVector, diff
//! - `svs::store` - Storage abstraction and SQLite
//! - `svs::sync` - Sync sessions and transports

pub mod error;
pub mod node;

// Re-export component crates
pub use svs_core as core;
pub use svs_store as store;
pub use svs_sync as sync;

// Re-export main types for convenience
pub use error::{Result, SvsError};
pub use node::{Node, NodeConfig};

// Re-export commonly used types
pub use svs_core::{compare, missing_ranges, MissingRange, StateVector, WriterId};
pub use svs_sync::{SyncConfig, SyncReport};
