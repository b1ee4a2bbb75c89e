//! # SVS Store
//!
//! Storage abstraction for the per-writer logs that back state vector sync.
//! Provides a trait-based interface with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of inserting an entry
//!
//! ## Usage
//!
//! ```rust,no_run
//! use svs_core::WriterId;
//! use svs_store::{SqliteStore, Store, StoreExt};
//!
//! async fn example() {
//!     let store = SqliteStore::open("svs.db").unwrap();
//!     let me = WriterId::from("/ndn/alice");
//!
//!     store.insert_entry(&me, 1, b"hello").await.unwrap();
//!
//!     // Seed a sync session's state vector from what is on disk
//!     let vector = store.load_state_vector().await.unwrap();
//!     assert_eq!(vector.get(&me), 1);
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store, StoreExt};
