//! # SVS Core
//!
//! Pure primitives for State Vector Sync: the TLV codec, state vectors, and
//! the comparison that turns two vectors into missing-entry ranges.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`WriterId`] - Opaque name of a writer in a sync group
//! - [`StateVector`] - Per-writer high-water sequence numbers
//! - [`MissingRange`] - Entries one side should fetch for a writer
//!
//! ## Usage
//!
//! ```rust
//! use svs_core::{missing_ranges, StateVector, WriterId};
//!
//! let mut local = StateVector::new();
//! local.set("alice", 2);
//!
//! let mut remote = StateVector::new();
//! remote.set("alice", 4);
//! remote.set("bob", 1);
//!
//! let bytes = remote.encode();
//! let received = StateVector::parse(&bytes).unwrap();
//!
//! let ranges = missing_ranges(&local, &received);
//! assert_eq!(ranges.len(), 2);
//! assert_eq!(ranges[0].writer, WriterId::from("alice"));
//! assert_eq!((ranges[0].low, ranges[0].high), (3, 4));
//! ```

pub mod diff;
pub mod error;
pub mod state_vector;
pub mod tlv;
pub mod types;

pub use diff::{compare, missing_ranges, MissingRange, VectorComparison};
pub use error::{CodecError, Result};
pub use state_vector::{tags, StateVector, StateVectorEntry};
pub use types::WriterId;
