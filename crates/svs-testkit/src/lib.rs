//! # SVS Testkit
//!
//! Testing utilities for State Vector Sync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Local/remote vector pairs with their wire bytes and
//!   expected comparison
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Multi-node in-memory networks
//!
//! ## Golden Vectors
//!
//! ```rust
//! use svs_testkit::vectors::{all_vectors, verify_vector};
//!
//! for vector in all_vectors() {
//!     verify_vector(&vector).unwrap();
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use svs_core::StateVector;
//! use svs_testkit::generators::state_vector;
//!
//! proptest! {
//!     #[test]
//!     fn parse_accepts_encode(sv in state_vector(16)) {
//!         prop_assert!(StateVector::parse(&sv.encode()).is_ok());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use svs_testkit::fixtures::TestNetwork;
//!
//! async fn example() {
//!     let mut net = TestNetwork::new(3).await.unwrap();
//!     net.publish(0, b"hello").await.unwrap();
//!     net.sync_all(2).await.unwrap();
//!     assert!(net.vectors_converged());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{fast_config, random_payload, writer_name, TestNetwork, TestNode};
pub use generators::{vector_from_ops, SetOp};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
