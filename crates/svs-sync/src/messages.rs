//! Sync protocol message types.
//!
//! Nodes advertise what they know by broadcasting their encoded state
//! vector. The vector travels as an opaque byte component; only the core
//! codec looks inside it.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use svs_core::{CodecError, StateVector, WriterId};

/// Message size limits.
pub mod limits {
    /// Max encoded state vector carried in one interest (NDN packet limit).
    pub const MAX_VECTOR_BYTES: usize = 8800;
}

/// A state vector advertisement from one node to the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncInterest {
    /// The node that sent this advertisement.
    pub sender: WriterId,
    /// Encoded [`StateVector`].
    pub vector: Bytes,
}

impl SyncInterest {
    /// Build an interest advertising `vector`.
    pub fn new(sender: WriterId, vector: &StateVector) -> Self {
        Self {
            sender,
            vector: Bytes::from(vector.encode()),
        }
    }

    /// Decode the carried state vector.
    pub fn state_vector(&self) -> Result<StateVector, CodecError> {
        StateVector::parse(&self.vector)
    }

    /// Check if this message respects size limits.
    pub fn validate_limits(&self) -> Result<(), &'static str> {
        if self.vector.len() > limits::MAX_VECTOR_BYTES {
            return Err("state vector too large");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interest_carries_vector() {
        let mut sv = StateVector::new();
        sv.set("/ndn/alice", 4);

        let interest = SyncInterest::new(WriterId::from("/ndn/alice"), &sv);
        assert_eq!(interest.state_vector().unwrap(), sv);
        assert!(interest.validate_limits().is_ok());
    }

    #[test]
    fn test_interest_malformed_vector() {
        let interest = SyncInterest {
            sender: WriterId::from("x"),
            vector: Bytes::from_static(&[0xC9, 0x05]),
        };
        assert!(interest.state_vector().is_err());
    }

    #[test]
    fn test_interest_limits_exceeded() {
        let interest = SyncInterest {
            sender: WriterId::from("x"),
            vector: Bytes::from(vec![0u8; limits::MAX_VECTOR_BYTES + 1]),
        };
        assert!(interest.validate_limits().is_err());
    }

    proptest! {
        #[test]
        fn test_interest_vector_survives_transit(
            pairs in prop::collection::vec(("[a-z/]{1,8}", any::<u64>()), 0..12)
        ) {
            let sv: StateVector = pairs.into_iter().collect();
            let interest = SyncInterest::new(WriterId::from("/me"), &sv);
            prop_assert_eq!(interest.state_vector().unwrap(), sv);
        }
    }
}
