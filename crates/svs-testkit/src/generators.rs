//! Proptest generators for property-based testing.

use proptest::prelude::*;

use svs_core::{StateVector, WriterId};

/// Generate a writer id in NDN name style.
pub fn writer_id() -> impl Strategy<Value = WriterId> {
    "(/[a-zA-Z0-9]{1,6}){1,3}".prop_map(WriterId::from)
}

/// Generate a writer id from a deliberately tiny alphabet, so that exact
/// duplicates and case-only variants are common.
pub fn colliding_writer_id() -> impl Strategy<Value = WriterId> {
    "[aAbB]{1,2}".prop_map(WriterId::from)
}

/// Generate a sequence number, biased toward encoding width boundaries.
pub fn seq() -> impl Strategy<Value = u64> {
    prop_oneof![
        0u64..=300,
        Just(0xFFFF),
        Just(0x1_0000),
        Just(0xFFFF_FFFF),
        Just(0x1_0000_0000),
        Just(u64::MAX),
        any::<u64>(),
    ]
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len.max(1))
}

/// One `set` call against a state vector.
#[derive(Debug, Clone)]
pub struct SetOp {
    pub writer: WriterId,
    pub seq: u64,
}

impl Arbitrary for SetOp {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (prop_oneof![writer_id(), colliding_writer_id()], seq())
            .prop_map(|(writer, seq)| SetOp { writer, seq })
            .boxed()
    }
}

/// Apply `ops` in order to an empty vector.
pub fn vector_from_ops(ops: &[SetOp]) -> StateVector {
    let mut sv = StateVector::new();
    for op in ops {
        sv.set(op.writer.clone(), op.seq);
    }
    sv
}

/// Generate a state vector built through `set`, with up to `max_ops` calls.
pub fn state_vector(max_ops: usize) -> impl Strategy<Value = StateVector> {
    prop::collection::vec(any::<SetOp>(), 0..=max_ops).prop_map(|ops| vector_from_ops(&ops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;
    use svs_core::{compare, missing_ranges};

    proptest! {
        #[test]
        fn test_encoding_deterministic(ops in prop::collection::vec(any::<SetOp>(), 0..16)) {
            let a = vector_from_ops(&ops).encode();
            let b = vector_from_ops(&ops).encode();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn test_parse_encode_round_trip(sv in state_vector(16)) {
            let bytes = sv.encode();
            let parsed = StateVector::parse(&bytes).unwrap();
            prop_assert_eq!(parsed.encode(), bytes);
        }

        #[test]
        fn test_keys_never_decrease_ignoring_case(sv in state_vector(24)) {
            let keys = sv.keys();
            for pair in keys.windows(2) {
                prop_assert_ne!(pair[0].cmp_ignore_ascii_case(&pair[1]), Ordering::Greater);
            }
        }

        #[test]
        fn test_merge_closes_the_gap(a in state_vector(12), b in state_vector(12)) {
            let mut merged = a.clone();
            merged.merge(&b);
            prop_assert!(missing_ranges(&merged, &b).is_empty());
            prop_assert!(!compare(&a, &merged).remote_outdated);
        }
    }
}
