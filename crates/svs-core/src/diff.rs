//! Comparing two state vectors.
//!
//! A sync round hinges on one question: which entries does the remote know
//! about that we do not? [`missing_ranges`] answers it as a list of inclusive
//! per-writer sequence ranges, in the remote vector's order.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::state_vector::StateVector;
use crate::types::WriterId;

/// A contiguous span of entries to fetch for one writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRange {
    /// The writer whose log has the entries.
    pub writer: WriterId,
    /// First missing seq.
    pub low: u64,
    /// Last missing seq (inclusive).
    pub high: u64,
}

impl MissingRange {
    /// Create a new range.
    pub fn new(writer: WriterId, low: u64, high: u64) -> Self {
        Self { writer, low, high }
    }

    /// Sequence numbers to fetch, ascending.
    pub fn seqs(&self) -> RangeInclusive<u64> {
        self.low..=self.high
    }

    /// How many entries the range covers, saturating at `u64::MAX`.
    pub fn count(&self) -> u64 {
        if self.high >= self.low {
            (self.high - self.low).saturating_add(1)
        } else {
            0
        }
    }
}

/// Ranges the local side is missing relative to `remote`.
///
/// For each writer in `remote` (first occurrence, in container order) with
/// `remote.get(w) > local.get(w)`, emits `local.get(w) + 1 ..= remote.get(w)`.
/// Writers only known locally, or where the remote is not ahead, produce
/// nothing.
pub fn missing_ranges(local: &StateVector, remote: &StateVector) -> Vec<MissingRange> {
    let mut missing: Vec<MissingRange> = Vec::new();

    for (index, entry) in remote.iter().enumerate() {
        // A received vector may repeat a writer; get() sees the first one.
        if remote.entries()[..index].iter().any(|e| e.writer == entry.writer) {
            continue;
        }

        let theirs = remote.get(&entry.writer);
        let ours = local.get(&entry.writer);
        if theirs > ours {
            missing.push(MissingRange::new(entry.writer.clone(), ours + 1, theirs));
        }
    }

    missing
}

/// Outcome of comparing a local vector against a received one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VectorComparison {
    /// Entries the remote knows about and we do not.
    pub missing: Vec<MissingRange>,
    /// The remote is behind us for at least one writer.
    pub remote_outdated: bool,
}

impl VectorComparison {
    /// Neither side has anything the other lacks.
    pub fn is_in_sync(&self) -> bool {
        self.missing.is_empty() && !self.remote_outdated
    }

    /// Total number of entries to fetch, saturating at `u64::MAX`.
    pub fn missing_count(&self) -> u64 {
        self.missing
            .iter()
            .map(MissingRange::count)
            .fold(0, u64::saturating_add)
    }
}

/// Compare in both directions.
pub fn compare(local: &StateVector, remote: &StateVector) -> VectorComparison {
    let remote_outdated = local
        .iter()
        .any(|entry| entry.seq > remote.get(&entry.writer));

    VectorComparison {
        missing: missing_ranges(local, remote),
        remote_outdated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn w(name: &str) -> WriterId {
        WriterId::from(name)
    }

    #[test]
    fn test_missing_ranges() {
        let local: StateVector = [("A", 2u64), ("B", 5)].into_iter().collect();
        let remote: StateVector = [("A", 4u64), ("B", 5), ("C", 1)].into_iter().collect();

        assert_eq!(
            missing_ranges(&local, &remote),
            vec![
                MissingRange::new(w("A"), 3, 4),
                MissingRange::new(w("C"), 1, 1),
            ]
        );
    }

    #[test]
    fn test_local_only_and_behind_writers_ignored() {
        let local: StateVector = [("A", 9u64), ("Z", 3)].into_iter().collect();
        let remote: StateVector = [("A", 4u64)].into_iter().collect();

        assert!(missing_ranges(&local, &remote).is_empty());
    }

    #[test]
    fn test_order_follows_remote() {
        let local = StateVector::new();
        let remote: StateVector = [("c", 1u64), ("a", 2), ("B", 3)].into_iter().collect();

        let writers: Vec<_> = missing_ranges(&local, &remote)
            .into_iter()
            .map(|r| r.writer)
            .collect();
        assert_eq!(writers, remote.keys());
    }

    #[test]
    fn test_remote_explicit_zero() {
        let local = StateVector::new();
        let remote: StateVector = [("a", 0u64)].into_iter().collect();

        assert!(missing_ranges(&local, &remote).is_empty());
    }

    #[test]
    fn test_case_variants_compared_exactly() {
        let local: StateVector = [("alice", 3u64)].into_iter().collect();
        let remote: StateVector = [("Alice", 3u64)].into_iter().collect();

        assert_eq!(
            missing_ranges(&local, &remote),
            vec![MissingRange::new(w("Alice"), 1, 3)]
        );
    }

    #[test]
    fn test_duplicate_remote_writer_uses_first() {
        // a:2 then a:9, as a lenient peer might send it
        let bytes = vec![
            0xC9, 0x0C, 0xCA, 0x01, b'a', 0xCB, 0x01, 0x02, 0xCA, 0x01, b'a', 0xCB, 0x01, 0x09,
        ];
        let remote = StateVector::parse(&bytes).unwrap();

        assert_eq!(
            missing_ranges(&StateVector::new(), &remote),
            vec![MissingRange::new(w("a"), 1, 2)]
        );
    }

    #[test]
    fn test_range_seqs() {
        let range = MissingRange::new(w("a"), 3, 6);
        assert_eq!(range.seqs().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(range.count(), 4);
    }

    #[test]
    fn test_compare() {
        let local: StateVector = [("A", 2u64), ("B", 7)].into_iter().collect();
        let remote: StateVector = [("A", 4u64), ("B", 5)].into_iter().collect();

        let cmp = compare(&local, &remote);
        assert_eq!(cmp.missing, vec![MissingRange::new(w("A"), 3, 4)]);
        assert!(cmp.remote_outdated);
        assert_eq!(cmp.missing_count(), 2);
        assert!(!cmp.is_in_sync());

        assert!(compare(&local, &local).is_in_sync());
    }

    #[test]
    fn test_counts_saturate() {
        assert_eq!(MissingRange::new(w("a"), 0, u64::MAX).count(), u64::MAX);
        assert_eq!(MissingRange::new(w("a"), 5, 4).count(), 0);

        let remote: StateVector = [("a", u64::MAX), ("b", u64::MAX)].into_iter().collect();
        let cmp = compare(&StateVector::new(), &remote);
        assert_eq!(cmp.missing.len(), 2);
        assert_eq!(cmp.missing_count(), u64::MAX);
    }

    #[test]
    fn test_range_json_roundtrip() {
        let range = MissingRange::new(WriterId::from("/ndn/alice"), 3, u64::MAX);
        let json = serde_json::to_string(&range).unwrap();
        let back: MissingRange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range);

        let writer: WriterId = serde_json::from_str(&serde_json::to_string(&range.writer).unwrap()).unwrap();
        assert_eq!(writer.as_bytes(), b"/ndn/alice");
    }

    #[test]
    fn test_compare_remote_missing_writer() {
        let local: StateVector = [("A", 1u64)].into_iter().collect();
        let cmp = compare(&local, &StateVector::new());
        assert!(cmp.remote_outdated);
        assert!(cmp.missing.is_empty());
    }

    fn vector() -> impl Strategy<Value = StateVector> {
        prop::collection::vec(("[a-dA-D]{1,2}", 0u64..20), 0..10)
            .prop_map(|ops| ops.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_merge_after_fetch_closes_gap(local in vector(), remote in vector()) {
            let ranges = missing_ranges(&local, &remote);

            let mut caught_up = local.clone();
            for range in &ranges {
                prop_assert!(range.low >= 1);
                prop_assert!(range.low <= range.high);
                prop_assert_eq!(range.low, local.get(&range.writer) + 1);
                caught_up.set(range.writer.clone(), range.high);
            }

            prop_assert!(missing_ranges(&caught_up, &remote).is_empty());
        }

        #[test]
        fn prop_self_diff_is_empty(v in vector()) {
            prop_assert!(compare(&v, &v).is_in_sync());
        }
    }
}
