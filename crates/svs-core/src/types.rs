//! Strong type definitions for SVS.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Opaque name of a writer in a sync group.
///
/// Equality, hashing and `Ord` are exact byte comparisons. State vectors
/// additionally order writers with [`WriterId::cmp_ignore_ascii_case`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WriterId(Bytes);

impl WriterId {
    /// Create a writer id from raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Create a writer id from a static string without copying.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Bytes::from_static(name.as_bytes()))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the id in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the id is the empty byte string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Byte-lexicographic comparison with ASCII letters folded to lowercase.
    ///
    /// Only used to place new entries in a state vector; lookups stay
    /// exact-case.
    pub fn cmp_ignore_ascii_case(&self, other: &WriterId) -> Ordering {
        self.0
            .iter()
            .map(u8::to_ascii_lowercase)
            .cmp(other.0.iter().map(u8::to_ascii_lowercase))
    }
}

impl fmt::Debug for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WriterId({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl AsRef<[u8]> for WriterId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for WriterId {
    fn from(name: &str) -> Self {
        Self(Bytes::copy_from_slice(name.as_bytes()))
    }
}

impl From<String> for WriterId {
    fn from(name: String) -> Self {
        Self(Bytes::from(name))
    }
}

impl From<&[u8]> for WriterId {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl From<Vec<u8>> for WriterId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<Bytes> for WriterId {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_id_display() {
        let id = WriterId::from("/ndn/alice");
        assert_eq!(format!("{}", id), "/ndn/alice");
        assert_eq!(format!("{:?}", id), "WriterId(\"/ndn/alice\")");
    }

    #[test]
    fn test_writer_id_hex() {
        let id = WriterId::from(vec![0xab, 0x01]);
        assert_eq!(id.to_hex(), "ab01");
    }

    #[test]
    fn test_cmp_ignore_ascii_case() {
        let lower = WriterId::from("alice");
        let upper = WriterId::from("ALICE");
        let bob = WriterId::from("Bob");

        assert_eq!(lower.cmp_ignore_ascii_case(&upper), Ordering::Equal);
        assert_ne!(lower, upper);
        assert_eq!(upper.cmp_ignore_ascii_case(&bob), Ordering::Less);
        // Exact byte order puts 'B' before 'a'.
        assert!(bob < lower);
    }

    #[test]
    fn test_cmp_ignore_ascii_case_prefix() {
        let short = WriterId::from("ab");
        let long = WriterId::from("AB0");
        assert_eq!(short.cmp_ignore_ascii_case(&long), Ordering::Less);
    }

    #[test]
    fn test_from_static() {
        const ALICE: WriterId = WriterId::from_static("alice");
        assert_eq!(ALICE, WriterId::from("alice"));
    }
}
