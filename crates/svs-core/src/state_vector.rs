//! State vectors: per-writer high-water sequence numbers.
//!
//! Wire format:
//!
//! ```text
//! StateVector = VECTOR-TYPE TLV-LENGTH *Entry
//! Entry       = KEY-TYPE TLV-LENGTH writer-bytes
//!               VALUE-TYPE TLV-LENGTH nonNegativeInteger
//! ```
//!
//! Entries are kept sorted by writer id under ASCII case-insensitive byte
//! comparison, so two vectors holding the same entries encode to the same
//! bytes.
//!
//! Note the asymmetry: placement of a new writer ignores ASCII case, while
//! [`StateVector::get`], [`StateVector::has`] and the update branch of
//! [`StateVector::set`] match writer ids exactly. `"alice"` and `"Alice"` are
//! two distinct writers that sort next to each other in insertion order.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{CodecError, Result};
use crate::tlv::{self, Reader};
use crate::types::WriterId;

/// TLV type numbers for state vector fields.
pub mod tags {
    /// The outer container.
    pub const VECTOR: u64 = 201;
    /// A writer id inside an entry.
    pub const KEY: u64 = 202;
    /// A sequence number inside an entry.
    pub const VALUE: u64 = 203;
}

/// One `(writer, seq)` pair of a state vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateVectorEntry {
    /// The writer this entry describes.
    pub writer: WriterId,
    /// Highest sequence number known for `writer`.
    pub seq: u64,
}

impl StateVectorEntry {
    /// Create a new entry.
    pub fn new(writer: WriterId, seq: u64) -> Self {
        Self { writer, seq }
    }

    /// Size of this entry on the wire.
    pub fn encoded_len(&self) -> usize {
        tlv::tlv_size(tags::KEY, self.writer.len())
            + tlv::tlv_size(tags::VALUE, tlv::nonneg_int_size(self.seq))
    }

    /// Append the KEY and VALUE fields to `buf`.
    pub fn encode_to(&self, buf: &mut Vec<u8>) {
        tlv::encode_tlv(buf, tags::KEY, self.writer.as_bytes());
        tlv::encode_tl_num(buf, tags::VALUE);
        tlv::encode_tl_num(buf, tlv::nonneg_int_size(self.seq) as u64);
        tlv::encode_nonneg_int(buf, self.seq);
    }

    /// Read one entry from `reader`.
    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self> {
        reader.expect_type(tags::KEY)?;
        let key_len = reader.read_length()?;
        let writer = WriterId::from(reader.read_bytes(key_len)?);

        reader.expect_type(tags::VALUE)?;
        let value_len = reader.read_tl_num()?;
        if !matches!(value_len, 1 | 2 | 4 | 8) {
            return Err(CodecError::UnsupportedSeqWidth(value_len as usize));
        }
        let seq = tlv::decode_nonneg_int(reader.read_bytes(value_len as usize)?)?;

        Ok(Self { writer, seq })
    }
}

/// A per-writer map from writer id to the highest known sequence number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateVector {
    entries: Vec<StateVectorEntry>,
}

impl StateVector {
    /// Create an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update the entry for `writer`.
    ///
    /// A new writer is placed before the first entry that compares strictly
    /// greater ignoring ASCII case. An existing writer (exact match) is
    /// updated in place.
    pub fn set(&mut self, writer: impl Into<WriterId>, seq: u64) {
        let writer = writer.into();

        if let Some(entry) = self.entries.iter_mut().find(|e| e.writer == writer) {
            entry.seq = seq;
            return;
        }

        let index = self
            .entries
            .iter()
            .position(|e| e.writer.cmp_ignore_ascii_case(&writer) == Ordering::Greater)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, StateVectorEntry::new(writer, seq));
    }

    /// Sequence number for `writer`, or 0 if unknown.
    ///
    /// 0 is also returned for a writer explicitly set to 0.
    pub fn get(&self, writer: &WriterId) -> u64 {
        self.entries
            .iter()
            .find(|e| &e.writer == writer)
            .map_or(0, |e| e.seq)
    }

    /// Whether `writer` has an entry.
    pub fn has(&self, writer: &WriterId) -> bool {
        self.entries.iter().any(|e| &e.writer == writer)
    }

    /// All writer ids in container order.
    pub fn keys(&self) -> Vec<WriterId> {
        self.entries.iter().map(|e| e.writer.clone()).collect()
    }

    /// Number of writers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector has no writers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in container order.
    pub fn iter(&self) -> std::slice::Iter<'_, StateVectorEntry> {
        self.entries.iter()
    }

    /// Entries in container order.
    pub fn entries(&self) -> &[StateVectorEntry] {
        &self.entries
    }

    /// Raise every entry to at least the value `other` holds.
    ///
    /// Writers unknown locally are added. Returns true if anything changed.
    pub fn merge(&mut self, other: &StateVector) -> bool {
        let mut changed = false;
        for entry in other.iter() {
            if !self.has(&entry.writer) || entry.seq > self.get(&entry.writer) {
                self.set(entry.writer.clone(), entry.seq);
                changed = true;
            }
        }
        changed
    }

    /// Encode to wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        let inner_len: usize = self.entries.iter().map(StateVectorEntry::encoded_len).sum();

        let mut buf = Vec::with_capacity(tlv::tlv_size(tags::VECTOR, inner_len));
        tlv::encode_tl_num(&mut buf, tags::VECTOR);
        tlv::encode_tl_num(&mut buf, inner_len as u64);
        for entry in &self.entries {
            entry.encode_to(&mut buf);
        }
        buf
    }

    /// Decode from wire bytes.
    ///
    /// The outer length must account for exactly the rest of `buf`. Entries
    /// keep their wire order. Any malformed entry fails the whole vector.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(buf);
        reader.expect_type(tags::VECTOR)?;

        let declared = reader.read_tl_num()?;
        let available = reader.remaining() as u64;
        if declared != available {
            return Err(CodecError::LengthMismatch { declared, available });
        }

        let mut entries = Vec::new();
        while !reader.is_empty() {
            entries.push(StateVectorEntry::decode_from(&mut reader)?);
        }

        Ok(Self { entries })
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in &self.entries {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{}:{}", entry.writer, entry.seq)?;
        }
        Ok(())
    }
}

impl<W: Into<WriterId>> FromIterator<(W, u64)> for StateVector {
    fn from_iter<I: IntoIterator<Item = (W, u64)>>(iter: I) -> Self {
        let mut vector = StateVector::new();
        for (writer, seq) in iter {
            vector.set(writer, seq);
        }
        vector
    }
}

impl<'a> IntoIterator for &'a StateVector {
    type Item = &'a StateVectorEntry;
    type IntoIter = std::slice::Iter<'a, StateVectorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
