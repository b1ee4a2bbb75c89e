//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use svs_core::WriterId;

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    /// Per-writer logs, keyed by seq.
    logs: RwLock<HashMap<WriterId, BTreeMap<u64, Bytes>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of stored entries across all writers.
    pub fn len(&self) -> usize {
        self.logs
            .read()
            .map(|logs| logs.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Task(format!("lock poisoned: {}", e))
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_entry(
        &self,
        writer: &WriterId,
        seq: u64,
        payload: &[u8],
    ) -> Result<InsertResult> {
        let mut logs = self.logs.write().map_err(poisoned)?;
        let log = logs.entry(writer.clone()).or_default();

        if let Some(existing) = log.get(&seq) {
            if &existing[..] == payload {
                return Ok(InsertResult::AlreadyExists);
            }
            return Ok(InsertResult::Conflict {
                existing: existing.clone(),
            });
        }

        log.insert(seq, Bytes::copy_from_slice(payload));
        Ok(InsertResult::Inserted)
    }

    async fn get_entry(&self, writer: &WriterId, seq: u64) -> Result<Option<Bytes>> {
        let logs = self.logs.read().map_err(poisoned)?;
        Ok(logs.get(writer).and_then(|log| log.get(&seq)).cloned())
    }

    async fn get_entries_range(
        &self,
        writer: &WriterId,
        start: u64,
        end: u64,
    ) -> Result<Vec<(u64, Bytes)>> {
        if start > end {
            return Ok(Vec::new());
        }
        let logs = self.logs.read().map_err(poisoned)?;
        Ok(logs
            .get(writer)
            .map(|log| {
                log.range(start..=end)
                    .map(|(seq, payload)| (*seq, payload.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn latest_seq(&self, writer: &WriterId) -> Result<u64> {
        let logs = self.logs.read().map_err(poisoned)?;
        Ok(logs
            .get(writer)
            .and_then(|log| log.keys().next_back().copied())
            .unwrap_or(0))
    }

    async fn latest_seqs(&self) -> Result<Vec<(WriterId, u64)>> {
        let logs = self.logs.read().map_err(poisoned)?;
        let mut latest: Vec<(WriterId, u64)> = logs
            .iter()
            .filter_map(|(writer, log)| {
                log.keys().next_back().map(|seq| (writer.clone(), *seq))
            })
            .collect();
        latest.sort();
        Ok(latest)
    }
}
