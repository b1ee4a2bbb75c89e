//! SQLite implementation of the Store trait.
//!
//! This is the persistent storage backend. It uses rusqlite with bundled
//! SQLite, wrapped in async via tokio::spawn_blocking.
//!
//! Sequence numbers are stored as 8-byte big-endian blobs so that SQLite's
//! blob ordering matches `u64` ordering across the whole range.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};
use svs_core::WriterId;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Task(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn seq_key(seq: u64) -> [u8; 8] {
    seq.to_be_bytes()
}

fn seq_from_key(key: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = key
        .try_into()
        .map_err(|_| StoreError::InvalidData(format!("seq column is {} bytes", key.len())))?;
    Ok(u64::from_be_bytes(arr))
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_entry(
        &self,
        writer: &WriterId,
        seq: u64,
        payload: &[u8],
    ) -> Result<InsertResult> {
        let writer = writer.clone();
        let payload = payload.to_vec();

        self.blocking(move |conn| {
            let key = seq_key(seq);

            let existing: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT payload FROM entries WHERE writer = ?1 AND seq = ?2",
                    params![writer.as_bytes(), key.as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing) = existing {
                if existing == payload {
                    return Ok(InsertResult::AlreadyExists);
                }
                return Ok(InsertResult::Conflict {
                    existing: Bytes::from(existing),
                });
            }

            conn.execute(
                "INSERT INTO entries (writer, seq, payload, stored_at) VALUES (?1, ?2, ?3, ?4)",
                params![writer.as_bytes(), key.as_slice(), payload.as_slice(), now_millis()],
            )?;

            Ok(InsertResult::Inserted)
        })
        .await
    }

    async fn get_entry(&self, writer: &WriterId, seq: u64) -> Result<Option<Bytes>> {
        let writer = writer.clone();

        self.blocking(move |conn| {
            let payload: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT payload FROM entries WHERE writer = ?1 AND seq = ?2",
                    params![writer.as_bytes(), seq_key(seq).as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(payload.map(Bytes::from))
        })
        .await
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
        let writer = writer.clone();

        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT seq, payload FROM entries
                 WHERE writer = ?1 AND seq >= ?2 AND seq <= ?3
                 ORDER BY seq",
            )?;

            let rows = stmt
                .query_map(
                    params![
                        writer.as_bytes(),
                        seq_key(start).as_slice(),
                        seq_key(end).as_slice()
                    ],
                    |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?)),
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(key, payload)| -> Result<(u64, Bytes)> {
                    Ok((seq_from_key(&key)?, Bytes::from(payload)))
                })
                .collect()
        })
        .await
    }

    async fn latest_seq(&self, writer: &WriterId) -> Result<u64> {
        let writer = writer.clone();

        self.blocking(move |conn| {
            let key: Option<Vec<u8>> = conn.query_row(
                "SELECT MAX(seq) FROM entries WHERE writer = ?1",
                params![writer.as_bytes()],
                |row| row.get(0),
            )?;
            key.map_or(Ok(0), |k| seq_from_key(&k))
        })
        .await
    }

    async fn latest_seqs(&self) -> Result<Vec<(WriterId, u64)>> {
        self.blocking(|conn| {
            let mut stmt = conn.prepare(
                "SELECT writer, MAX(seq) FROM entries GROUP BY writer ORDER BY writer",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(writer, key)| -> Result<(WriterId, u64)> {
                    Ok((WriterId::from(writer), seq_from_key(&key)?))
                })
                .collect()
        })
        .await
    }
}

fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use proptest::prelude::*;

    fn alice() -> WriterId {
        WriterId::from("/ndn/alice")
    }

    #[tokio::test]
    async fn test_insert_and_get_entry() {
        let store = SqliteStore::open_memory().unwrap();

        let result = store.insert_entry(&alice(), 1, b"hello").await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let payload = store.get_entry(&alice(), 1).await.unwrap().unwrap();
        assert_eq!(&payload[..], b"hello");
        assert!(store.get_entry(&alice(), 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_and_conflict() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_entry(&alice(), 1, b"hello").await.unwrap();

        let dup = store.insert_entry(&alice(), 1, b"hello").await.unwrap();
        assert_eq!(dup, InsertResult::AlreadyExists);

        let conflict = store.insert_entry(&alice(), 1, b"other").await.unwrap();
        assert_eq!(
            conflict,
            InsertResult::Conflict {
                existing: Bytes::from_static(b"hello")
            }
        );
    }

    #[tokio::test]
    async fn test_large_seq_ordering() {
        let store = SqliteStore::open_memory().unwrap();
        // Above i64::MAX: must still sort after small seqs
        let big = u64::MAX - 1;
        store.insert_entry(&alice(), 5, b"small").await.unwrap();
        store.insert_entry(&alice(), big, b"big").await.unwrap();

        assert_eq!(store.latest_seq(&alice()).await.unwrap(), big);

        let range = store.get_entries_range(&alice(), 1, u64::MAX).await.unwrap();
        let seqs: Vec<u64> = range.iter().map(|(seq, _)| *seq).collect();
        assert_eq!(seqs, vec![5, big]);
    }

    #[tokio::test]
    async fn test_latest_seqs_and_state_vector() {
        let store = SqliteStore::open_memory().unwrap();
        let bob = WriterId::from("/ndn/bob");

        store.insert_entry(&alice(), 1, b"a1").await.unwrap();
        store.insert_entry(&alice(), 2, b"a2").await.unwrap();
        store.insert_entry(&bob, 7, b"b7").await.unwrap();

        let latest = store.latest_seqs().await.unwrap();
        assert_eq!(latest, vec![(alice(), 2), (bob.clone(), 7)]);

        let sv = store.load_state_vector().await.unwrap();
        assert_eq!(sv.get(&alice()), 2);
        assert_eq!(sv.get(&bob), 7);
        assert_eq!(store.latest_seq(&WriterId::from("x")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_entry(&alice(), 3, b"kept").await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let payload = store.get_entry(&alice(), 3).await.unwrap().unwrap();
        assert_eq!(&payload[..], b"kept");
    }

    proptest! {
        #[test]
        fn seq_key_preserves_order(a in any::<u64>(), b in any::<u64>()) {
            prop_assert_eq!(seq_key(a).cmp(&seq_key(b)), a.cmp(&b));
            prop_assert_eq!(seq_from_key(&seq_key(a)).unwrap(), a);
        }
    }
}
