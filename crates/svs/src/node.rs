//! The Node: unified API for one participant in a sync group.
//!
//! A node owns a writer's log, keeps a state vector of what the group has
//! published, and pulls in other writers' entries as their vectors arrive.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use svs_core::{StateVector, WriterId};
use svs_store::Store;
use svs_sync::{Fetcher, SyncConfig, SyncReport, SyncSession, Transport};

use crate::error::{Result, SvsError};

/// Configuration for a Node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Sync configuration.
    pub sync: SyncConfig,
    /// Seed the state vector from the store when the node starts.
    pub restore_from_store: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            restore_from_store: true,
        }
    }
}

/// The main Node struct.
///
/// Provides a unified API for:
/// - Publishing entries to our own log
/// - Running sync rounds against the group
/// - Reading any writer's entries from the local store
pub struct Node<S: Store, T: Transport, F: Fetcher> {
    session: SyncSession<S, T, F>,
    config: NodeConfig,
}

impl<S: Store, T: Transport, F: Fetcher> Node<S, T, F> {
    /// Create a node, restoring its state vector from `store` if configured.
    pub async fn new(store: Arc<S>, transport: T, fetcher: F, config: NodeConfig) -> Result<Self> {
        let mut session = SyncSession::new(store, transport, fetcher, config.sync.clone());
        if config.restore_from_store {
            session.restore().await?;
        }
        debug!(writer = %session.writer(), "node started");
        Ok(Self { session, config })
    }

    /// Our writer id.
    pub fn writer(&self) -> &WriterId {
        self.session.writer()
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        self.session.store()
    }

    /// The node's configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The current state vector.
    pub fn state_vector(&self) -> &StateVector {
        self.session.state_vector()
    }

    /// Append `payload` to our log and announce it. Returns its seq.
    pub async fn publish(&mut self, payload: &[u8]) -> Result<u64> {
        if payload.is_empty() {
            return Err(SvsError::InvalidOperation("empty payload".into()));
        }
        Ok(self.session.publish(payload).await?)
    }

    /// Run one sync round.
    pub async fn sync_round(&mut self) -> Result<SyncReport> {
        Ok(self.session.sync_once().await?)
    }

    /// Run `rounds` sync rounds back to back and merge their reports.
    pub async fn sync_rounds(&mut self, rounds: usize) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        for _ in 0..rounds {
            report.absorb(self.sync_round().await?);
        }
        Ok(report)
    }

    /// Delay before the next periodic round.
    pub fn next_sync_delay(&self) -> Duration {
        self.session.next_sync_delay()
    }

    /// Read the entry at `(writer, seq)` from the local store.
    pub async fn entry(&self, writer: &WriterId, seq: u64) -> Result<Option<Bytes>> {
        Ok(self.store().get_entry(writer, seq).await?)
    }

    /// Every locally stored entry of `writer`, in seq order.
    pub async fn entries(&self, writer: &WriterId) -> Result<Vec<(u64, Bytes)>> {
        let high = self.state_vector().get(writer);
        if high == 0 {
            return Ok(Vec::new());
        }
        Ok(self.store().get_entries_range(writer, 1, high).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svs_store::MemoryStore;
    use svs_sync::{MemoryFetcher, MemoryNetwork, MemoryTransport};

    type TestNode = Node<MemoryStore, MemoryTransport, MemoryFetcher>;

    async fn node(network: &Arc<MemoryNetwork>, name: &str, store: Arc<MemoryStore>) -> TestNode {
        network.register_store(Arc::clone(&store)).await;
        let transport = network.create_transport(WriterId::from(name)).await;
        let config = NodeConfig {
            sync: SyncConfig {
                message_timeout: Duration::from_millis(20),
                ..SyncConfig::default()
            },
            ..NodeConfig::default()
        };
        Node::new(store, transport, network.fetcher(), config)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_publish_and_read_back() {
        let network = MemoryNetwork::new();
        let mut alice = node(&network, "/alice", Arc::new(MemoryStore::new())).await;

        alice.publish(b"first").await.unwrap();
        alice.publish(b"second").await.unwrap();

        let me = alice.writer().clone();
        let got = alice.entry(&me, 2).await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"second"[..]));

        let all = alice.entries(&me).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let network = MemoryNetwork::new();
        let mut alice = node(&network, "/alice", Arc::new(MemoryStore::new())).await;
        assert!(matches!(
            alice.publish(b"").await,
            Err(SvsError::InvalidOperation(_))
        ));
    }

    #[tokio::test]
    async fn test_restart_restores_vector() {
        let network = MemoryNetwork::new();
        let store = Arc::new(MemoryStore::new());
        store
            .insert_entry(&WriterId::from("/alice"), 1, b"before restart")
            .await
            .unwrap();

        let mut alice = node(&network, "/alice", store).await;
        assert_eq!(alice.state_vector().get(&WriterId::from("/alice")), 1);
        assert_eq!(alice.publish(b"after").await.unwrap(), 2);
    }
}
