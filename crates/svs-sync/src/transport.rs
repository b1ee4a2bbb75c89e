//! Transport abstraction for sync protocol.
//!
//! Two collaborators sit below a session: a [`Transport`] that spreads
//! state vector advertisements through the group, and a [`Fetcher`] that
//! retrieves individual entries by `(writer, seq)` from whoever holds them.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use svs_core::WriterId;

use crate::error::Result;
use crate::messages::SyncInterest;

/// Transport trait for exchanging state vector advertisements.
///
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an advertisement to every other node in the group.
    async fn broadcast(&self, interest: SyncInterest) -> Result<()>;

    /// Receive the next advertisement.
    ///
    /// Blocks until one is available or an error occurs.
    async fn recv(&self) -> Result<SyncInterest>;

    /// Receive with timeout.
    ///
    /// Returns None if timeout expires before a message arrives.
    async fn recv_timeout(&self, timeout: Duration) -> Result<Option<SyncInterest>>;

    /// Get the local node's writer id.
    fn local_writer(&self) -> WriterId;

    /// List other nodes currently reachable.
    async fn connected_peers(&self) -> Result<Vec<WriterId>>;
}

/// Retrieves single entries of a writer's log.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the payload at `(writer, seq)`.
    ///
    /// `Ok(None)` means no reachable node has the entry. `Err` means the
    /// fetch path itself is broken and further fetches should not be tried.
    async fn fetch(&self, writer: &WriterId, seq: u64) -> Result<Option<Bytes>>;
}

/// A simple in-memory transport for testing.
///
/// Uses channels to simulate broadcast between nodes, and serves fetches
/// straight from the stores registered with the network.
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{mpsc, RwLock};

    use svs_store::Store;

    use crate::error::SyncError;

    /// Shared state for the memory transport network.
    pub struct MemoryNetwork {
        /// Sender channels for each node.
        senders: RwLock<HashMap<WriterId, mpsc::Sender<SyncInterest>>>,
        /// Stores that can answer fetches.
        stores: RwLock<Vec<Arc<dyn Store>>>,
    }

    impl MemoryNetwork {
        /// Create a new memory network.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Create a transport connected to this network.
        pub async fn create_transport(self: &Arc<Self>, writer: WriterId) -> MemoryTransport {
            let (tx, rx) = mpsc::channel(1000);

            self.senders.write().await.insert(writer.clone(), tx);

            MemoryTransport {
                writer,
                network: Arc::clone(self),
                receiver: RwLock::new(rx),
            }
        }

        /// Make `store`'s entries fetchable through this network.
        pub async fn register_store<S: Store + 'static>(&self, store: Arc<S>) {
            self.stores.write().await.push(store);
        }

        /// A fetcher reading from every registered store.
        pub fn fetcher(self: &Arc<Self>) -> MemoryFetcher {
            MemoryFetcher {
                network: Arc::clone(self),
            }
        }

        /// Remove a node; later broadcasts skip it.
        pub async fn disconnect(&self, writer: &WriterId) {
            self.senders.write().await.remove(writer);
        }
    }

    impl Default for MemoryNetwork {
        fn default() -> Self {
            Self {
                senders: RwLock::new(HashMap::new()),
                stores: RwLock::new(Vec::new()),
            }
        }
    }

    /// In-memory transport implementation.
    pub struct MemoryTransport {
        writer: WriterId,
        network: Arc<MemoryNetwork>,
        receiver: RwLock<mpsc::Receiver<SyncInterest>>,
    }

    #[async_trait]
    impl Transport for MemoryTransport {
        async fn broadcast(&self, interest: SyncInterest) -> Result<()> {
            let senders = self.network.senders.read().await;
            for (peer, sender) in senders.iter() {
                if peer != &self.writer {
                    // Ignore errors for broadcast (some peers may have disconnected)
                    let _ = sender.send(interest.clone()).await;
                }
            }
            Ok(())
        }

        async fn recv(&self) -> Result<SyncInterest> {
            let mut rx = self.receiver.write().await;
            rx.recv()
                .await
                .ok_or_else(|| SyncError::TransportError("channel closed".into()))
        }

        async fn recv_timeout(&self, timeout: Duration) -> Result<Option<SyncInterest>> {
            let mut rx = self.receiver.write().await;
            match tokio::time::timeout(timeout, rx.recv()).await {
                Ok(Some(interest)) => Ok(Some(interest)),
                Ok(None) => Err(SyncError::TransportError("channel closed".into())),
                Err(_) => Ok(None), // Timeout
            }
        }

        fn local_writer(&self) -> WriterId {
            self.writer.clone()
        }

        async fn connected_peers(&self) -> Result<Vec<WriterId>> {
            let senders = self.network.senders.read().await;
            let mut peers: Vec<WriterId> = senders
                .keys()
                .filter(|id| *id != &self.writer)
                .cloned()
                .collect();
            peers.sort();
            Ok(peers)
        }
    }

    /// Fetcher backed by the stores registered on a [`MemoryNetwork`].
    pub struct MemoryFetcher {
        network: Arc<MemoryNetwork>,
    }

    #[async_trait]
    impl Fetcher for MemoryFetcher {
        async fn fetch(&self, writer: &WriterId, seq: u64) -> Result<Option<Bytes>> {
            let stores = self.network.stores.read().await;
            for store in stores.iter() {
                if let Some(payload) = store.get_entry(writer, seq).await? {
                    return Ok(Some(payload));
                }
            }
            Ok(None)
        }
    }
}
