//! Test fixtures and helpers.
//!
//! Common setup code for multi-node integration tests.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use svs::{Node, NodeConfig, SyncConfig, SyncReport};
use svs_core::{StateVector, WriterId};
use svs_store::MemoryStore;
use svs_sync::{vector_convergence, verify_convergence, MemoryFetcher, MemoryNetwork, MemoryTransport};

/// A node on the in-memory network.
pub type TestNode = Node<MemoryStore, MemoryTransport, MemoryFetcher>;

/// Node configuration with a short receive timeout, so rounds end quickly.
pub fn fast_config() -> NodeConfig {
    NodeConfig {
        sync: SyncConfig {
            message_timeout: Duration::from_millis(20),
            ..SyncConfig::default()
        },
        ..NodeConfig::default()
    }
}

/// Writer id used for the `index`th fixture node.
pub fn writer_name(index: usize) -> WriterId {
    WriterId::from(format!("/test/node-{}", index))
}

/// Random payload of `len` bytes.
pub fn random_payload(len: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen()).collect()
}

/// Several nodes sharing one in-memory network.
pub struct TestNetwork {
    pub network: Arc<MemoryNetwork>,
    pub nodes: Vec<TestNode>,
}

impl TestNetwork {
    /// Create `count` nodes, each with its own memory store.
    pub async fn new(count: usize) -> svs::Result<Self> {
        let network = MemoryNetwork::new();
        let mut nodes = Vec::with_capacity(count);
        for index in 0..count {
            nodes.push(Self::spawn_node(&network, writer_name(index)).await?);
        }
        Ok(Self { network, nodes })
    }

    async fn spawn_node(network: &Arc<MemoryNetwork>, writer: WriterId) -> svs::Result<TestNode> {
        let store = Arc::new(MemoryStore::new());
        network.register_store(Arc::clone(&store)).await;
        let transport = network.create_transport(writer).await;
        Node::new(store, transport, network.fetcher(), fast_config()).await
    }

    /// Add one more node and return its index.
    pub async fn join(&mut self) -> svs::Result<usize> {
        let index = self.nodes.len();
        let node = Self::spawn_node(&self.network, writer_name(index)).await?;
        self.nodes.push(node);
        Ok(index)
    }

    /// Publish `payload` from node `index`, returning the seq.
    pub async fn publish(&mut self, index: usize, payload: &[u8]) -> svs::Result<u64> {
        self.nodes[index].publish(payload).await
    }

    /// Run `rounds` sweeps in which every node runs one sync round.
    pub async fn sync_all(&mut self, rounds: usize) -> svs::Result<SyncReport> {
        let mut report = SyncReport::default();
        for _ in 0..rounds {
            for node in self.nodes.iter_mut() {
                report.absorb(node.sync_round().await?);
            }
        }
        Ok(report)
    }

    /// State vectors of every node, in node order.
    pub fn vectors(&self) -> Vec<StateVector> {
        self.nodes.iter().map(|n| n.state_vector().clone()).collect()
    }

    /// Whether every node's vector matches the first node's.
    pub fn vectors_converged(&self) -> bool {
        let Some(first) = self.nodes.first() else {
            return true;
        };
        self.nodes[1..]
            .iter()
            .all(|n| vector_convergence(first.state_vector(), n.state_vector()).is_converged())
    }

    /// Whether every node's store holds the same entries as the first node's.
    pub async fn stores_converged(&self) -> svs::Result<bool> {
        let Some(first) = self.nodes.first() else {
            return Ok(true);
        };
        for node in &self.nodes[1..] {
            if !verify_convergence(first.store(), node.store()).await?.is_converged() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
