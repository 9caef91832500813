use std::collections::HashMap;
use std::sync::Mutex;

use super::{ChainSnapshot, Node, PeerClient, PeerSet};
use crate::blockchain::{Block, Blockchain};
use crate::error::{LedgerError, Result};

/// In-memory stand-in for the peer network. Peers without a registered
/// chain behave as unreachable.
#[derive(Default)]
pub struct FakePeers {
    chains: HashMap<String, ChainSnapshot>,
    posted: Mutex<Vec<(String, Block)>>,
    registered: Mutex<Vec<(String, String)>>,
}

impl FakePeers {
    pub fn with_chain(mut self, peer: &str, snapshot: ChainSnapshot) -> Self {
        self.chains.insert(peer.to_string(), snapshot);
        self
    }

    pub fn posted(&self) -> Vec<(String, Block)> {
        self.posted.lock().unwrap().clone()
    }

    pub fn registered(&self) -> Vec<(String, String)> {
        self.registered.lock().unwrap().clone()
    }

    fn lookup(&self, peer: &str) -> Result<ChainSnapshot> {
        self.chains
            .get(peer)
            .cloned()
            .ok_or_else(|| LedgerError::unreachable(peer, "connection refused"))
    }
}

impl PeerClient for FakePeers {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot> {
        self.lookup(peer)
    }

    async fn register_with(&self, remote: &str, own_address: &str) -> Result<ChainSnapshot> {
        let snapshot = self.lookup(remote)?;
        self.registered
            .lock()
            .unwrap()
            .push((remote.to_string(), own_address.to_string()));
        Ok(snapshot)
    }

    async fn post_block(&self, peer: &str, block: &Block) -> Result<()> {
        self.lookup(peer)?;
        self.posted
            .lock()
            .unwrap()
            .push((peer.to_string(), block.clone()));
        Ok(())
    }
}

pub fn snapshot_of(blockchain: &Blockchain) -> ChainSnapshot {
    ChainSnapshot {
        length: blockchain.len(),
        chain: blockchain.chain.clone(),
        peers: Vec::new(),
    }
}

pub fn node_with(blockchain: Blockchain, peers: &[&str], client: FakePeers) -> Node<FakePeers> {
    Node::new(blockchain, PeerSet::from_addresses(peers), client)
}
