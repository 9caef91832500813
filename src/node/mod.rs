pub mod client;
pub mod consensus;
pub mod peers;
#[cfg(test)]
pub mod testing;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use actix_web::web;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

pub use client::{HttpPeerClient, PeerClient};
pub use consensus::Resolution;
pub use peers::{PeerSet, normalize_address};

use crate::blockchain::{Block, Blockchain, CancelToken, MineOutcome, pow};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

/// `{length, chain, peers}` document: the chain query response, the
/// registration response and the persisted state all share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub length: usize,
    pub chain: Vec<Block>,
    pub peers: Vec<String>,
}

/// What a mine request ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub struct MineReport {
    pub outcome: MineOutcome,
    pub resolution: Resolution,
    pub announced_to: usize,
}

/// Chain and peer set share one lock so a mutation never sees the other
/// half mid-update.
struct LedgerState {
    blockchain: Blockchain,
    peers: PeerSet,
}

/// A ledger node: owns the chain and the peer set, and talks to peers
/// through `C`.
pub struct Node<C = HttpPeerClient> {
    state: RwLock<LedgerState>,
    client: C,
    cancel: CancelToken,
    own_address: Option<String>,
}

impl<C: PeerClient> Node<C> {
    pub fn new(blockchain: Blockchain, peers: PeerSet, client: C) -> Self {
        Self {
            state: RwLock::new(LedgerState { blockchain, peers }),
            client,
            cancel: CancelToken::new(),
            own_address: None,
        }
    }

    /// Public address sent to remotes on `register_with`. Without it the
    /// address the request came in on is used.
    pub fn with_own_address(mut self, address: Option<String>) -> Self {
        self.own_address = address;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().expect("ledger lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().expect("ledger lock poisoned")
    }

    /// Validate and queue a transaction in the pending pool.
    pub fn submit_transaction(&self, author: &str, content: &str) -> Result<Transaction> {
        let tx = Transaction::new(author, content)?;
        let mut state = self.write();
        state.blockchain.add_new_transaction(tx.clone());
        debug!(
            "TX - accepted from {} (pending={})",
            tx.author,
            state.blockchain.pending().len()
        );
        Ok(tx)
    }

    pub fn pending(&self) -> Vec<Transaction> {
        self.read().blockchain.pending().to_vec()
    }

    pub fn get_chain(&self) -> ChainSnapshot {
        let state = self.read();
        ChainSnapshot {
            length: state.blockchain.len(),
            chain: state.blockchain.chain.clone(),
            peers: state.peers.to_vec(),
        }
    }

    /// `(valid, length, difficulty)` for the local chain.
    pub fn validate(&self) -> (bool, usize, u32) {
        let state = self.read();
        (
            state.blockchain.is_valid_chain(),
            state.blockchain.len(),
            state.blockchain.difficulty(),
        )
    }

    /// Mine the whole pending pool into one block. The search runs on a
    /// blocking thread without the lock; the lock is only taken to append.
    /// If the tip moved meanwhile the block is dropped and mining restarts
    /// on the new tip.
    pub async fn mine(&self) -> Result<Option<Block>> {
        loop {
            let (template, difficulty) = {
                let state = self.read();
                (state.blockchain.next_block(), state.blockchain.difficulty())
            };
            let Some(mut block) = template else {
                return Ok(None);
            };

            let cancel = self.cancel.clone();
            let unsealed = block.clone();
            let proof = web::block(move || pow::seal(&unsealed, difficulty, &cancel))
                .await
                .map_err(|e| {
                    error!("MINER - sealing worker for block #{} failed: {e}", block.index);
                    LedgerError::from(e)
                })??;
            block.nonce = proof.nonce;

            let count = block.transactions.len();
            let mut state = self.write();
            match state.blockchain.append(block, &proof.hash) {
                Ok(()) => {
                    state.blockchain.drain_pending(count);
                    return Ok(Some(state.blockchain.last_block().clone()));
                }
                Err(LedgerError::LinkageMismatch { index, .. }) => {
                    info!("MINER - tip moved while sealing block #{index}; re-mining");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Mine, reconcile with peers, and announce the new block only if the
    /// local chain is still authoritative afterwards.
    pub async fn mine_and_announce(&self) -> Result<MineReport> {
        let Some(block) = self.mine().await? else {
            return Ok(MineReport {
                outcome: MineOutcome::NoOp,
                resolution: Resolution::Unchanged,
                announced_to: 0,
            });
        };
        let outcome = MineOutcome::Mined {
            count: block.transactions.len(),
            index: block.index,
        };

        let resolution = self.resolve().await;
        let announced_to = if resolution.replaced() {
            0
        } else {
            self.announce(&block).await
        };
        Ok(MineReport {
            outcome,
            resolution,
            announced_to,
        })
    }

    /// Route an externally mined block through the append gate.
    pub fn receive_block(&self, block: Block, proof: &str) -> Result<()> {
        let index = block.index;
        let mut state = self.write();
        match state.blockchain.append(block, proof) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("RECEIVE - block #{index} discarded: {e}");
                Err(e)
            }
        }
    }

    /// Best-effort push of `block` to every peer. Returns how many accepted it.
    pub async fn announce(&self, block: &Block) -> usize {
        let peers = self.read().peers.to_vec();
        let mut delivered = 0;
        for peer in peers {
            match self.client.post_block(&peer, block).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("ANNOUNCE - block #{} not delivered: {e}", block.index),
            }
        }
        delivered
    }

    /// Add a peer and hand back the current chain so it can bootstrap.
    pub fn register_peer(&self, address: &str) -> Result<ChainSnapshot> {
        {
            let mut state = self.write();
            let (address, added) = state.peers.insert(address)?;
            if self.own_address.as_deref() == Some(address.as_str()) {
                state.peers.remove(&address);
            } else if added {
                info!("PEERS - registered {address} (total={})", state.peers.len());
            }
        }
        Ok(self.get_chain())
    }

    /// One-time bootstrap join: announce ourselves to `remote`, then take
    /// its chain (rebuilt and validated) and its peer set as our own.
    pub async fn register_with(&self, remote: &str, request_address: &str) -> Result<usize> {
        let remote = normalize_address(remote)?;
        let own = match &self.own_address {
            Some(address) => address.clone(),
            None => normalize_address(request_address)?,
        };

        let snapshot = self.client.register_with(&remote, &own).await?;
        let difficulty = self.read().blockchain.difficulty();
        let blockchain = Blockchain::from_blocks(snapshot.chain, difficulty)?;

        let mut peers = PeerSet::from_addresses(&snapshot.peers);
        peers.insert(&remote)?;
        peers.remove(&own);

        let mut state = self.write();
        state.blockchain.replace_chain(blockchain);
        state.peers = peers;
        info!(
            "PEERS - joined via {remote}: chain length {}, {} peers",
            state.blockchain.len(),
            state.peers.len()
        );
        Ok(state.blockchain.len())
    }

    /// Stop any proof-of-work search in progress; used on shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
