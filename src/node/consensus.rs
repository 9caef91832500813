use log::{debug, info, warn};

use super::client::PeerClient;
use super::{ChainSnapshot, Node};
use crate::blockchain::Blockchain;

/// Outcome of one consensus pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The local block sequence was replaced by `peer`'s chain.
    Adopted { peer: String, length: usize },
    Unchanged,
}

impl Resolution {
    pub fn replaced(&self) -> bool {
        matches!(self, Resolution::Adopted { .. })
    }
}

/// A peer chain qualifies only if its reported length beats `current_len`,
/// agrees with the number of blocks actually delivered, and the chain
/// rebuilds cleanly (full validation, rederived hashes).
pub fn qualify(
    peer: &str,
    snapshot: ChainSnapshot,
    current_len: usize,
    difficulty: u32,
) -> Option<Blockchain> {
    if snapshot.length <= current_len {
        debug!(
            "CONSENSUS - {peer}: length {} does not beat {current_len}",
            snapshot.length
        );
        return None;
    }
    if snapshot.length != snapshot.chain.len() {
        warn!(
            "CONSENSUS - {peer}: reported length {} but sent {} blocks",
            snapshot.length,
            snapshot.chain.len()
        );
        return None;
    }
    match Blockchain::from_blocks(snapshot.chain, difficulty) {
        Ok(candidate) => Some(candidate),
        Err(e) => {
            warn!("CONSENSUS - {peer}: longer chain rejected: {e}");
            None
        }
    }
}

impl<C: PeerClient> Node<C> {
    /// Longest-valid-chain rule. Peers are queried outside the ledger lock;
    /// unreachable peers are skipped. The winner must still be strictly
    /// longer than the local chain when the lock is taken to adopt it.
    pub async fn resolve(&self) -> Resolution {
        let (peers, mut current_len, difficulty) = {
            let state = self.read();
            (
                state.peers.to_vec(),
                state.blockchain.len(),
                state.blockchain.difficulty(),
            )
        };

        let mut best: Option<(String, Blockchain)> = None;
        for peer in peers {
            let snapshot = match self.client.fetch_chain(&peer).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("CONSENSUS - skipping {peer}: {e}");
                    continue;
                }
            };
            if let Some(candidate) = qualify(&peer, snapshot, current_len, difficulty) {
                current_len = candidate.len();
                best = Some((peer, candidate));
            }
        }

        let Some((peer, candidate)) = best else {
            return Resolution::Unchanged;
        };

        let mut state = self.write();
        if candidate.len() <= state.blockchain.len() {
            info!(
                "CONSENSUS - chain from {peer} no longer longer than local ({} <= {})",
                candidate.len(),
                state.blockchain.len()
            );
            return Resolution::Unchanged;
        }
        let length = candidate.len();
        state.blockchain.replace_chain(candidate);
        info!("CONSENSUS - adopted chain of length {length} from {peer}");
        Resolution::Adopted { peer, length }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::testing::{FakePeers, node_with, snapshot_of};
    use crate::transaction::Transaction;

    const DIFF: u32 = 2;

    fn chain_with_blocks(extra: usize) -> Blockchain {
        let mut bc = Blockchain::new(DIFF);
        for i in 0..extra {
            bc.add_new_transaction(Transaction::new("b", &format!("post {i}")).unwrap());
            bc.mine().unwrap();
        }
        bc
    }

    #[actix_web::test]
    async fn adopts_longer_valid_chain() {
        let b = chain_with_blocks(3);
        let peers = FakePeers::default().with_chain("http://b:1", snapshot_of(&b));
        let a = node_with(Blockchain::new(DIFF), &["http://b:1"], peers);

        let res = a.resolve().await;
        assert_eq!(
            res,
            Resolution::Adopted {
                peer: "http://b:1".into(),
                length: 4
            }
        );
        let snapshot = a.get_chain();
        assert_eq!(snapshot.length, b.len());
        assert_eq!(snapshot.chain, b.chain);
    }

    #[actix_web::test]
    async fn keeps_local_chain_against_equal_or_shorter() {
        let local = chain_with_blocks(2);
        let peers = FakePeers::default()
            .with_chain("http://equal:1", snapshot_of(&chain_with_blocks(2)))
            .with_chain("http://short:1", snapshot_of(&chain_with_blocks(1)));
        let a = node_with(local.clone(), &["http://equal:1", "http://short:1"], peers);

        assert_eq!(a.resolve().await, Resolution::Unchanged);
        assert_eq!(a.get_chain().chain, local.chain);
    }

    #[actix_web::test]
    async fn rejects_longer_invalid_chain() {
        let mut forged = snapshot_of(&chain_with_blocks(3));
        forged.chain[2].transactions[0].content = "forged".into();
        let peers = FakePeers::default().with_chain("http://evil:1", forged);
        let a = node_with(Blockchain::new(DIFF), &["http://evil:1"], peers);

        assert_eq!(a.resolve().await, Resolution::Unchanged);
        assert_eq!(a.get_chain().length, 1);
    }

    #[actix_web::test]
    async fn rejects_length_that_disagrees_with_blocks() {
        let mut lying = snapshot_of(&chain_with_blocks(1));
        lying.length = 10;
        let peers = FakePeers::default().with_chain("http://liar:1", lying);
        let a = node_with(Blockchain::new(DIFF), &["http://liar:1"], peers);

        assert_eq!(a.resolve().await, Resolution::Unchanged);
    }

    #[actix_web::test]
    async fn unreachable_peer_does_not_stop_resolution() {
        let b = chain_with_blocks(2);
        let peers = FakePeers::default().with_chain("http://up:1", snapshot_of(&b));
        let a = node_with(Blockchain::new(DIFF), &["http://down:1", "http://up:1"], peers);

        assert!(a.resolve().await.replaced());
        assert_eq!(a.get_chain().length, 3);
    }

    #[actix_web::test]
    async fn longest_of_several_candidates_wins() {
        let peers = FakePeers::default()
            .with_chain("http://a:1", snapshot_of(&chain_with_blocks(2)))
            .with_chain("http://b:1", snapshot_of(&chain_with_blocks(4)))
            .with_chain("http://c:1", snapshot_of(&chain_with_blocks(3)));
        let a = node_with(
            Blockchain::new(DIFF),
            &["http://a:1", "http://b:1", "http://c:1"],
            peers,
        );

        assert_eq!(
            a.resolve().await,
            Resolution::Adopted {
                peer: "http://b:1".into(),
                length: 5
            }
        );
    }
}
