use log::{debug, info};

use super::Block;
use super::pow::{self, CancelToken};
use super::validation;
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

/// Result of a mining round.
#[derive(Debug, Clone, PartialEq)]
pub enum MineOutcome {
    /// One block sealing `count` pending transactions was appended at `index`.
    Mined { count: usize, index: u64 },
    /// Nothing was pending; the chain is unchanged.
    NoOp,
}

/// In-memory ledger: a genesis-rooted block sequence plus the pending pool.
#[derive(Debug, Clone)]
pub struct Blockchain {
    pub chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: u32,
}

impl Blockchain {
    /// Initialize a new blockchain holding only the genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            difficulty,
        }
    }

    /// Rebuild a typed chain from blocks received from a peer or read from disk.
    /// The whole sequence is validated first, then every block after genesis
    /// is re-appended with a rederived proof; asserted hashes are discarded.
    pub fn from_blocks(blocks: Vec<Block>, difficulty: u32) -> Result<Self> {
        validation::verify_chain(&blocks, difficulty)?;

        let mut bc = Self::new(difficulty);
        for mut block in blocks.into_iter().skip(1) {
            block.hash.clear();
            let proof = block.compute_hash();
            bc.append(block, &proof)?;
        }
        Ok(bc)
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    pub fn add_new_transaction(&mut self, tx: Transaction) {
        self.pending.push(tx);
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Unsealed block on top of the current tip carrying the whole pending
    /// pool, or `None` when the pool is empty.
    pub fn next_block(&self) -> Option<Block> {
        if self.pending.is_empty() {
            return None;
        }
        let last = self.last_block();
        Some(Block::new(
            last.index + 1,
            last.hash.clone(),
            self.pending.clone(),
        ))
    }

    /// Seal the entire pending pool into one block and append it.
    /// The pool is cleared only once the append succeeded.
    pub fn mine(&mut self) -> Result<MineOutcome> {
        let Some(mut block) = self.next_block() else {
            return Ok(MineOutcome::NoOp);
        };
        let count = block.transactions.len();

        let proof = pow::seal(&block, self.difficulty, &CancelToken::new())?;
        block.nonce = proof.nonce;
        let index = block.index;
        self.append(block, &proof.hash)?;
        self.drain_pending(count);

        Ok(MineOutcome::Mined { count, index })
    }

    /// The single gate for every block. Rejects without mutating when the
    /// block does not link to the tip or `proof` is not a valid proof for it.
    /// On success the block is sealed with `proof` and appended.
    pub fn append(&mut self, mut block: Block, proof: &str) -> Result<()> {
        let tip = self.last_block();
        if block.previous_hash != tip.hash {
            debug!(
                "APPEND - block #{} rejected: previous_hash {} != tip {}",
                block.index, block.previous_hash, tip.hash
            );
            return Err(LedgerError::LinkageMismatch {
                index: block.index,
                expected: tip.hash.clone(),
                found: block.previous_hash,
            });
        }
        if block.index != tip.index + 1 {
            return Err(LedgerError::InvalidInput(format!(
                "block index {} does not follow tip index {}",
                block.index, tip.index
            )));
        }
        if !validation::is_valid_proof(&block, proof, self.difficulty) {
            debug!("APPEND - block #{} rejected: invalid proof {}", block.index, proof);
            return Err(LedgerError::ProofInvalid { index: block.index });
        }

        block.hash = proof.to_string();
        info!(
            "APPEND - block #{} sealed (hash={}, nonce={}, txs={})",
            block.index,
            block.hash,
            block.nonce,
            block.transactions.len()
        );
        self.chain.push(block);
        Ok(())
    }

    /// Drop the first `count` pending transactions, i.e. the ones a mined
    /// block snapshotted. Anything submitted afterwards stays pending.
    pub fn drain_pending(&mut self, count: usize) {
        let count = count.min(self.pending.len());
        self.pending.drain(..count);
    }

    /// Swap in another chain's blocks wholesale. Pending transactions the
    /// new chain already carries are dropped; the rest stay pending.
    pub fn replace_chain(&mut self, other: Blockchain) {
        self.chain = other.chain;
        let chain = &self.chain;
        self.pending
            .retain(|tx| !chain.iter().any(|b| b.transactions.contains(tx)));
    }

    /// Validate the entire chain: genesis, linkage, hashes and PoW.
    pub fn is_valid_chain(&self) -> bool {
        validation::check_validity(&self.chain, self.difficulty)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFF: u32 = 2;

    fn tx(author: &str, content: &str) -> Transaction {
        Transaction::new(author, content).unwrap()
    }

    #[test]
    fn fresh_chain_has_only_genesis() {
        let bc = Blockchain::new(DIFF);
        assert_eq!(bc.len(), 1);
        assert_eq!(bc.chain[0].index, 0);
        assert_eq!(bc.chain[0].previous_hash, "0");
        assert!(bc.pending().is_empty());
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn mine_with_empty_pool_is_noop() {
        let mut bc = Blockchain::new(DIFF);
        assert_eq!(bc.mine().unwrap(), MineOutcome::NoOp);
        assert_eq!(bc.len(), 1);
    }

    #[test]
    fn mine_single_transaction() {
        let mut bc = Blockchain::new(DIFF);
        let submitted = tx("a", "hi");
        bc.add_new_transaction(submitted.clone());

        let outcome = bc.mine().unwrap();
        assert_eq!(outcome, MineOutcome::Mined { count: 1, index: 1 });
        assert_eq!(bc.len(), 2);

        let block = &bc.chain[1];
        assert_eq!(block.previous_hash, bc.chain[0].hash);
        assert_eq!(block.transactions, vec![submitted]);
        assert!(block.hash.starts_with("00"));
        assert!(bc.pending().is_empty());
    }

    #[test]
    fn whole_pool_goes_into_one_block() {
        let mut bc = Blockchain::new(DIFF);
        for i in 0..3 {
            bc.add_new_transaction(tx("a", &format!("post {i}")));
        }
        assert_eq!(bc.mine().unwrap(), MineOutcome::Mined { count: 3, index: 1 });
        assert_eq!(bc.len(), 2);
        assert_eq!(bc.chain[1].transactions.len(), 3);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn stale_previous_hash_is_rejected_without_mutation() {
        let mut bc = Blockchain::new(DIFF);
        bc.add_new_transaction(tx("a", "first"));
        let mut stale = bc.next_block().unwrap();

        // another round lands first and moves the tip
        bc.mine().unwrap();
        let before = bc.len();

        let proof = pow::seal(&stale, DIFF, &CancelToken::new()).unwrap();
        stale.nonce = proof.nonce;
        let err = bc.append(stale, &proof.hash).unwrap_err();
        assert!(matches!(err, LedgerError::LinkageMismatch { .. }));
        assert_eq!(bc.len(), before);
        assert!(bc.is_valid_chain());
    }

    #[test]
    fn append_rejects_bad_proof() {
        let mut bc = Blockchain::new(DIFF);
        bc.add_new_transaction(tx("a", "hi"));
        let block = bc.next_block().unwrap();

        let err = bc.append(block.clone(), &"0".repeat(64)).unwrap_err();
        assert_eq!(err, LedgerError::ProofInvalid { index: 1 });
        assert_eq!(bc.len(), 1);
        assert_eq!(bc.pending().len(), 1);
    }

    #[test]
    fn drain_keeps_late_submissions() {
        let mut bc = Blockchain::new(DIFF);
        bc.add_new_transaction(tx("a", "one"));
        bc.add_new_transaction(tx("a", "two"));
        bc.add_new_transaction(tx("b", "late"));
        bc.drain_pending(2);
        assert_eq!(bc.pending().len(), 1);
        assert_eq!(bc.pending()[0].content, "late");
    }

    #[test]
    fn replace_chain_drops_already_included_pending() {
        let shared = tx("a", "shared");
        let mut other = Blockchain::new(DIFF);
        other.add_new_transaction(shared.clone());
        other.mine().unwrap();

        let mut bc = Blockchain::new(DIFF);
        bc.add_new_transaction(shared);
        bc.add_new_transaction(tx("b", "local only"));
        bc.replace_chain(other.clone());

        assert_eq!(bc.chain, other.chain);
        assert_eq!(bc.pending().len(), 1);
        assert_eq!(bc.pending()[0].content, "local only");
    }

    #[test]
    fn rebuild_from_blocks_rederives_hashes() {
        let mut source = Blockchain::new(DIFF);
        for i in 0..2 {
            source.add_new_transaction(tx("a", &format!("post {i}")));
            source.mine().unwrap();
        }

        let mut blocks = source.chain.clone();
        let real = blocks[2].hash.clone();
        blocks[2].hash = "not-a-hash".into();

        let rebuilt = Blockchain::from_blocks(blocks, DIFF).unwrap();
        assert_eq!(rebuilt.len(), 3);
        assert_eq!(rebuilt.chain[2].hash, real);
        assert!(rebuilt.is_valid_chain());
    }

    #[test]
    fn rebuild_rejects_tampered_blocks() {
        let mut source = Blockchain::new(DIFF);
        source.add_new_transaction(tx("a", "hi"));
        source.mine().unwrap();

        let mut blocks = source.chain.clone();
        blocks[1].transactions[0].content = "bye".into();
        assert!(Blockchain::from_blocks(blocks, DIFF).is_err());
    }
}
