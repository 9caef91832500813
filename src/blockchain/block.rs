use serde::{Deserialize, Serialize};

use super::GENESIS_PREVIOUS_HASH;
use super::hash::{self, BlockPreimage};
use crate::transaction::{Transaction, now_secs};

/// A single block in the ledger holding the transactions of one mining round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: f64, // fractional Unix seconds (UTC)
    pub previous_hash: String,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: String, // empty until sealed
}

impl Block {
    /// The fixed genesis block. Its fields are constant, so every node
    /// derives the same genesis hash.
    pub fn genesis() -> Self {
        let mut block = Self {
            index: 0,
            transactions: Vec::new(),
            timestamp: 0.0,
            previous_hash: String::from(GENESIS_PREVIOUS_HASH),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create a new unsealed block stamped with the current time.
    /// Run the proof-of-work search and append it to seal it.
    pub fn new(index: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        Self::new_with_timestamp(index, previous_hash, transactions, now_secs())
    }

    pub fn new_with_timestamp(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
        timestamp: f64,
    ) -> Self {
        Self {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        }
    }

    pub fn preimage(&self) -> BlockPreimage<'_> {
        BlockPreimage {
            index: self.index,
            transactions: &self.transactions,
            timestamp: self.timestamp,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
        }
    }

    /// Hash of every field except `hash` itself. Never reads `self.hash`.
    pub fn compute_hash(&self) -> String {
        hash::digest(&self.preimage())
    }

    /// Whether this block has exactly the genesis fields, judged by
    /// recomputing rather than trusting the stored hash.
    pub fn is_genesis(&self) -> bool {
        let genesis = Block::genesis();
        self.index == 0
            && self.transactions.is_empty()
            && self.previous_hash == GENESIS_PREVIOUS_HASH
            && self.compute_hash() == genesis.hash
    }
}
