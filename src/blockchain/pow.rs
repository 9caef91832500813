use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use super::{Block, MAX_DIFFICULTY};
use super::hash::{self, BlockPreimage};
use crate::error::{LedgerError, Result};

/// Winning nonce and the digest it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Proof {
    pub nonce: u64,
    pub hash: String,
}

/// Shared flag that stops an in-progress search. Once cancelled it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Search nonces from 0 upward until the block digest starts with
/// `difficulty` zero hex characters. The block itself is left untouched.
/// Unbounded unless `cancel` fires. A difficulty no digest can meet is refused.
pub fn seal(block: &Block, difficulty: u32, cancel: &CancelToken) -> Result<Proof> {
    if difficulty > MAX_DIFFICULTY {
        return Err(LedgerError::InvalidInput(format!(
            "difficulty {difficulty} exceeds {MAX_DIFFICULTY}"
        )));
    }
    let mut preimage = BlockPreimage {
        nonce: 0,
        ..block.preimage()
    };
    loop {
        if cancel.is_cancelled() {
            debug!("POW - search for block #{} cancelled at nonce {}", block.index, preimage.nonce);
            return Err(LedgerError::MiningCancelled);
        }
        let digest = hash::digest(&preimage);
        if hash::meets_difficulty(&digest, difficulty) {
            return Ok(Proof {
                nonce: preimage.nonce,
                hash: digest,
            });
        }
        preimage.nonce = preimage.nonce.wrapping_add(1);
    }
}
