use super::Block;
use super::hash::meets_difficulty;
use crate::error::{LedgerError, Result};

/// True iff `claimed_hash` has the difficulty prefix and equals the digest
/// recomputed from the block's own fields.
pub fn is_valid_proof(block: &Block, claimed_hash: &str, difficulty: u32) -> bool {
    meets_difficulty(claimed_hash, difficulty) && claimed_hash == block.compute_hash()
}

/// Replay a candidate chain from genesis. Asserted `hash` fields are never
/// trusted; each block's hash is rederived and the running linkage uses the
/// rederived values. Stops at the first failure.
pub fn verify_chain(candidate: &[Block], difficulty: u32) -> Result<()> {
    let genesis = candidate
        .first()
        .ok_or_else(|| LedgerError::InvalidChain("empty chain".into()))?;
    if !genesis.is_genesis() {
        return Err(LedgerError::InvalidChain("genesis block mismatch".into()));
    }

    let mut expected_previous_hash = genesis.compute_hash();
    for (position, block) in candidate.iter().enumerate().skip(1) {
        if block.index != position as u64 {
            return Err(LedgerError::InvalidChain(format!(
                "block at position {position} claims index {}",
                block.index
            )));
        }
        if block.previous_hash != expected_previous_hash {
            return Err(LedgerError::LinkageMismatch {
                index: block.index,
                expected: expected_previous_hash,
                found: block.previous_hash.clone(),
            });
        }
        let recomputed = block.compute_hash();
        if !meets_difficulty(&recomputed, difficulty) {
            return Err(LedgerError::ProofInvalid { index: block.index });
        }
        expected_previous_hash = recomputed;
    }
    Ok(())
}

/// Boolean form of [`verify_chain`].
pub fn check_validity(candidate: &[Block], difficulty: u32) -> bool {
    verify_chain(candidate, difficulty).is_ok()
}
