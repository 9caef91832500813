use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::transaction::Transaction;

/// Every block field that goes into the hash, i.e. all of them except `hash`.
#[derive(Serialize)]
pub struct BlockPreimage<'a> {
    pub index: u64,
    pub transactions: &'a [Transaction],
    pub timestamp: f64,
    pub previous_hash: &'a str,
    pub nonce: u64,
}

/// Canonical byte encoding of the preimage: compact JSON with object keys
/// sorted at every level, so equal field sets always encode identically.
pub fn canonical_bytes(preimage: &BlockPreimage<'_>) -> Vec<u8> {
    // serde_json::Map is BTreeMap-backed, so going through Value sorts keys.
    let value = serde_json::to_value(preimage).expect("block fields are always serializable");
    serde_json::to_vec(&value).expect("json value is always serializable")
}

/// Lowercase hex SHA-256 of the canonical preimage encoding.
pub fn digest(preimage: &BlockPreimage<'_>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_bytes(preimage));
    hex::encode(hasher.finalize())
}

/// True when `hash` starts with `difficulty` zero hex characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let target_prefix = "0".repeat(difficulty as usize);
    hash.starts_with(&target_prefix)
}
