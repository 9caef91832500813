use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// An author/content record waiting in the pending pool or sealed in a block.
/// The ledger never interprets the payload, it only hashes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub author: String,
    pub content: String,
    /// Fractional Unix seconds (UTC), stamped when the node accepts it.
    pub timestamp: f64,
}

impl Transaction {
    /// Build a transaction stamped with the current time.
    /// Both fields are required; blank values are rejected.
    pub fn new(author: &str, content: &str) -> Result<Self> {
        if author.trim().is_empty() {
            return Err(LedgerError::invalid_input("author is required"));
        }
        if content.trim().is_empty() {
            return Err(LedgerError::invalid_input("content is required"));
        }
        Ok(Self {
            author: author.to_string(),
            content: content.to_string(),
            timestamp: now_secs(),
        })
    }
}

/// Current UTC time as fractional seconds, microsecond precision.
pub fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
