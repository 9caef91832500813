use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// Shared application state: the node owning the chain and the peer set.
pub type AppState = crate::node::Node;

/* ---------- TX API Models ---------- */

/// Accepted both as JSON and as a form; missing fields surface as 400s
/// from the ledger rather than as body-parsing errors.
#[derive(Deserialize)]
pub struct NewTxRequest {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub accepted: bool,
    pub transaction: Transaction,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub mined_count: usize,
    pub mined_index: Option<u64>,
    pub chain_replaced: bool,
    pub announced_to: usize,
    pub length: usize,
}

#[derive(Serialize)]
pub struct ConsensusResponse {
    pub replaced: bool,
    pub length: usize,
}

/* ---------- Peer API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub node_address: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterWithResponse {
    pub length: usize,
    pub peers: Vec<String>,
}
