use std::time::Duration;

use log::debug;
use serde_json::json;

use super::ChainSnapshot;
use crate::blockchain::Block;
use crate::error::{LedgerError, Result};

pub const CHAIN_PATH: &str = "/api/v1/chain/";
pub const REGISTER_NODE_PATH: &str = "/api/v1/register_node/";
pub const ADD_BLOCK_PATH: &str = "/api/v1/add_block/";

/// Outbound calls a node makes to its peers.
#[allow(async_fn_in_trait)]
pub trait PeerClient {
    /// Fetch a peer's `{length, chain, peers}` snapshot.
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot>;

    /// Register `own_address` with `remote` and return the remote's snapshot.
    async fn register_with(&self, remote: &str, own_address: &str) -> Result<ChainSnapshot>;

    /// Push a sealed block (its `hash` doubles as the proof).
    async fn post_block(&self, peer: &str, block: &Block) -> Result<()>;
}

/// reqwest-backed client; every request is bounded by the configured timeout.
#[derive(Clone)]
pub struct HttpPeerClient {
    http: reqwest::Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    async fn read_snapshot(peer: &str, response: reqwest::Response) -> Result<ChainSnapshot> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LedgerError::unreachable(peer, format!("HTTP {status}: {body}")));
        }
        response
            .json::<ChainSnapshot>()
            .await
            .map_err(|e| LedgerError::InvalidInput(format!("malformed chain from {peer}: {e}")))
    }
}

impl PeerClient for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainSnapshot> {
        let url = format!("{peer}{CHAIN_PATH}");
        debug!("PEER - GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| LedgerError::unreachable(peer, e))?;
        Self::read_snapshot(peer, response).await
    }

    async fn register_with(&self, remote: &str, own_address: &str) -> Result<ChainSnapshot> {
        let url = format!("{remote}{REGISTER_NODE_PATH}");
        debug!("PEER - POST {url} as {own_address}");
        let response = self
            .http
            .post(&url)
            .json(&json!({ "node_address": own_address }))
            .send()
            .await
            .map_err(|e| LedgerError::unreachable(remote, e))?;
        Self::read_snapshot(remote, response).await
    }

    async fn post_block(&self, peer: &str, block: &Block) -> Result<()> {
        let url = format!("{peer}{ADD_BLOCK_PATH}");
        let response = self
            .http
            .post(&url)
            .json(block)
            .send()
            .await
            .map_err(|e| LedgerError::unreachable(peer, e))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(LedgerError::unreachable(
                peer,
                format!("block #{} refused with HTTP {}", block.index, response.status()),
            ))
        }
    }
}
