use std::collections::BTreeSet;

use crate::error::{LedgerError, Result};

/// Normalize a peer address to `scheme://host[:port]` without a trailing
/// slash. Bare `host:port` gets `http://`.
pub fn normalize_address(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(LedgerError::invalid_input("node_address is required"));
    }
    if trimmed.contains("://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("http://{trimmed}"))
    }
}

/// Known peers, unique by normalized address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeerSet {
    addresses: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from untrusted addresses, silently skipping blank ones.
    pub fn from_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let addresses = addresses
            .into_iter()
            .filter_map(|a| normalize_address(a.as_ref()).ok())
            .collect();
        Self { addresses }
    }

    /// Returns the normalized address and whether it was new.
    pub fn insert(&mut self, raw: &str) -> Result<(String, bool)> {
        let address = normalize_address(raw)?;
        let added = self.addresses.insert(address.clone());
        Ok((address, added))
    }

    pub fn remove(&mut self, address: &str) -> bool {
        self.addresses.remove(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.addresses.iter().cloned().collect()
    }
}
