use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::blockchain::Blockchain;
use crate::error::{LedgerError, Result};
use crate::node::{ChainSnapshot, PeerSet};

/// Read a persisted snapshot. A missing or empty file means a fresh node.
pub fn load(path: &Path) -> Result<Option<ChainSnapshot>> {
    if !path.exists() {
        info!("STORAGE - {} not found, starting fresh", path.display());
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let snapshot = serde_json::from_str(&raw)?;
    Ok(Some(snapshot))
}

/// Rebuild chain and peers from a snapshot; blocks go through the same
/// validated reconstruction as a peer's chain.
pub fn restore(snapshot: ChainSnapshot, difficulty: u32) -> Result<(Blockchain, PeerSet)> {
    if snapshot.length != snapshot.chain.len() {
        warn!(
            "STORAGE - recorded length {} but {} blocks on disk",
            snapshot.length,
            snapshot.chain.len()
        );
    }
    let blockchain = Blockchain::from_blocks(snapshot.chain, difficulty).map_err(|e| {
        LedgerError::Persistence(format!("stored chain rejected: {e}"))
    })?;
    let peers = PeerSet::from_addresses(&snapshot.peers);
    Ok((blockchain, peers))
}

/// Sibling of `path` with `.tmp` appended, never `path` itself.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write the snapshot as one JSON document, via a temp file and rename.
pub fn save(path: &Path, snapshot: &ChainSnapshot) -> Result<()> {
    let tmp = temp_path(path);
    fs::write(&tmp, serde_json::to_vec_pretty(snapshot)?)?;
    fs::rename(&tmp, path)?;
    info!(
        "STORAGE - saved {} blocks and {} peers to {}",
        snapshot.length,
        snapshot.peers.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn snapshot() -> ChainSnapshot {
        let mut bc = Blockchain::new(1);
        bc.add_new_transaction(Transaction::new("a", "hi").unwrap());
        bc.mine().unwrap();
        ChainSnapshot {
            length: bc.len(),
            chain: bc.chain.clone(),
            peers: vec!["http://127.0.0.1:8001".into()],
        }
    }

    #[test]
    fn missing_or_empty_file_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        assert!(load(&path).unwrap().is_none());

        fs::write(&path, "").unwrap();
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn save_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        let original = snapshot();
        save(&path, &original).unwrap();

        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded, original);

        let (bc, peers) = restore(loaded, 1).unwrap();
        assert_eq!(bc.chain, original.chain);
        assert_eq!(peers.to_vec(), vec!["http://127.0.0.1:8001"]);
    }

    #[test]
    fn tmp_named_data_file_survives_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.tmp");
        assert_eq!(temp_path(&path), dir.path().join("chain.tmp.tmp"));

        let original = snapshot();
        save(&path, &original).unwrap();
        assert_eq!(load(&path).unwrap(), Some(original));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn tampered_file_is_rejected() {
        let mut bad = snapshot();
        bad.chain[1].transactions[0].author = "mallory".into();
        assert!(matches!(restore(bad, 1), Err(LedgerError::Persistence(_))));
    }

    #[test]
    fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chain.json");
        fs::write(&path, "{not json").unwrap();
        assert!(load(&path).is_err());
    }
}
