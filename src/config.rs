use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::blockchain::{DEFAULT_DIFFICULTY, MAX_DIFFICULTY};
use crate::node::normalize_address;

/// Node settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub data_file: Option<PathBuf>,
    pub peer_timeout: Duration,
    pub node_address: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            difficulty: DEFAULT_DIFFICULTY,
            data_file: None,
            peer_timeout: Duration::from_secs(5),
            node_address: None,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            difficulty: match parse_or(&lookup, "DIFFICULTY", defaults.difficulty) {
                d if d > MAX_DIFFICULTY => {
                    warn!("CONFIG - DIFFICULTY={d} exceeds {MAX_DIFFICULTY}, using default");
                    defaults.difficulty
                }
                d => d,
            },
            data_file: lookup("DATA_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            peer_timeout: Duration::from_secs(parse_or(
                &lookup,
                "PEER_TIMEOUT_SECS",
                defaults.peer_timeout.as_secs(),
            )),
            node_address: lookup("NODE_ADDRESS").and_then(|v| normalize_address(&v).ok()),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("CONFIG - ignoring invalid {key}={raw}");
            default
        }),
    }
}
