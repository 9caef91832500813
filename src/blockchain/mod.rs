pub mod block;
pub mod hash;
pub mod model;
pub mod pow;
pub mod validation;

pub use block::Block;
pub use model::{Blockchain, MineOutcome};
pub use pow::CancelToken;

/// Default Proof-of-Work difficulty (number of leading zero hex characters).
/// Every cooperating node must run with the same value.
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// A hex SHA-256 digest has 64 characters; no hash can carry more zeros.
pub const MAX_DIFFICULTY: u32 = 64;

/// Linkage value the genesis block points at.
pub const GENESIS_PREVIOUS_HASH: &str = "0";
