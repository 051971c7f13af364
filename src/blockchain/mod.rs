pub mod block;
pub mod hash;
pub mod miner;
pub mod model;

pub use block::Block;
pub use hash::Hash;
pub use miner::{mine, mine_until};
pub use model::{AppendOutcome, Blockchain};

/// Default Proof-of-Work difficulty (number of leading zero bytes).
pub const DEFAULT_DIFFICULTY: u32 = 1;

/// Payload carried by the genesis block.
pub const GENESIS_PAYLOAD: &str = "Genesis";
