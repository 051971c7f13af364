use log::{debug, info, warn};
use std::sync::RwLock;

use super::miner::mine;
use super::{Block, GENESIS_PAYLOAD, Hash};

/// Result of offering a mined candidate to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Accepted; `height` is the index the block now occupies.
    Appended { height: usize },
    /// The candidate was mined against a tail that is no longer current.
    Stale,
    /// The chain already holds the requested number of blocks.
    Sealed,
}

/// Shared in-memory blockchain with Proof-of-Work.
///
/// Blocks live behind a single `RwLock`: tail reads and validation take the
/// read side, the check-and-append in [`Blockchain::submit`] takes the write
/// side for its whole critical section.
#[derive(Debug)]
pub struct Blockchain {
    blocks: RwLock<Vec<Block>>,
    difficulty: u32,
}

impl Blockchain {
    /// Initialize a new blockchain with a freshly mined genesis block.
    pub fn new(difficulty: u32) -> Self {
        let genesis = mine(difficulty, None, GENESIS_PAYLOAD);
        info!(
            "CHAIN - genesis mined (nonce={}, hash={}, difficulty={})",
            genesis.nonce(),
            genesis.hash(),
            difficulty
        );
        Self {
            blocks: RwLock::new(vec![genesis]),
            difficulty,
        }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn len(&self) -> usize {
        self.blocks.read().expect("chain lock poisoned").len()
    }

    /// Digest of the current tail. Only a hint: the tail may move as soon as
    /// the read lock is released.
    pub fn tail_hash(&self) -> Hash {
        let blocks = self.blocks.read().expect("chain lock poisoned");
        blocks
            .last()
            .expect("Blockchain should always have at least the genesis block")
            .hash()
    }

    /// Clone of every block, in chain order.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.read().expect("chain lock poisoned").clone()
    }

    /// Append `candidate` if it still extends the current tail.
    pub fn try_append(&self, candidate: Block) -> bool {
        matches!(self.submit(candidate, None), AppendOutcome::Appended { .. })
    }

    /// Check-and-append under the write lock. With `limit` set, a chain that
    /// already holds `limit` blocks refuses every candidate.
    pub fn submit(&self, candidate: Block, limit: Option<usize>) -> AppendOutcome {
        let mut blocks = self.blocks.write().expect("chain lock poisoned");

        if limit.is_some_and(|limit| blocks.len() >= limit) {
            return AppendOutcome::Sealed;
        }

        let tail = blocks
            .last()
            .expect("Blockchain should always have at least the genesis block")
            .hash();
        if candidate.prev_hash() != Some(&tail) {
            debug!(
                "CHAIN - stale candidate {:?} (tail moved to {:?})",
                candidate.prev_hash(),
                tail
            );
            return AppendOutcome::Stale;
        }

        blocks.push(candidate);
        AppendOutcome::Appended {
            height: blocks.len() - 1,
        }
    }

    /// Check link integrity: every block after genesis must reference the
    /// digest of the block before it. Run only once all writers are done.
    pub fn validate_all(&self) -> bool {
        let blocks = self.blocks.read().expect("chain lock poisoned");
        for (i, pair) in blocks.windows(2).enumerate() {
            let (prev, current) = (&pair[0], &pair[1]);
            if current.prev_hash() != Some(&prev.hash()) {
                warn!("CHAIN - broken link at block #{}", i + 1);
                return false;
            }
        }
        true
    }

    /// Check that every block, genesis included, meets the chain difficulty.
    pub fn verify_work(&self) -> bool {
        let blocks = self.blocks.read().expect("chain lock poisoned");
        match blocks.iter().position(|b| !b.is_valid(self.difficulty)) {
            Some(i) => {
                warn!("CHAIN - block #{} fails proof-of-work", i);
                false
            }
            None => true,
        }
    }
}
