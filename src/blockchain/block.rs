use serde::Serialize;
use std::fmt;

use super::hash::{Hash, hash_block};

/// A single block: a nonce, the digest of its predecessor and a payload.
/// The block's own digest is derived from those three fields and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    nonce: u64,
    prev_hash: Option<Hash>, // None only for genesis
    payload: String,
}

impl Block {
    pub fn new(nonce: u64, prev_hash: Option<Hash>, payload: impl Into<String>) -> Self {
        Self {
            nonce,
            prev_hash,
            payload: payload.into(),
        }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn prev_hash(&self) -> Option<&Hash> {
        self.prev_hash.as_ref()
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Recompute this block's SHA-512 digest.
    pub fn hash(&self) -> Hash {
        hash_block(self.nonce, self.prev_hash.as_ref(), &self.payload)
    }

    /// Proof-of-work check on this block alone (does NOT check linkage).
    pub fn is_valid(&self, difficulty: u32) -> bool {
        self.hash().meets_difficulty(difficulty)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Data: {}", self.payload)?;
        writeln!(f, "Hash: {}", self.hash())?;
        match &self.prev_hash {
            Some(prev) => writeln!(f, "Prev: {prev}"),
            None => writeln!(f, "Prev: "),
        }
    }
}
