use std::sync::atomic::{AtomicBool, Ordering};

use super::{Block, Hash};

/// How many nonces `mine_until` tries between polls of the stop flag.
const STOP_POLL_INTERVAL: u64 = 1024;

/// Brute-force a nonce, counting up from 0, until the block's digest has
/// `difficulty` leading zero bytes.
///
/// The search is unbounded: a difficulty wider than the digest never returns.
/// The nonce is a `u64`; exhausting it would take 2^64 SHA-512 evaluations, so
/// wrap-around is not handled.
pub fn mine(difficulty: u32, prev_hash: Option<Hash>, payload: &str) -> Block {
    let mut nonce: u64 = 0;
    loop {
        let candidate = Block::new(nonce, prev_hash, payload);
        if candidate.is_valid(difficulty) {
            return candidate;
        }
        nonce += 1;
    }
}

/// Same search as [`mine`], but gives up and returns `None` once `stop` is set.
pub fn mine_until(
    difficulty: u32,
    prev_hash: Option<Hash>,
    payload: &str,
    stop: &AtomicBool,
) -> Option<Block> {
    let mut nonce: u64 = 0;
    loop {
        if nonce % STOP_POLL_INTERVAL == 0 && stop.load(Ordering::Relaxed) {
            return None;
        }
        let candidate = Block::new(nonce, prev_hash, payload);
        if candidate.is_valid(difficulty) {
            return Some(candidate);
        }
        nonce += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_zero_takes_first_nonce() {
        let b = mine(0, None, "anything");
        assert_eq!(b.nonce(), 0);
    }

    #[test]
    fn mined_digest_has_leading_zero_bytes() {
        let genesis = mine(1, None, "Genesis");
        for d in 0..=2 {
            let b = mine(d, Some(genesis.hash()), "payload");
            assert!(b.hash().leading_zero_bytes() >= d as usize);
            assert_eq!(b.prev_hash(), Some(&genesis.hash()));
            assert_eq!(b.payload(), "payload");
        }
    }

    #[test]
    fn returns_the_smallest_valid_nonce() {
        let b = mine(1, None, "Genesis");
        for nonce in 0..b.nonce() {
            assert!(!Block::new(nonce, None, "Genesis").is_valid(1));
        }
    }

    #[test]
    fn search_is_pure() {
        let a = mine(1, None, "same input");
        let b = mine(1, None, "same input");
        assert_eq!(a, b);
    }

    #[test]
    fn mine_until_agrees_with_mine() {
        let stop = AtomicBool::new(false);
        let found = mine_until(1, None, "Genesis", &stop);
        assert_eq!(found, Some(mine(1, None, "Genesis")));
    }

    #[test]
    fn mine_until_gives_up_when_stopped() {
        let stop = AtomicBool::new(true);
        // Unsatisfiable difficulty: only the stop flag can end the search.
        assert_eq!(mine_until(65, None, "never", &stop), None);
    }
}
