use serde::{Serialize, Serializer};
use sha2::{Digest, Sha512};
use std::fmt;

/// Width of a block digest in bytes (SHA-512).
pub const HASH_LEN: usize = 64;

/// A SHA-512 block digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Number of leading zero bytes.
    pub fn leading_zero_bytes(&self) -> usize {
        self.0.iter().take_while(|b| **b == 0).count()
    }

    /// True when the first `difficulty` bytes are all zero. Bytes are checked
    /// in order and the scan stops at the first nonzero one.
    pub fn meets_difficulty(&self, difficulty: u32) -> bool {
        let difficulty = difficulty as usize;
        if difficulty > HASH_LEN {
            return false;
        }
        self.0[..difficulty].iter().all(|b| *b == 0)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({}..)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Digest of a block's fields: SHA-512 over the decimal nonce, the predecessor
/// digest (no bytes for genesis) and the payload.
pub fn hash_block(nonce: u64, prev_hash: Option<&Hash>, payload: &str) -> Hash {
    let mut hasher = Sha512::new();
    hasher.update(nonce.to_string().as_bytes());
    if let Some(prev) = prev_hash {
        hasher.update(prev.as_bytes());
    }
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(&digest[..]);
    Hash(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let prev = hash_block(0, None, "Genesis");
        assert_eq!(
            hash_block(42, Some(&prev), "payload"),
            hash_block(42, Some(&prev), "payload")
        );
    }

    #[test]
    fn every_field_feeds_the_digest() {
        let prev = hash_block(0, None, "Genesis");
        let base = hash_block(1, Some(&prev), "a");
        assert_ne!(base, hash_block(2, Some(&prev), "a"));
        assert_ne!(base, hash_block(1, None, "a"));
        assert_ne!(base, hash_block(1, Some(&prev), "b"));
    }

    #[test]
    fn matches_plain_sha512_of_concatenation() {
        let prev = hash_block(7, None, "x");
        let mut preimage = b"12".to_vec();
        preimage.extend_from_slice(prev.as_bytes());
        preimage.extend_from_slice(b"data");
        let expected = Sha512::digest(&preimage);
        assert_eq!(hash_block(12, Some(&prev), "data").as_bytes()[..], expected[..]);
    }

    #[test]
    fn difficulty_checks_leading_bytes() {
        let mut bytes = [0xffu8; HASH_LEN];
        bytes[0] = 0;
        bytes[1] = 0;
        let h = Hash::from_bytes(bytes);
        assert_eq!(h.leading_zero_bytes(), 2);
        assert!(h.meets_difficulty(0));
        assert!(h.meets_difficulty(2));
        assert!(!h.meets_difficulty(3));
    }

    #[test]
    fn difficulty_wider_than_digest_is_unsatisfiable() {
        let h = Hash::from_bytes([0u8; HASH_LEN]);
        assert!(h.meets_difficulty(HASH_LEN as u32));
        assert!(!h.meets_difficulty(HASH_LEN as u32 + 1));
    }

    #[test]
    fn display_is_lowercase_hex() {
        let h = hash_block(0, None, "Genesis");
        let s = h.to_string();
        assert_eq!(s.len(), HASH_LEN * 2);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
