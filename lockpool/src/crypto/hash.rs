//! # Hashing
//!
//! Every identifier in the lock pool — transaction hashes, vote hashes —
//! is a domain-separated BLAKE3 digest. Domain separation matters: a vote
//! and a transaction that happen to serialize to the same bytes must never
//! collide, so each object type hashes under its own context string.
//!
//! BLAKE3's `derive_key` mode is the proper way to do this. The context
//! string changes the internal IV, making cross-context collisions
//! impossible by construction. Don't prepend tags by hand.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 32-byte digest identifying a transaction, vote, or block.
///
/// Wraps the raw bytes so the type system keeps hash-keyed maps honest:
/// you cannot accidentally index the outpoint table with a vote hash's
/// raw bytes without going through this type.
///
/// Displays as lowercase hex, which is also the key format of the
/// diagnostic report map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The all-zero hash. Used as the previous-outpoint hash of a coinbase
    /// input and nowhere else.
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Returns the digest as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a 64-character hex string into a hash.
    pub fn from_hex(s: &str) -> Option<Hash> {
        let bytes = hex::decode(s).ok()?;
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Some(Hash(arr))
    }

    /// True for the all-zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full hex is unreadable in test output; eight bytes is plenty to
        // tell two hashes apart.
        write!(f, "Hash({}…)", &self.to_hex()[..16])
    }
}

/// Computes a domain-separated BLAKE3 digest of `data` under `context`.
///
/// The context string must be unique per object type and never reused.
/// Current contexts: `"velo-lockpool tx v1"`, `"velo-lockpool vote v1"`.
pub fn domain_hash(context: &str, data: &[u8]) -> Hash {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    Hash(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let h = domain_hash("test", b"payload");
        let parsed = Hash::from_hex(&h.to_hex()).unwrap();
        assert_eq!(h, parsed);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Hash::from_hex("not hex").is_none());
        assert!(Hash::from_hex("abcd").is_none()); // too short
    }

    #[test]
    fn contexts_separate_domains() {
        let a = domain_hash("context-a", b"same bytes");
        let b = domain_hash("context-b", b"same bytes");
        assert_ne!(a, b);
    }

    #[test]
    fn zero_hash_is_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(!domain_hash("test", b"x").is_zero());
    }
}
