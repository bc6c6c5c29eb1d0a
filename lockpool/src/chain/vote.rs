//! Validator lock votes.
//!
//! When a flash transaction clears admission, validators whose stake
//! tickets won voting slots broadcast a [`LockVote`] endorsing it. The
//! pool tallies these; strictly more than [`crate::config::VOTE_QUORUM`]
//! distinct votes confirms the transaction ahead of mining.

use serde::{Deserialize, Serialize};

use crate::crypto::hash::{domain_hash, Hash};
use crate::crypto::keys::{Keypair, PublicKey, Signature};

/// Domain-separation context for vote hashes.
const VOTE_HASH_CONTEXT: &str = "velo-lockpool vote v1";

/// A validator's signed endorsement of a flash transaction.
///
/// The signature covers `tx_hash || ticket_hash`, binding the vote to both
/// the transaction and the specific stake ticket that earned the voting
/// slot — the same key voting through two tickets produces two distinct,
/// separately-countable votes, and a vote for one transaction can never be
/// replayed for another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockVote {
    /// Hash of the flash transaction being endorsed.
    pub tx_hash: Hash,
    /// Hash of the stake ticket that won the voting slot.
    pub ticket_hash: Hash,
    /// Hex-encoded public key of the voting validator.
    pub validator: String,
    /// Ed25519 signature over `tx_hash || ticket_hash`.
    pub signature: Signature,
}

impl LockVote {
    /// Creates and signs a vote.
    pub fn new(keypair: &Keypair, tx_hash: Hash, ticket_hash: Hash) -> Self {
        let signature = keypair.sign(&Self::signed_message(&tx_hash, &ticket_hash));
        Self {
            tx_hash,
            ticket_hash,
            validator: keypair.public_key().to_hex(),
            signature,
        }
    }

    /// The vote's identity in the vote index: domain-separated BLAKE3 over
    /// transaction hash, ticket hash, and validator key.
    ///
    /// The signature is deliberately excluded — a re-signed copy of the
    /// same endorsement is still the same vote and must still be caught by
    /// the duplicate check.
    pub fn hash(&self) -> Hash {
        let mut buf = Vec::with_capacity(64 + self.validator.len());
        buf.extend_from_slice(&self.tx_hash.0);
        buf.extend_from_slice(&self.ticket_hash.0);
        buf.extend_from_slice(self.validator.as_bytes());
        domain_hash(VOTE_HASH_CONTEXT, &buf)
    }

    /// Verifies the vote signature against the embedded validator key.
    ///
    /// The pool itself trusts the delivery layer to have called this; it is
    /// exposed for that layer and for tests.
    pub fn verify(&self) -> bool {
        let Ok(pk) = PublicKey::from_hex(&self.validator) else {
            return false;
        };
        pk.verify(
            &Self::signed_message(&self.tx_hash, &self.ticket_hash),
            &self.signature,
        )
    }

    /// Report-map identifier: `"<voteHash>-<ticketHash>"`.
    pub fn report_id(&self) -> String {
        format!("{}-{}", self.hash(), self.ticket_hash)
    }

    fn signed_message(tx_hash: &Hash, ticket_hash: &Hash) -> Vec<u8> {
        let mut message = Vec::with_capacity(64);
        message.extend_from_slice(&tx_hash.0);
        message.extend_from_slice(&ticket_hash.0);
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashes() -> (Hash, Hash) {
        (
            domain_hash("t", b"some flash tx"),
            domain_hash("t", b"some ticket"),
        )
    }

    #[test]
    fn fresh_vote_verifies() {
        let (tx, ticket) = hashes();
        let vote = LockVote::new(&Keypair::generate(), tx, ticket);
        assert!(vote.verify());
    }

    #[test]
    fn tampered_vote_fails_verification() {
        let (tx, ticket) = hashes();
        let mut vote = LockVote::new(&Keypair::generate(), tx, ticket);
        vote.ticket_hash = domain_hash("t", b"another ticket");
        assert!(!vote.verify());
    }

    #[test]
    fn vote_hash_ignores_signature() {
        let (tx, ticket) = hashes();
        let kp = Keypair::generate();
        let a = LockVote::new(&kp, tx, ticket);
        let mut b = a.clone();
        b.signature = kp.sign(b"unrelated");
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn different_tickets_are_different_votes() {
        let (tx, ticket) = hashes();
        let kp = Keypair::generate();
        let a = LockVote::new(&kp, tx, ticket);
        let b = LockVote::new(&kp, tx, domain_hash("t", b"second ticket"));
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn report_id_format() {
        let (tx, ticket) = hashes();
        let vote = LockVote::new(&Keypair::generate(), tx, ticket);
        let id = vote.report_id();
        assert_eq!(id, format!("{}-{}", vote.hash(), ticket));
    }
}
