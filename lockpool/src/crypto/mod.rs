//! Cryptographic primitives used by the lock pool.
//!
//! Two concerns live here and nothing else:
//!
//! - **hash** — BLAKE3 with domain separation for transaction and vote
//!   identifiers.
//! - **keys** — Ed25519 keypairs and signatures for validator lock votes.

pub mod hash;
pub mod keys;

pub use hash::{domain_hash, Hash};
pub use keys::{Keypair, PublicKey, Signature};
