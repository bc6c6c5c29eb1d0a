//! The three synchronized indexes and the pool's read surface.
//!
//! `PoolInner` methods assume the caller already holds the pool lock (they
//! take `&self`/`&mut self` on the guarded data, so the borrow checker
//! enforces it). The `LockPool` methods below are the public read surface
//! and take the read lock themselves.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chain::transaction::{FlashTx, OutPoint, Transaction};
use crate::chain::vote::LockVote;
use crate::crypto::hash::Hash;

use super::error::PoolError;
use super::{LockPool, LockPoolEntry, PoolInner};

/// External summary of one pool entry, keyed by hex transaction hash in
/// the diagnostic report map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStatus {
    /// Best height when the entry was admitted.
    pub add_height: u64,
    /// Height the transaction was mined at, 0 while unmined.
    pub mine_height: u64,
    /// Vote identifiers, formatted `"<voteHash>-<ticketHash>"`.
    pub votes: Vec<String>,
    /// Whether the vote quorum has been reached.
    pub confirmed: bool,
}

impl PoolInner {
    /// True when `hash` has a pool entry.
    pub(crate) fn contains(&self, hash: &Hash) -> bool {
        self.entries.contains_key(hash)
    }

    /// True when `hash` has a pool entry that reached vote quorum.
    pub(crate) fn contains_confirmed(&self, hash: &Hash) -> bool {
        self.entries.get(hash).is_some_and(|entry| entry.confirmed)
    }

    /// The flash transaction currently locking `outpoint`, if any.
    pub(crate) fn locking_transaction(&self, outpoint: &OutPoint) -> Option<&Arc<FlashTx>> {
        self.lock_outpoints.get(outpoint)
    }

    /// The shared conflict rule: a transaction that is itself a confirmed
    /// pool entry is exempt (it *is* the lock); anything else touching a
    /// locked outpoint is a double spend against the pool.
    ///
    /// Used identically by admission, block-conflict checking, and
    /// eviction, so the three can never disagree about what conflicts.
    pub(crate) fn check_pool_conflicts(&self, hash: &Hash, tx: &Transaction) -> Result<(), PoolError> {
        if self.contains_confirmed(hash) {
            return Ok(());
        }
        for input in &tx.inputs {
            if let Some(locked) = self.locking_transaction(&input.previous_outpoint) {
                return Err(PoolError::Conflict {
                    tx: *hash,
                    locked_by: locked.hash(),
                });
            }
        }
        Ok(())
    }

    /// Adds an entry to the owning map and registers every input outpoint.
    ///
    /// The caller has already rejected duplicates; a debug assertion keeps
    /// that contract honest in test builds.
    pub(crate) fn insert_entry(&mut self, entry: LockPoolEntry) {
        let hash = entry.tx.hash();
        debug_assert!(!self.entries.contains_key(&hash), "duplicate insert");

        for input in &entry.tx.transaction().inputs {
            self.lock_outpoints
                .insert(input.previous_outpoint, Arc::clone(&entry.tx));
        }
        self.entries.insert(hash, entry);
    }

    /// Removes an entry and every trace of it: its votes from the vote
    /// index and its inputs from the outpoint index. One critical section,
    /// owning map first. Returns false when `hash` was not present.
    pub(crate) fn remove_entry(&mut self, hash: &Hash) -> bool {
        let Some(entry) = self.entries.remove(hash) else {
            return false;
        };
        for vote in &entry.votes {
            self.vote_index.remove(&vote.hash());
        }
        for input in &entry.tx.transaction().inputs {
            self.lock_outpoints.remove(&input.previous_outpoint);
        }
        true
    }
}

impl LockPool {
    /// True when the pool tracks `hash`.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.inner.read().contains(hash)
    }

    /// True when the pool tracks `hash` and it has reached vote quorum.
    pub fn contains_confirmed(&self, hash: &Hash) -> bool {
        self.inner.read().contains_confirmed(hash)
    }

    /// Fetches the tracked flash transaction for `hash`.
    pub fn get_transaction(&self, hash: &Hash) -> Option<Arc<FlashTx>> {
        self.inner
            .read()
            .entries
            .get(hash)
            .map(|entry| Arc::clone(&entry.tx))
    }

    /// Fetches a recorded vote by its vote hash, for gossip replies.
    pub fn get_vote(&self, vote_hash: &Hash) -> Option<LockVote> {
        self.inner.read().vote_index.get(vote_hash).cloned()
    }

    /// The flash transaction currently locking `outpoint`, if any.
    pub fn locking_transaction(&self, outpoint: &OutPoint) -> Option<Arc<FlashTx>> {
        self.inner
            .read()
            .locking_transaction(outpoint)
            .map(Arc::clone)
    }

    /// Point-in-time copy of every tracked transaction hash and vote hash,
    /// safe to hand to the gossip layer with no lock held.
    pub fn snapshot(&self) -> (Vec<Hash>, Vec<Hash>) {
        let inner = self.inner.read();
        let tx_hashes = inner.entries.keys().copied().collect();
        let vote_hashes = inner.vote_index.keys().copied().collect();
        (tx_hashes, vote_hashes)
    }

    /// Stable external view of the pool for diagnostics and RPC, keyed by
    /// hex transaction hash.
    pub fn report(&self) -> HashMap<String, LockStatus> {
        let inner = self.inner.read();
        inner
            .entries
            .iter()
            .map(|(hash, entry)| {
                let votes = entry.votes.iter().map(LockVote::report_id).collect();
                (
                    hash.to_hex(),
                    LockStatus {
                        add_height: entry.add_height,
                        mine_height: entry.mine_height,
                        votes,
                        confirmed: entry.confirmed,
                    },
                )
            })
            .collect()
    }

    /// Number of tracked flash transactions.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// True when the pool tracks nothing.
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}
