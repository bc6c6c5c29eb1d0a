//! Vote tallying and the quorum flip.
//!
//! Validators observe a flash transaction, check it against their own view
//! of the chain, and gossip a signed [`LockVote`]. The pool tallies votes
//! per entry; strictly more than `VOTE_QUORUM` of them confirms the entry:
//! blocks that contradict its input locks are refused, and the entry is
//! held (and nagged about via the resend feed) until mined and matured.

use tracing::{debug, info, warn};

use crate::chain::vote::LockVote;
use crate::config::{MAX_ENTRY_VOTES, VOTE_QUORUM};
use crate::crypto::hash::Hash;

use super::error::PoolError;
use super::LockPool;

impl LockPool {
    /// Records `vote` for the entry tracking `tx_hash`.
    ///
    /// Returns `Ok(true)` exactly once per entry: on the vote that crosses
    /// the quorum and flips the entry to confirmed. Votes arriving after
    /// the per-entry cap is reached are accepted as a no-op (`Ok(false)`) —
    /// the voter did nothing wrong, the entry just needs no more votes.
    ///
    /// The caller is expected to have verified the vote's signature at the
    /// gossip boundary; the pool only enforces tally rules.
    pub fn process_vote(&self, vote: LockVote, tx_hash: &Hash) -> Result<bool, PoolError> {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(entry) = inner.entries.get_mut(tx_hash) else {
            warn!(tx = %tx_hash, vote = %vote.hash(), "vote for unknown flash transaction");
            return Err(PoolError::UnknownTransaction(*tx_hash));
        };

        let vote_hash = vote.hash();
        if entry.votes.iter().any(|v| v.hash() == vote_hash) {
            return Err(PoolError::DuplicateVote(vote_hash));
        }

        if entry.votes.len() < MAX_ENTRY_VOTES {
            inner.vote_index.insert(vote_hash, vote.clone());
            entry.votes.push(vote);
        } else {
            debug!(tx = %tx_hash, vote = %vote_hash, "vote cap reached, ignoring");
            return Ok(false);
        }

        if entry.votes.len() > VOTE_QUORUM && !entry.confirmed {
            entry.confirmed = true;
            info!(
                tx = %tx_hash,
                votes = entry.votes.len(),
                "flash transaction confirmed by vote quorum"
            );
            return Ok(true);
        }

        Ok(false)
    }
}
