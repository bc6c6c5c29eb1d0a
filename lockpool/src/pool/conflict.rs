//! Double-spend detection against the pool's locked outpoints.
//!
//! Two callers, one rule. The block acceptance path asks whether a
//! candidate block contradicts any locked outpoint *before* connecting it
//! (a miner including such a transaction forfeits the block). The eviction
//! path, told that a transaction was accepted elsewhere (regular mempool
//! or a connected block), removes every pool entry it double-spent. Both
//! defer to `PoolInner::check_pool_conflicts` so they can never disagree.

use tracing::{error, warn};

use crate::chain::block::Block;
use crate::chain::transaction::Transaction;

use super::error::PoolError;
use super::LockPool;

impl LockPool {
    /// Checks every transaction in `block` against the pool's locked
    /// outpoints, before the block is connected.
    ///
    /// A mined transaction that is itself a confirmed pool entry is fine —
    /// that is the lock being honored. Anything else spending a locked
    /// outpoint is a conflict, and the first one found is returned.
    pub fn check_block_conflicts(&self, block: &Block) -> Result<(), PoolError> {
        let inner = self.inner.read();
        for tx in &block.transactions {
            if let Err(err) = inner.check_pool_conflicts(&tx.hash(), tx) {
                error!(
                    height = block.height,
                    tx = %tx.hash(),
                    error = %err,
                    "block conflicts with lock pool"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Evicts pool entries double-spent by `tx`, which has been accepted by
    /// the regular mempool or mined into a connected block.
    ///
    /// If `tx` is itself a confirmed pool entry nothing is evicted: that is
    /// the lock being honored, and expiry will sweep the entry once it
    /// matures. Any *other* locker of one of `tx`'s inputs is fully
    /// removed, confirmed or not — the input is spent out from under it,
    /// the lock can never be honored, and retaining the entry would pin its
    /// outpoints and feed the resend nag forever.
    pub fn evict_double_spends(&self, tx: &Transaction) {
        let mut inner = self.inner.write();
        let hash = tx.hash();
        if inner.contains_confirmed(&hash) {
            return;
        }

        for input in &tx.inputs {
            let victim = inner
                .locking_transaction(&input.previous_outpoint)
                .map(|locked| locked.hash());
            let Some(victim) = victim else { continue };
            inner.remove_entry(&victim);
            warn!(
                mined = %hash,
                evicted = %victim,
                outpoint = %input.previous_outpoint,
                "evicted double-spent flash transaction"
            );
        }
    }
}
