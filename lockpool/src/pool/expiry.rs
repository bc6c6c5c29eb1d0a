//! Height-driven lifecycle: mined-height tracking, the maturity sweep, and
//! the stale-resend feed.
//!
//! An entry leaves the pool one of three ways: evicted as a double spend
//! (see `conflict`), swept after its mined copy matures `CONFIRM_DEPTH`
//! blocks, or swept as abandoned — unconfirmed, unmined, and older than
//! the maturity window. Confirmed-but-unmined entries are deliberately
//! exempt from the sweep: their locks are held until the chain includes
//! them, and the resend feed nags miners about them instead.

use tracing::{debug, warn};

use crate::config::{CONFIRM_DEPTH, RESEND_BEHIND_WINDOW};
use crate::crypto::hash::Hash;

use super::LockPool;

impl LockPool {
    /// Records that the entry for `hash` was mined at `height`. No-op for
    /// untracked hashes; the entry stays pooled until the sweep matures it
    /// out.
    pub fn update_mined_height(&self, hash: &Hash, height: u64) {
        let mut inner = self.inner.write();
        if let Some(entry) = inner.entries.get_mut(hash) {
            entry.mine_height = height;
            debug!(tx = %hash, height, "flash transaction mined");
        }
    }

    /// Sweeps out entries whose purpose is served, given the new best
    /// `height`: mined entries buried `CONFIRM_DEPTH` blocks deep, and
    /// abandoned entries (never confirmed, never mined) older than the
    /// same window. Called on every block connection.
    pub fn sweep(&self, height: u64) {
        let cutoff = height.saturating_sub(CONFIRM_DEPTH);
        let mut inner = self.inner.write();

        let expired: Vec<Hash> = inner
            .entries
            .iter()
            .filter(|(_, entry)| {
                let matured = entry.mine_height != 0 && entry.mine_height < cutoff;
                let abandoned =
                    !entry.confirmed && entry.mine_height == 0 && entry.add_height < cutoff;
                matured || abandoned
            })
            .map(|(hash, _)| *hash)
            .collect();

        for hash in &expired {
            inner.remove_entry(hash);
        }
        if !expired.is_empty() {
            debug!(height, swept = expired.len(), "lock pool sweep");
        }
    }

    /// Confirmed entries the chain has ignored for too long, serialized for
    /// re-broadcast to miners.
    ///
    /// `behind` is how many blocks an entry must lag before it is nagged
    /// about; 0 selects the default window. Entries that fail to serialize
    /// are skipped with a warning — a best-effort feed must not fail
    /// wholesale over one bad entry.
    pub fn pending_resend(&self, behind: u64) -> Vec<Vec<u8>> {
        let behind = if behind == 0 {
            RESEND_BEHIND_WINDOW
        } else {
            behind
        };
        let min_expect = self.mempool.best_height().saturating_sub(behind);

        let inner = self.inner.read();
        inner
            .entries
            .iter()
            .filter(|(_, entry)| {
                entry.confirmed && entry.mine_height == 0 && entry.add_height < min_expect
            })
            .filter_map(|(hash, entry)| {
                match bincode::serialize(entry.tx.transaction()) {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        warn!(tx = %hash, error = %err, "skipping unserializable resend entry");
                        None
                    }
                }
            })
            .collect()
    }
}
