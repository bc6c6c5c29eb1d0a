//! # Validation Capabilities
//!
//! The lock pool replays most of full-block validation for a transaction
//! that has not been mined yet, but it does not own a script engine, a
//! chain database, or the regular mempool. Those live in the surrounding
//! node and are injected here as two capability traits:
//!
//! - [`ChainValidator`] — consensus-rule verdicts: sanity, standardness,
//!   input/value checking, sequence locks, sigop counting, script
//!   execution.
//! - [`MempoolView`] — the regular mempool's view of the world: duplicate
//!   detection, intra-pool double-spend checks, pool-overlaid UTXO
//!   snapshots, and the current chain tip.
//!
//! Keeping these behind traits is what makes the pool testable: unit tests
//! inject fakes with scripted verdicts and never touch a real chain.
//!
//! Implementations must be fast and in-memory. Admission holds the pool's
//! write lock across every call in this module; anything that blocks on
//! I/O here stalls votes, eviction, and expiry with it.

use crate::chain::transaction::Transaction;
use crate::chain::utxo::UtxoView;
use crate::pool::error::RuleError;

/// The point from which a transaction's relative lock times are satisfied.
///
/// A transaction may be included in a block once the next block's height
/// exceeds `min_height` and the chain's past median time exceeds
/// `min_time`. A value of -1 means "no constraint", so a default
/// `SequenceLock` is active everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceLock {
    /// Minimum block height (exclusive); -1 when unconstrained.
    pub min_height: i64,
    /// Minimum past-median timestamp (exclusive); -1 when unconstrained.
    pub min_time: i64,
}

impl SequenceLock {
    /// True when the lock is satisfied for a block at `next_height` whose
    /// chain has past median time `median_time`.
    pub fn active(&self, next_height: u64, median_time: i64) -> bool {
        self.min_height < next_height as i64 && self.min_time < median_time
    }
}

impl Default for SequenceLock {
    fn default() -> Self {
        Self {
            min_height: -1,
            min_time: -1,
        }
    }
}

/// Consensus and policy verdicts delegated to the node's validation engine.
///
/// Every method returns a [`RuleError`] carrying the reject code the
/// violated rule maps to; the pool propagates these verbatim.
pub trait ChainValidator: Send + Sync {
    /// Context-free structural sanity: value ranges, input/output counts,
    /// no duplicate inputs within the transaction.
    fn check_sanity(&self, tx: &Transaction) -> Result<(), RuleError>;

    /// Standardness for relay at `next_height`: version caps, size caps,
    /// dust outputs. Skipped when policy relays non-standard transactions.
    fn check_standard(
        &self,
        tx: &Transaction,
        next_height: u64,
        median_time: i64,
    ) -> Result<(), RuleError>;

    /// Standardness of each input's unlocking data against the outputs it
    /// spends. Skipped when policy relays non-standard transactions.
    fn check_inputs_standard(&self, tx: &Transaction, view: &UtxoView) -> Result<(), RuleError>;

    /// Computes the relative-lock constraints for `tx` against `view`.
    fn calc_sequence_lock(&self, tx: &Transaction, view: &UtxoView)
        -> Result<SequenceLock, RuleError>;

    /// Full input validation: every input exists and is unspent in `view`,
    /// values balance, maturity rules hold. Returns the transaction fee in
    /// atoms (inputs minus outputs).
    fn check_inputs(
        &self,
        tx: &Transaction,
        next_height: u64,
        view: &UtxoView,
    ) -> Result<u64, RuleError>;

    /// Counts signature operations, including those hidden behind
    /// pay-to-script-hash outputs in `view`.
    fn count_sig_ops(&self, tx: &Transaction, view: &UtxoView) -> Result<usize, RuleError>;

    /// Executes and verifies every input script. The expensive one; always
    /// called last.
    fn validate_scripts(&self, tx: &Transaction, view: &UtxoView) -> Result<(), RuleError>;
}

/// The regular mempool's read surface, consumed during admission.
pub trait MempoolView: Send + Sync {
    /// True when the regular pool (including its orphan set) already
    /// tracks `tx`'s hash.
    fn have_transaction(&self, tx: &Transaction) -> bool;

    /// Rejects `tx` if it double-spends an outpoint claimed by another
    /// regular-pool transaction.
    fn check_pool_double_spend(&self, tx: &Transaction) -> Result<(), RuleError>;

    /// Builds a pool-overlaid snapshot of every UTXO entry `tx`
    /// references, including `tx`'s own entry when the chain knows it.
    fn fetch_input_utxos(&self, tx: &Transaction) -> Result<UtxoView, RuleError>;

    /// Height of the current best block.
    fn best_height(&self) -> u64;

    /// Past median time of the current best chain, as a unix timestamp.
    fn past_median_time(&self) -> i64;
}
