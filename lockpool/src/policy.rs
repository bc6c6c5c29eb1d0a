//! # Relay Policy
//!
//! The fee, priority, and anti-spam knobs that decide whether a flash
//! transaction is worth relaying, plus the arithmetic behind them. These
//! mirror the regular mempool's policy exactly — a flash transaction gets
//! no fee discount for being in a hurry; it pays the normal freight plus
//! the flash surcharge.

use serde::{Deserialize, Serialize};

use crate::chain::transaction::Transaction;
use crate::chain::utxo::UtxoView;
use crate::config::{ATOMS_PER_COIN, MAX_MONEY};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Bytes of each block reserved for high-priority / free transactions.
/// Transactions under `BLOCK_PRIORITY_SIZE - 1000` bytes may ride in this
/// area without meeting the minimum fee.
pub const BLOCK_PRIORITY_SIZE: u64 = 20_000;

/// Priority threshold a free transaction must exceed to be relayed when
/// its fee is under the minimum: one coin-day of age per 250 bytes.
pub const MIN_HIGH_PRIORITY: f64 = ATOMS_PER_COIN as f64 * 144.0 / 250.0;

/// Multiplier applied to a transaction's size when computing the high-fee
/// ceiling: paying more than the minimum fee of a transaction 1000x this
/// size is assumed to be a wallet bug, not generosity.
pub const MAX_RELAY_FEE_MULTIPLIER: u64 = 1_000;

/// Serialization overhead attributed to each input when computing
/// priority, so that adding inputs does not raise a transaction's own
/// priority for free.
const PER_INPUT_OVERHEAD: u64 = 41;

/// Default minimum relay fee, in atoms per kilobyte.
pub const DEFAULT_MIN_RELAY_FEE: u64 = 10_000;

/// Default limit for free-transaction relay, in thousands of bytes per
/// ten-minute decay window.
pub const DEFAULT_FREE_TX_RELAY_LIMIT: f64 = 15.0;

/// Default cap on signature operations per transaction.
pub const DEFAULT_MAX_SIG_OPS: usize = 16;

// ---------------------------------------------------------------------------
// RelayPolicy
// ---------------------------------------------------------------------------

/// Mempool relay policy, read-only from the pool's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayPolicy {
    /// Minimum relay fee in atoms per kilobyte.
    pub min_relay_fee: u64,
    /// Free-relay budget: thousands of bytes of zero-fee transactions per
    /// decay window before the penny-flood limiter starts rejecting.
    pub free_tx_relay_limit: f64,
    /// When true, free transactions skip the priority requirement.
    pub disable_relay_priority: bool,
    /// When true, standardness checks are skipped (typically simnet only).
    pub relay_non_std: bool,
    /// Maximum signature operations per transaction.
    pub max_sig_ops: usize,
    /// Highest transaction version this node relays.
    pub max_tx_version: u16,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            min_relay_fee: DEFAULT_MIN_RELAY_FEE,
            free_tx_relay_limit: DEFAULT_FREE_TX_RELAY_LIMIT,
            disable_relay_priority: false,
            relay_non_std: false,
            max_sig_ops: DEFAULT_MAX_SIG_OPS,
            max_tx_version: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Fee / priority math
// ---------------------------------------------------------------------------

/// Minimum fee in atoms a transaction of `serialized_size` bytes must pay
/// to be relayed, at `min_relay_fee` atoms per kilobyte.
///
/// A nonzero rate never rounds down to a zero fee, and the result is
/// clamped to [`MAX_MONEY`] so oversized multiplier math cannot overflow
/// into nonsense.
pub fn min_required_relay_fee(serialized_size: u64, min_relay_fee: u64) -> u64 {
    let mut fee = serialized_size.saturating_mul(min_relay_fee) / 1000;
    if fee == 0 && min_relay_fee > 0 {
        fee = min_relay_fee;
    }
    fee.min(MAX_MONEY)
}

/// Mining priority of `tx` for the next block: the value-weighted age of
/// its inputs divided by its effective size.
///
/// Inputs that are unmined (height 0 in the view) or missing contribute
/// nothing. Per-input serialization overhead is subtracted from the size
/// so bloating a transaction with inputs does not inflate its priority.
pub fn calc_priority(tx: &Transaction, view: &UtxoView, next_height: u64) -> f64 {
    let overhead = PER_INPUT_OVERHEAD.saturating_mul(tx.inputs.len() as u64);
    let effective_size = tx.serialized_size().saturating_sub(overhead).max(1) as f64;

    let mut value_age = 0.0;
    for input in &tx.inputs {
        let outpoint = input.previous_outpoint;
        let Some(entry) = view.entry(&outpoint.hash) else {
            continue;
        };
        if entry.block_height == 0 || entry.block_height >= next_height {
            continue;
        }
        let age = next_height - entry.block_height;
        if let Some(out) = entry.output(outpoint.index) {
            value_age += out.value as f64 * age as f64;
        }
    }

    value_age / effective_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::transaction::{OutPoint, TxIn, TxKind, TxOut};
    use crate::chain::utxo::UtxoEntry;
    use crate::crypto::hash::domain_hash;

    #[test]
    fn min_fee_scales_with_size() {
        assert_eq!(min_required_relay_fee(1000, 10_000), 10_000);
        assert_eq!(min_required_relay_fee(250, 10_000), 2_500);
        assert_eq!(min_required_relay_fee(2000, 10_000), 20_000);
    }

    #[test]
    fn nonzero_rate_never_yields_zero_fee() {
        assert_eq!(min_required_relay_fee(0, 10_000), 10_000);
        assert_eq!(min_required_relay_fee(10, 1), 1);
    }

    #[test]
    fn zero_rate_means_free_relay() {
        assert_eq!(min_required_relay_fee(100_000, 0), 0);
    }

    #[test]
    fn min_fee_clamps_to_max_money() {
        assert_eq!(min_required_relay_fee(u64::MAX, u64::MAX), MAX_MONEY);
    }

    #[test]
    fn priority_rewards_old_valuable_inputs() {
        let prev = domain_hash("t", b"prev");
        let mut entry = UtxoEntry::new(100);
        entry.add_output(0, 50 * ATOMS_PER_COIN, "Vsrc");

        let mut view = UtxoView::new();
        view.add_entry(prev, entry);

        let tx = Transaction {
            version: 1,
            kind: TxKind::Regular,
            lock_time: 0,
            inputs: vec![TxIn::new(OutPoint::new(prev, 0))],
            outputs: vec![TxOut::new(50 * ATOMS_PER_COIN, "Vdst")],
            flash: true,
        };

        let young = calc_priority(&tx, &view, 101);
        let old = calc_priority(&tx, &view, 1_000);
        assert!(old > young);
        assert!(young > 0.0);
    }

    #[test]
    fn unmined_inputs_add_no_priority() {
        let prev = domain_hash("t", b"unmined prev");
        let mut entry = UtxoEntry::new(0);
        entry.add_output(0, 50 * ATOMS_PER_COIN, "Vsrc");

        let mut view = UtxoView::new();
        view.add_entry(prev, entry);

        let tx = Transaction {
            version: 1,
            kind: TxKind::Regular,
            lock_time: 0,
            inputs: vec![TxIn::new(OutPoint::new(prev, 0))],
            outputs: vec![TxOut::new(50 * ATOMS_PER_COIN, "Vdst")],
            flash: true,
        };

        assert_eq!(calc_priority(&tx, &view, 500), 0.0);
    }
}
