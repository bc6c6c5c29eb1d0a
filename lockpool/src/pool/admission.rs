//! Admission: deciding whether a flash transaction may lock its inputs.
//!
//! Admission replays the regular mempool's acceptance rules — duplicate
//! weeding, sanity, standardness, double-spend checks, UTXO existence,
//! sequence locks, fee, priority, and rate-limit policy, then script
//! verification — with three deliberate differences:
//!
//! 1. **No orphans.** A regular transaction with missing parents waits in
//!    the orphan pool; a flash transaction is rejected outright. Finality
//!    cannot be promised for a transaction whose parents may never arrive.
//! 2. **Input maturity.** Every referenced input must already be buried
//!    `CONFIRM_DEPTH` blocks deep. Flash locks on top of fresh, reorgable
//!    outputs would be finality theater.
//! 3. **Surcharge.** On top of the normal relay minimum, a flash
//!    transaction owes the per-payment-output surcharge — and if the
//!    activation height hasn't been reached, it is rejected no matter how
//!    generous the fee.
//!
//! The whole pipeline runs under one write-lock acquisition. Checks are
//! read-modify-write against pool state (conflicts, the penny-flood
//! accumulator), so splitting the lock would race against concurrent
//! admissions. Any rejection leaves the pool byte-for-byte unchanged.

use std::sync::Arc;

use tracing::{debug, error, trace};

use crate::chain::transaction::{FlashTx, Transaction, TxKind};
use crate::chain::utxo::UtxoView;
use crate::config::{ChainParams, CONFIRM_DEPTH, MAX_ENTRY_VOTES};
use crate::crypto::hash::Hash;
use crate::policy::{
    calc_priority, min_required_relay_fee, BLOCK_PRIORITY_SIZE, MAX_RELAY_FEE_MULTIPLIER,
    MIN_HIGH_PRIORITY,
};

use super::error::{PoolError, RejectCode, RuleError};
use super::{LockPool, LockPoolEntry, PoolInner};

impl LockPool {
    /// Attempts to admit `flash` into the lock pool.
    ///
    /// * `is_new` — false for transactions re-entering after a reorg;
    ///   those skip the free-relay priority requirement.
    /// * `rate_limit` — apply the penny-flood limiter to free
    ///   transactions.
    /// * `allow_high_fees` — skip the fat-finger fee ceiling.
    ///
    /// On success the transaction's inputs are locked and the entry starts
    /// collecting votes. On failure the pool is unchanged and the error
    /// says exactly which rule objected.
    pub fn try_admit(
        &self,
        flash: &FlashTx,
        is_new: bool,
        rate_limit: bool,
        allow_high_fees: bool,
    ) -> Result<(), PoolError> {
        let mut inner = self.inner.write();
        let result = self.admit(&mut inner, flash, is_new, rate_limit, allow_high_fees);
        if let Err(err) = &result {
            error!(tx = %flash.hash(), error = %err, "flash transaction rejected");
        }
        result
    }

    fn admit(
        &self,
        inner: &mut PoolInner,
        flash: &FlashTx,
        is_new: bool,
        rate_limit: bool,
        allow_high_fees: bool,
    ) -> Result<(), PoolError> {
        let hash = flash.hash();
        let tx = flash.transaction();

        // Re-admission would reset vote state, so an existing entry is a
        // hard duplicate no matter what changed around it.
        if inner.contains(&hash) {
            return Err(PoolError::AlreadyExists(hash));
        }

        // Conflicts against outpoints the pool already locked.
        inner.check_pool_conflicts(&hash, tx)?;

        // The full regular-mempool rule replay.
        self.check_with_mempool(inner, &hash, tx, is_new, rate_limit, allow_high_fees)?;

        let best_height = self.mempool.best_height();
        inner.insert_entry(LockPoolEntry {
            tx: Arc::new(flash.clone()),
            add_height: best_height,
            mine_height: 0,
            votes: Vec::with_capacity(MAX_ENTRY_VOTES),
            confirmed: false,
        });

        debug!(tx = %hash, height = best_height, "flash transaction admitted to lock pool");
        Ok(())
    }

    /// The regular-mempool rule replay: every check the regular pool would
    /// run, in the same order, with the flash divergences noted in the
    /// module docs.
    fn check_with_mempool(
        &self,
        inner: &mut PoolInner,
        hash: &Hash,
        tx: &Transaction,
        is_new: bool,
        rate_limit: bool,
        allow_high_fees: bool,
    ) -> Result<(), PoolError> {
        // Quick duplicate weed-out against the regular pool (orphans
        // included).
        if self.mempool.have_transaction(tx) {
            return Err(RuleError::new(
                RejectCode::Duplicate,
                format!("already have transaction {hash}"),
            )
            .into());
        }

        // Context-free consensus sanity.
        self.chain.check_sanity(tx)?;

        // A standalone transaction must not be a coinbase.
        if tx.is_coinbase() {
            return Err(RuleError::new(
                RejectCode::Invalid,
                format!("transaction {hash} is an individual coinbase"),
            )
            .into());
        }

        // Only transactions that asked for flash handling belong here.
        if !tx.flash {
            return Err(RuleError::new(
                RejectCode::NonStandard,
                format!("transaction {hash} is not flagged for flash handling"),
            )
            .into());
        }

        // Stake transactions have their own consensus path; a flash
        // transaction must classify as regular.
        if tx.kind != TxKind::Regular {
            return Err(RuleError::new(
                RejectCode::NonStandard,
                format!("flash transaction must be regular, classified as {}", tx.kind),
            )
            .into());
        }

        // A standalone transaction is mined into the next block at best.
        let best_height = self.mempool.best_height();
        let next_height = best_height + 1;
        let median_time = self.mempool.past_median_time();

        if !self.policy.relay_non_std {
            self.chain.check_standard(tx, next_height, median_time)?;
        }

        // Double spends within the regular pool. Quick check; the chain
        // view is consulted below.
        self.mempool.check_pool_double_spend(tx)?;

        // Pool-overlaid snapshot of every referenced UTXO entry, plus the
        // transaction's own entry when the chain knows it.
        let mut view = self.mempool.fetch_input_utxos(tx)?;

        // Already mined and not fully spent means a true duplicate.
        if let Some(entry) = view.entry(hash) {
            if !entry.is_fully_spent() {
                return Err(RuleError::new(
                    RejectCode::Duplicate,
                    format!("transaction {hash} already exists in the main chain"),
                )
                .into());
            }
        }
        view.remove_entry(hash);

        // Inputs must exist, be unspent, and be buried deep enough.
        // Missing parents are a hard rejection — flash transactions never
        // wait in an orphan pool.
        self.check_input_maturity(hash, tx, &view, best_height)?;

        // Relative lock times must already permit next-block inclusion.
        let seq_lock = self.chain.calc_sequence_lock(tx, &view)?;
        if !seq_lock.active(next_height, median_time) {
            return Err(RuleError::new(
                RejectCode::NonStandard,
                "transaction sequence locks on inputs not met",
            )
            .into());
        }

        // Full input validation; yields the fee this transaction pays.
        let fee = self.chain.check_inputs(tx, next_height, &view)?;

        if !self.policy.relay_non_std {
            self.chain.check_inputs_standard(tx, &view)?;
        }

        // Sigop ceiling: a transaction that costs too much to verify never
        // makes it into a block, so don't relay it either.
        let sig_ops = self.chain.count_sig_ops(tx, &view)?;
        if sig_ops > self.policy.max_sig_ops {
            return Err(RuleError::new(
                RejectCode::NonStandard,
                format!(
                    "transaction {hash} has too many sigops: {sig_ops} > {}",
                    self.policy.max_sig_ops
                ),
            )
            .into());
        }

        let serialized_size = tx.serialized_size();
        let have_change = have_change(tx, &view);

        let relay_min = min_required_relay_fee(serialized_size, self.policy.min_relay_fee);
        let min_fee = relay_min.saturating_add(self.surcharge(tx, have_change, next_height)?);

        // Transactions small enough for the block's high-priority area may
        // ride free; everything else meets the minimum.
        if serialized_size >= BLOCK_PRIORITY_SIZE - 1000 && fee < min_fee {
            return Err(PoolError::InsufficientFee {
                tx: *hash,
                got: fee,
                required: min_fee,
            });
        }

        // Free transactions must earn their slot through input age.
        // Transactions re-accepted after a reorg are exempt.
        if is_new && !self.policy.disable_relay_priority && fee < min_fee {
            let priority = calc_priority(tx, &view, next_height);
            if priority <= MIN_HIGH_PRIORITY {
                return Err(PoolError::InsufficientPriority {
                    tx: *hash,
                    priority,
                    min: MIN_HIGH_PRIORITY,
                });
            }
        }

        // Penny-flood limiter: free relay is a budget, not a right. The
        // accumulator decays over a ~10-minute window.
        if rate_limit && fee < min_fee {
            let now = (self.clock)();
            let elapsed = (now - inner.last_penny_unix).max(0);
            inner.penny_total *= (1.0_f64 - 1.0 / 600.0).powf(elapsed as f64);
            inner.last_penny_unix = now;

            let limit = self.policy.free_tx_relay_limit * 10.0 * 1000.0;
            if inner.penny_total >= limit {
                return Err(PoolError::RateLimited(*hash));
            }
            let old_total = inner.penny_total;
            inner.penny_total += serialized_size as f64;
            trace!(
                cur_total = old_total,
                next_total = inner.penny_total,
                limit,
                "free-relay rate limit"
            );
        }

        // Fat-finger guard: a fee wildly above the minimum is assumed to
        // be a wallet bug unless the submitter explicitly opted out.
        if !allow_high_fees {
            let ceiling = min_required_relay_fee(
                serialized_size.saturating_mul(MAX_RELAY_FEE_MULTIPLIER),
                self.policy.min_relay_fee,
            )
            .saturating_add(self.surcharge(tx, have_change, next_height)?);
            if fee > ceiling {
                return Err(RuleError::new(
                    RejectCode::Invalid,
                    format!("transaction {hash} pays {fee} atoms, above the high-fee ceiling {ceiling}"),
                )
                .into());
            }
        }

        // Scripts last: signature verification is the expensive part, so
        // every cheap rejection above runs first.
        self.chain.validate_scripts(tx, &view)?;

        Ok(())
    }

    fn check_input_maturity(
        &self,
        hash: &Hash,
        tx: &Transaction,
        view: &UtxoView,
        best_height: u64,
    ) -> Result<(), PoolError> {
        let mut missing = Vec::new();
        for input in &tx.inputs {
            let outpoint = input.previous_outpoint;
            match view.entry(&outpoint.hash) {
                Some(entry) => {
                    // Height 0 marks an unmined (mempool-overlay) parent;
                    // either way the input lacks the required burial depth.
                    if entry.block_height == 0
                        || entry.block_height > best_height.saturating_sub(CONFIRM_DEPTH)
                    {
                        return Err(PoolError::UnconfirmedInputs {
                            tx: *hash,
                            outpoint,
                            depth: CONFIRM_DEPTH,
                        });
                    }
                    if entry.is_output_spent(outpoint.index) {
                        debug!(tx = %hash, input = %outpoint, "flash transaction spends a spent output");
                        missing.push(outpoint);
                    }
                }
                None => {
                    debug!(tx = %hash, input = %outpoint, "flash transaction references unknown input");
                    missing.push(outpoint);
                }
            }
        }

        match missing.first() {
            Some(outpoint) => Err(PoolError::MissingUtxo {
                tx: *hash,
                outpoint: *outpoint,
            }),
            None => Ok(()),
        }
    }

    /// The flash surcharge, or [`PoolError::HeightNotActivated`] when the
    /// next block is still below the activation height. The gate applies
    /// unconditionally: before activation no fee buys flash handling.
    fn surcharge(
        &self,
        tx: &Transaction,
        have_change: bool,
        next_height: u64,
    ) -> Result<u64, PoolError> {
        let ChainParams {
            flash_activation_height,
            ..
        } = self.params;
        if next_height < flash_activation_height {
            return Err(PoolError::HeightNotActivated {
                activation: flash_activation_height,
                next: next_height,
            });
        }
        Ok(tx.flash_surcharge(have_change))
    }
}

/// Change detection: a transaction "has change" when its last output pays
/// back to an address that funded one of its inputs. Wallets append change
/// last by convention, and the surcharge should not bill the sender for
/// paying themselves.
fn have_change(tx: &Transaction, view: &UtxoView) -> bool {
    if tx.outputs.len() <= 1 {
        return false;
    }
    let Some(last) = tx.outputs.last() else {
        return false;
    };
    tx.inputs.iter().any(|input| {
        view.output(&input.previous_outpoint)
            .is_some_and(|out| out.destination == last.destination)
    })
}
