//! Shared fakes and builders for the pool's unit tests.
//!
//! `ScriptedChain` and `TestMempool` implement the validation capabilities
//! with scripted verdicts, so tests drive admission through the real
//! pipeline while controlling exactly which rule objects.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::chain::transaction::{FlashTx, OutPoint, Transaction, TxIn, TxKind, TxOut};
use crate::chain::utxo::{UtxoEntry, UtxoView};
use crate::chain::vote::LockVote;
use crate::config::ChainParams;
use crate::crypto::hash::{domain_hash, Hash};
use crate::crypto::keys::Keypair;
use crate::policy::RelayPolicy;
use crate::pool::error::{RejectCode, RuleError};
use crate::pool::LockPool;
use crate::validate::{ChainValidator, MempoolView, SequenceLock};

/// A validation engine with scripted verdicts. Fees are computed for real
/// from the UTXO view; everything else defaults to "fine" and can be
/// overridden per test.
#[derive(Default)]
pub(crate) struct ScriptedChain {
    pub sequence_lock: Mutex<SequenceLock>,
    pub sig_ops: AtomicUsize,
}

impl ChainValidator for ScriptedChain {
    fn check_sanity(&self, _tx: &Transaction) -> Result<(), RuleError> {
        Ok(())
    }

    fn check_standard(
        &self,
        _tx: &Transaction,
        _next_height: u64,
        _median_time: i64,
    ) -> Result<(), RuleError> {
        Ok(())
    }

    fn check_inputs_standard(&self, _tx: &Transaction, _view: &UtxoView) -> Result<(), RuleError> {
        Ok(())
    }

    fn calc_sequence_lock(
        &self,
        _tx: &Transaction,
        _view: &UtxoView,
    ) -> Result<SequenceLock, RuleError> {
        Ok(*self.sequence_lock.lock())
    }

    fn check_inputs(
        &self,
        tx: &Transaction,
        _next_height: u64,
        view: &UtxoView,
    ) -> Result<u64, RuleError> {
        let mut input_total = 0u64;
        for input in &tx.inputs {
            let out = view.output(&input.previous_outpoint).ok_or_else(|| {
                RuleError::new(
                    RejectCode::Invalid,
                    format!("input {} not found", input.previous_outpoint),
                )
            })?;
            input_total = input_total.saturating_add(out.value);
        }
        input_total.checked_sub(tx.total_output_value()).ok_or_else(|| {
            RuleError::new(RejectCode::Invalid, "outputs exceed inputs".to_string())
        })
    }

    fn count_sig_ops(&self, _tx: &Transaction, _view: &UtxoView) -> Result<usize, RuleError> {
        Ok(self.sig_ops.load(Ordering::SeqCst))
    }

    fn validate_scripts(&self, _tx: &Transaction, _view: &UtxoView) -> Result<(), RuleError> {
        Ok(())
    }
}

/// A regular-mempool stand-in backed by plain maps.
#[derive(Default)]
pub(crate) struct TestMempool {
    best_height: AtomicU64,
    median_time: AtomicI64,
    pub utxos: Mutex<UtxoView>,
    pub known: Mutex<HashSet<Hash>>,
    pub pool_spends: Mutex<HashSet<OutPoint>>,
}

impl TestMempool {
    pub fn set_best_height(&self, height: u64) {
        self.best_height.store(height, Ordering::SeqCst);
    }

    /// Full clone of the backing UTXO set, for test assertions.
    pub fn fetch_view(&self) -> UtxoView {
        self.utxos.lock().clone()
    }
}

impl MempoolView for TestMempool {
    fn have_transaction(&self, tx: &Transaction) -> bool {
        self.known.lock().contains(&tx.hash())
    }

    fn check_pool_double_spend(&self, tx: &Transaction) -> Result<(), RuleError> {
        let spends = self.pool_spends.lock();
        for input in &tx.inputs {
            if spends.contains(&input.previous_outpoint) {
                return Err(RuleError::new(
                    RejectCode::NonStandard,
                    format!("output {} already spent in the pool", input.previous_outpoint),
                ));
            }
        }
        Ok(())
    }

    fn fetch_input_utxos(&self, tx: &Transaction) -> Result<UtxoView, RuleError> {
        let utxos = self.utxos.lock();
        let mut view = UtxoView::new();
        for input in &tx.inputs {
            if let Some(entry) = utxos.entry(&input.previous_outpoint.hash) {
                view.add_entry(input.previous_outpoint.hash, entry.clone());
            }
        }
        let own = tx.hash();
        if let Some(entry) = utxos.entry(&own) {
            view.add_entry(own, entry.clone());
        }
        Ok(view)
    }

    fn best_height(&self) -> u64 {
        self.best_height.load(Ordering::SeqCst)
    }

    fn past_median_time(&self) -> i64 {
        self.median_time.load(Ordering::SeqCst)
    }
}

/// Everything a pool unit test needs, pre-wired.
pub(crate) struct Harness {
    pub chain: Arc<ScriptedChain>,
    pub mempool: Arc<TestMempool>,
    pub pool: LockPool,
    now: Arc<AtomicI64>,
}

impl Harness {
    /// Advances the pool's injected clock, for rate-limiter decay tests.
    pub fn advance_clock(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

/// Default harness: simnet params (flash active from genesis), default
/// relay policy, best height 100 so height-1 UTXOs are long mature.
pub(crate) fn harness() -> Harness {
    harness_with(RelayPolicy::default(), ChainParams::simnet())
}

pub(crate) fn harness_with(policy: RelayPolicy, params: ChainParams) -> Harness {
    let chain = Arc::new(ScriptedChain::default());
    let mempool = Arc::new(TestMempool::default());
    mempool.set_best_height(100);
    mempool.median_time.store(1_700_000_000, Ordering::SeqCst);

    let now = Arc::new(AtomicI64::new(1_700_000_000));
    let clock_now = Arc::clone(&now);
    let pool = LockPool::with_clock(
        Arc::clone(&chain) as Arc<dyn ChainValidator>,
        Arc::clone(&mempool) as Arc<dyn MempoolView>,
        policy,
        params,
        move || clock_now.load(Ordering::SeqCst),
    );

    Harness {
        chain,
        mempool,
        pool,
        now,
    }
}

/// Mints a spendable UTXO at `height` and returns its outpoint.
pub(crate) fn make_utxo(
    mempool: &TestMempool,
    value: u64,
    height: u64,
    destination: &str,
) -> OutPoint {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let hash = domain_hash("velo-lockpool testutil utxo", &n.to_le_bytes());

    let mut entry = UtxoEntry::new(height);
    entry.add_output(0, value, destination);
    mempool.utxos.lock().add_entry(hash, entry);
    OutPoint::new(hash, 0)
}

/// A regular flash transaction spending `inputs` into `(value, dest)` outputs.
pub(crate) fn spend(inputs: &[OutPoint], outputs: &[(u64, &str)]) -> FlashTx {
    flash_tx(
        inputs.iter().copied().map(TxIn::new).collect(),
        outputs
            .iter()
            .map(|(value, dest)| TxOut::new(*value, *dest))
            .collect(),
    )
}

pub(crate) fn flash_tx(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> FlashTx {
    FlashTx::new(Transaction {
        version: 1,
        kind: TxKind::Regular,
        lock_time: 0,
        inputs,
        outputs,
        flash: true,
    })
}

/// A verifiable vote for `tx_hash` from a fresh validator with a fresh
/// ticket, so every call yields a distinct, countable vote.
pub(crate) fn vote_for(tx_hash: Hash) -> LockVote {
    static TICKET: AtomicU64 = AtomicU64::new(0);
    let n = TICKET.fetch_add(1, Ordering::SeqCst);
    let ticket_hash = domain_hash("velo-lockpool testutil ticket", &n.to_le_bytes());
    LockVote::new(&Keypair::generate(), tx_hash, ticket_hash)
}

/// Marks an admitted entry confirmed without pushing a full quorum of votes.
pub(crate) fn confirm(h: &Harness, hash: Hash) {
    let mut inner = h.pool.inner.write();
    let entry = inner.entries.get_mut(&hash).expect("entry must be admitted");
    entry.confirmed = true;
}
