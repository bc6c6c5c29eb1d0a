// Lock-pool benchmarks: admission throughput, vote tallying, conflict
// checking against a populated pool, and the maturity sweep.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parking_lot::Mutex;

use velo_lockpool::chain::utxo::{UtxoEntry, UtxoView};
use velo_lockpool::chain::vote::LockVote;
use velo_lockpool::chain::Block;
use velo_lockpool::config::ChainParams;
use velo_lockpool::crypto::hash::domain_hash;
use velo_lockpool::crypto::keys::Keypair;
use velo_lockpool::policy::RelayPolicy;
use velo_lockpool::pool::LockPool;
use velo_lockpool::validate::{ChainValidator, MempoolView, SequenceLock};
use velo_lockpool::{FlashTx, Hash, OutPoint, RuleError, Transaction, TxIn, TxKind, TxOut};

// ---------------------------------------------------------------------------
// Bench fixtures
// ---------------------------------------------------------------------------

struct BenchChain;

impl ChainValidator for BenchChain {
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
        Ok(SequenceLock::default())
    }
    fn check_inputs(
        &self,
        tx: &Transaction,
        _next_height: u64,
        view: &UtxoView,
    ) -> Result<u64, RuleError> {
        let total: u64 = tx
            .inputs
            .iter()
            .filter_map(|i| view.output(&i.previous_outpoint))
            .map(|o| o.value)
            .sum();
        Ok(total.saturating_sub(tx.total_output_value()))
    }
    fn count_sig_ops(&self, tx: &Transaction, _view: &UtxoView) -> Result<usize, RuleError> {
        Ok(tx.inputs.len())
    }
    fn validate_scripts(&self, _tx: &Transaction, _view: &UtxoView) -> Result<(), RuleError> {
        Ok(())
    }
}

#[derive(Default)]
struct BenchMempool {
    best_height: AtomicU64,
    utxos: Mutex<UtxoView>,
    known: Mutex<HashSet<Hash>>,
}

impl BenchMempool {
    fn mint(&self, value: u64) -> OutPoint {
        static SEED: AtomicU64 = AtomicU64::new(0);
        let n = SEED.fetch_add(1, Ordering::SeqCst);
        let hash = domain_hash("velo bench utxo", &n.to_le_bytes());
        let mut entry = UtxoEntry::new(10);
        entry.add_output(0, value, "Vsrc");
        self.utxos.lock().add_entry(hash, entry);
        OutPoint::new(hash, 0)
    }
}

impl MempoolView for BenchMempool {
    fn have_transaction(&self, tx: &Transaction) -> bool {
        self.known.lock().contains(&tx.hash())
    }
    fn check_pool_double_spend(&self, _tx: &Transaction) -> Result<(), RuleError> {
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
        Ok(view)
    }
    fn best_height(&self) -> u64 {
        self.best_height.load(Ordering::SeqCst)
    }
    fn past_median_time(&self) -> i64 {
        1_700_000_000
    }
}

fn setup() -> (Arc<BenchMempool>, LockPool) {
    let mempool = Arc::new(BenchMempool::default());
    mempool.best_height.store(1_000, Ordering::SeqCst);
    let pool = LockPool::new(
        Arc::new(BenchChain),
        Arc::clone(&mempool) as Arc<dyn MempoolView>,
        RelayPolicy::default(),
        ChainParams::simnet(),
    );
    (mempool, pool)
}

fn transfer(inputs: &[OutPoint]) -> FlashTx {
    FlashTx::new(Transaction {
        version: 1,
        kind: TxKind::Regular,
        lock_time: 0,
        inputs: inputs.iter().copied().map(TxIn::new).collect(),
        outputs: vec![TxOut::new(40_000_000, "Vdst")],
        flash: true,
    })
}

/// Fills the pool with `n` independent locked transfers.
fn fill(mempool: &BenchMempool, pool: &LockPool, n: usize) -> Vec<FlashTx> {
    (0..n)
        .map(|_| {
            let op = mempool.mint(50_000_000);
            let tx = transfer(&[op]);
            pool.try_admit(&tx, true, false, true).unwrap();
            tx
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_admission(c: &mut Criterion) {
    let mut group = c.benchmark_group("lockpool/admit");
    group.throughput(Throughput::Elements(1));

    for pool_size in [0usize, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(pool_size),
            &pool_size,
            |b, &pool_size| {
                let (mempool, pool) = setup();
                fill(&mempool, &pool, pool_size);
                b.iter_batched(
                    || transfer(&[mempool.mint(50_000_000)]),
                    |tx| pool.try_admit(&tx, true, false, true).unwrap(),
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

fn bench_vote_tally(c: &mut Criterion) {
    let (mempool, pool) = setup();
    let txs = fill(&mempool, &pool, 1_000);
    let keypair = Keypair::generate();
    let mut ticket_seed = 0u64;

    c.bench_function("lockpool/process_vote", |b| {
        let mut i = 0usize;
        b.iter_batched(
            || {
                // Spread votes across entries so no entry hits the cap.
                ticket_seed += 1;
                i = (i + 1) % txs.len();
                let ticket = domain_hash("velo bench ticket", &ticket_seed.to_le_bytes());
                (LockVote::new(&keypair, txs[i].hash(), ticket), txs[i].hash())
            },
            |(vote, hash)| pool.process_vote(vote, &hash).unwrap(),
            criterion::BatchSize::SmallInput,
        );
    });
}

fn bench_block_conflict_check(c: &mut Criterion) {
    let (mempool, pool) = setup();
    fill(&mempool, &pool, 10_000);

    // A clean 100-transaction block touching none of the locked outpoints.
    let block = Block {
        height: 1_001,
        transactions: (0..100)
            .map(|_| transfer(&[mempool.mint(50_000_000)]).transaction().clone())
            .collect(),
    };

    c.bench_function("lockpool/check_block_conflicts", |b| {
        b.iter(|| pool.check_block_conflicts(&block).unwrap());
    });
}

fn bench_sweep(c: &mut Criterion) {
    c.bench_function("lockpool/sweep_10k", |b| {
        b.iter_batched(
            || {
                let (mempool, pool) = setup();
                fill(&mempool, &pool, 10_000);
                pool
            },
            // Well past every add height: sweeps the whole pool.
            |pool| pool.sweep(5_000),
            criterion::BatchSize::PerIteration,
        );
    });
}

criterion_group!(
    benches,
    bench_admission,
    bench_vote_tally,
    bench_block_conflict_check,
    bench_sweep
);
criterion_main!(benches);
