//! # The Flash-Transaction Lock Pool
//!
//! A flash transaction asks the network for finality *before* it is mined:
//! it is admitted here under full mempool-grade validation, its inputs are
//! locked against double spends, and validators vote on it. Strictly more
//! than [`VOTE_QUORUM`](crate::config::VOTE_QUORUM) votes confirms it;
//! mining and maturity eventually sweep it back out.
//!
//! ## Architecture
//!
//! ```text
//! mod.rs       — LockPool handle, the inner state it guards
//! store.rs     — the three synchronized indexes and the read surface
//! admission.rs — mempool-rule replay deciding who gets in
//! votes.rs     — vote tallying and the quorum flip
//! conflict.rs  — double-spend detection and eviction
//! expiry.rs    — height-driven garbage collection and the resend feed
//! error.rs     — the typed rejection taxonomy
//! ```
//!
//! ## Locking discipline
//!
//! One `parking_lot::RwLock` guards everything: the entry map, both
//! derived indexes, and the rate-limiter accumulator. Every public
//! operation takes the lock once for its whole duration, so an admission
//! and a vote for the same hash can never interleave halfway. Nothing
//! blocks while holding the lock — the validation capabilities are
//! documented as fast, in-memory calls, and the UTXO snapshot is built by
//! the mempool before we ever look at it.
//!
//! Removal is atomic across all three indexes: owning map first, derived
//! indexes in the same critical section. There is no such thing as a
//! partially-removed entry.

pub mod admission;
pub mod conflict;
pub mod error;
pub mod expiry;
pub mod store;
pub mod votes;

#[cfg(test)]
pub(crate) mod testutil;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

use crate::chain::transaction::{FlashTx, OutPoint};
use crate::chain::vote::LockVote;
use crate::config::ChainParams;
use crate::crypto::hash::Hash;
use crate::policy::RelayPolicy;
use crate::validate::{ChainValidator, MempoolView};

pub use error::{PoolError, RejectCode, RuleError};
pub use store::LockStatus;

/// A tracked flash transaction and its pool metadata.
///
/// `tx` is shared with the outpoint index via `Arc`, so a conflict lookup
/// resolves to the same object the entry owns rather than a copy.
#[derive(Debug, Clone)]
pub(crate) struct LockPoolEntry {
    /// The flash transaction itself.
    pub tx: Arc<FlashTx>,
    /// Best height when the entry was admitted.
    pub add_height: u64,
    /// Height the transaction was mined at; 0 until it appears in a
    /// connected block, set at most once.
    pub mine_height: u64,
    /// Validator votes received, capped at `MAX_ENTRY_VOTES`, no two with
    /// the same vote hash.
    pub votes: Vec<LockVote>,
    /// Flips to true exactly once, when the vote quorum is crossed.
    pub confirmed: bool,
}

/// Everything the pool lock guards.
pub(crate) struct PoolInner {
    /// Owning index: flash-transaction hash → entry.
    pub entries: HashMap<Hash, LockPoolEntry>,
    /// Derived index: locked outpoint → the transaction locking it.
    pub lock_outpoints: HashMap<OutPoint, Arc<FlashTx>>,
    /// Derived index: vote hash → vote, for gossip enumeration.
    pub vote_index: HashMap<Hash, LockVote>,
    /// Penny-flood accumulator: decayed bytes of free transactions relayed.
    pub penny_total: f64,
    /// Unix time of the last accumulator update.
    pub last_penny_unix: i64,
}

impl PoolInner {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lock_outpoints: HashMap::new(),
            vote_index: HashMap::new(),
            penny_total: 0.0,
            last_penny_unix: 0,
        }
    }
}

/// Clock used by the rate limiter; injectable so decay is testable.
type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// The lock pool: admission, voting, conflict eviction, and expiry for
/// flash transactions.
///
/// Share it as an `Arc<LockPool>`; every method takes `&self` and handles
/// its own locking.
pub struct LockPool {
    pub(crate) inner: RwLock<PoolInner>,
    pub(crate) chain: Arc<dyn ChainValidator>,
    pub(crate) mempool: Arc<dyn MempoolView>,
    pub(crate) policy: RelayPolicy,
    pub(crate) params: ChainParams,
    pub(crate) clock: Clock,
}

impl LockPool {
    /// Creates a pool wired to the node's validation engine and regular
    /// mempool, using the system clock for rate-limit decay.
    pub fn new(
        chain: Arc<dyn ChainValidator>,
        mempool: Arc<dyn MempoolView>,
        policy: RelayPolicy,
        params: ChainParams,
    ) -> Self {
        Self::with_clock(chain, mempool, policy, params, system_unix_time)
    }

    /// Like [`LockPool::new`] with an explicit clock. Tests use this to
    /// step the rate limiter's decay window without sleeping.
    pub fn with_clock(
        chain: Arc<dyn ChainValidator>,
        mempool: Arc<dyn MempoolView>,
        policy: RelayPolicy,
        params: ChainParams,
        clock: impl Fn() -> i64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner: RwLock::new(PoolInner::new()),
            chain,
            mempool,
            policy,
            params,
            clock: Box::new(clock),
        }
    }
}

/// Seconds since the unix epoch.
fn system_unix_time() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs() as i64
}
