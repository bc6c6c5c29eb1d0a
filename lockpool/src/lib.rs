//! # velo-lockpool
//!
//! The flash-transaction lock pool for the VELO chain: vote-backed
//! pre-confirmation for transactions that cannot wait for a block.
//!
//! A wallet flags a transaction as *flash* and submits it here. The pool
//! replays the regular mempool's full acceptance rules (plus a few
//! stricter ones — mature inputs only, no orphans, a per-output
//! surcharge), locks the transaction's inputs against double spends, and
//! collects validator votes. Strictly more than
//! [`config::VOTE_QUORUM`] votes confirms the transaction: from that
//! moment its inputs are spoken for, blocks that contradict the lock are
//! refused, and the chain is expected to eventually mine it.
//!
//! ## Crate layout
//!
//! - [`pool`] — the lock pool itself: admission, votes, conflicts, expiry
//! - [`chain`] — transactions, votes, blocks, UTXO snapshots
//! - [`validate`] — the capability traits the surrounding node implements
//! - [`policy`] — relay-fee and priority policy shared with the mempool
//! - [`config`] — protocol constants and per-network parameters
//! - [`crypto`] — BLAKE3 hashing and Ed25519 vote signatures
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use velo_lockpool::config::ChainParams;
//! use velo_lockpool::policy::RelayPolicy;
//! use velo_lockpool::pool::LockPool;
//! # use velo_lockpool::validate::{ChainValidator, MempoolView};
//! # fn wire(chain: Arc<dyn ChainValidator>, mempool: Arc<dyn MempoolView>) {
//! let pool = LockPool::new(chain, mempool, RelayPolicy::default(), ChainParams::mainnet());
//! # }
//! ```
//!
//! The pool is `Send + Sync`; share it as an `Arc<LockPool>` between the
//! relay layer, the vote gossip handler, and the block connection path.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod policy;
pub mod pool;
pub mod validate;

pub use chain::{Block, FlashTx, LockVote, OutPoint, Transaction, TxIn, TxKind, TxOut};
pub use crypto::hash::Hash;
pub use pool::{LockPool, LockStatus, PoolError, RejectCode, RuleError};
pub use validate::{ChainValidator, MempoolView, SequenceLock};
