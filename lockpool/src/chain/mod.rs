//! # Chain Types
//!
//! The value types the lock pool trades in:
//!
//! ```text
//! transaction.rs — OutPoint, TxIn, TxOut, Transaction, FlashTx wrapper
//! vote.rs        — LockVote: an Ed25519-signed validator vote on a flash tx
//! block.rs       — the slice of a block the pool needs for conflict checks
//! utxo.rs        — UtxoEntry / UtxoView snapshots handed in by the mempool
//! ```
//!
//! Everything here is a plain value: no locks, no I/O, serde-serializable.
//! The pool's behavior lives in [`crate::pool`]; these types only describe
//! the data it acts on.

pub mod block;
pub mod transaction;
pub mod utxo;
pub mod vote;

pub use block::Block;
pub use transaction::{FlashTx, OutPoint, Transaction, TxIn, TxKind, TxOut};
pub use utxo::{UtxoEntry, UtxoOutput, UtxoView};
pub use vote::LockVote;
