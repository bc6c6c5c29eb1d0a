//! UTXO snapshots handed to the pool by the regular mempool.
//!
//! [`UtxoView`] is a point-in-time, pool-overlaid copy of the unspent
//! outputs a transaction references. It is built by the mempool *before*
//! the lock pool takes its write lock and is consumed as plain in-memory
//! data — admission never touches the chain database directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::transaction::OutPoint;
use crate::crypto::hash::Hash;

/// One output within a [`UtxoEntry`]: its amount, where it pays to, and
/// whether something has already spent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoOutput {
    /// Amount in atoms.
    pub value: u64,
    /// Destination address, as extracted by the script engine.
    pub destination: String,
    /// True once a mined or pooled transaction consumes this output.
    pub spent: bool,
}

/// The unspent state of a single prior transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    /// Height of the block that mined the transaction; 0 when it is still
    /// unmined (known only to the mempool overlay).
    pub block_height: u64,
    outputs: HashMap<u32, UtxoOutput>,
}

impl UtxoEntry {
    /// Creates an entry for a transaction mined at `block_height`.
    pub fn new(block_height: u64) -> Self {
        Self {
            block_height,
            outputs: HashMap::new(),
        }
    }

    /// Records output `index` with its amount and destination.
    pub fn add_output(&mut self, index: u32, value: u64, destination: impl Into<String>) {
        self.outputs.insert(
            index,
            UtxoOutput {
                value,
                destination: destination.into(),
                spent: false,
            },
        );
    }

    /// Looks up output `index`, spent or not.
    pub fn output(&self, index: u32) -> Option<&UtxoOutput> {
        self.outputs.get(&index)
    }

    /// True when output `index` is spent or was never part of this entry.
    pub fn is_output_spent(&self, index: u32) -> bool {
        self.outputs.get(&index).map_or(true, |out| out.spent)
    }

    /// True once every tracked output is spent.
    pub fn is_fully_spent(&self) -> bool {
        self.outputs.values().all(|out| out.spent)
    }

    /// Marks output `index` spent. No-op for unknown indexes.
    pub fn mark_spent(&mut self, index: u32) {
        if let Some(out) = self.outputs.get_mut(&index) {
            out.spent = true;
        }
    }
}

/// A snapshot of every [`UtxoEntry`] a candidate transaction references,
/// keyed by prior-transaction hash.
#[derive(Debug, Clone, Default)]
pub struct UtxoView {
    entries: HashMap<Hash, UtxoEntry>,
}

impl UtxoView {
    /// An empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) the entry for `hash`.
    pub fn add_entry(&mut self, hash: Hash, entry: UtxoEntry) {
        self.entries.insert(hash, entry);
    }

    /// Looks up the entry for `hash`.
    pub fn entry(&self, hash: &Hash) -> Option<&UtxoEntry> {
        self.entries.get(hash)
    }

    /// Mutable lookup, for the mempool overlay marking spends.
    pub fn entry_mut(&mut self, hash: &Hash) -> Option<&mut UtxoEntry> {
        self.entries.get_mut(hash)
    }

    /// Drops the entry for `hash`. Admission uses this to strip the
    /// candidate's own entry out of the view after the duplicate check.
    pub fn remove_entry(&mut self, hash: &Hash) {
        self.entries.remove(hash);
    }

    /// Convenience lookup straight to the output an outpoint names.
    pub fn output(&self, outpoint: &OutPoint) -> Option<&UtxoOutput> {
        self.entries
            .get(&outpoint.hash)
            .and_then(|entry| entry.output(outpoint.index))
    }
}
