//! The slice of a block the lock pool cares about.
//!
//! Conflict checking needs the transactions a block spends and the height
//! it connects at; headers, signatures, and merkle commitments are the
//! chain layer's problem.

use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// A connected (or about-to-connect) block, reduced to what the pool reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Height this block connects at.
    pub height: u64,
    /// Ordered transactions included in the block.
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// Builds a block at `height` from its transactions.
    pub fn new(height: u64, transactions: Vec<Transaction>) -> Self {
        Self {
            height,
            transactions,
        }
    }
}
