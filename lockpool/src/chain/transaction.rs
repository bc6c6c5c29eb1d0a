//! UTXO-model transactions and the flash wrapper.
//!
//! VELO transactions follow the classic outpoint model: inputs name the
//! outputs of prior transactions, outputs carry a value and a destination.
//! The transaction hash is a domain-separated BLAKE3 digest of the bincode
//! encoding, computed once and cached by [`FlashTx`] for pool-internal use.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FLASH_FEE_PER_OUTPUT;
use crate::crypto::hash::{domain_hash, Hash};

/// Domain-separation context for transaction hashes.
const TX_HASH_CONTEXT: &str = "velo-lockpool tx v1";

// ---------------------------------------------------------------------------
// OutPoint
// ---------------------------------------------------------------------------

/// A reference to a specific output of a specific prior transaction.
///
/// This is the atomic unit of spend conflict: two transactions that name
/// the same outpoint are double-spending each other, full stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    /// Hash of the transaction holding the output being spent.
    pub hash: Hash,
    /// Index of the output within that transaction.
    pub index: u32,
}

impl OutPoint {
    /// Creates an outpoint.
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// The null outpoint, only valid as the sole input of a coinbase.
    pub fn null() -> Self {
        Self {
            hash: Hash::ZERO,
            index: u32::MAX,
        }
    }

    /// True for the coinbase null outpoint.
    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.index == u32::MAX
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.index)
    }
}

// ---------------------------------------------------------------------------
// TxIn / TxOut
// ---------------------------------------------------------------------------

/// A transaction input: the outpoint it spends plus its relative-lock
/// sequence field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// The output being consumed.
    pub previous_outpoint: OutPoint,
    /// Sequence number; encodes relative lock times per BIP 68 semantics.
    pub sequence: u32,
    /// Unlocking script. Opaque to the pool — script execution is the
    /// validation engine's business.
    pub signature_script: Vec<u8>,
}

impl TxIn {
    /// Creates an input spending `previous_outpoint` with the final
    /// (no-relative-lock) sequence.
    pub fn new(previous_outpoint: OutPoint) -> Self {
        Self {
            previous_outpoint,
            sequence: u32::MAX,
            signature_script: Vec::new(),
        }
    }
}

/// A transaction output: an amount bound to a destination address.
///
/// Destinations are the address strings the script engine extracts; the
/// pool only ever compares them for equality (change detection), so an
/// opaque `String` is exactly the right amount of structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount in atoms.
    pub value: u64,
    /// Destination address.
    pub destination: String,
}

impl TxOut {
    /// Creates an output.
    pub fn new(value: u64, destination: impl Into<String>) -> Self {
        Self {
            value,
            destination: destination.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TxKind
// ---------------------------------------------------------------------------

/// Classification of a transaction under the staking rules.
///
/// Only [`TxKind::Regular`] transactions may enter the lock pool; the
/// stake kinds (ticket purchases, ticket votes, revocations) have their
/// own consensus paths and are rejected as non-standard at admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    /// A plain value transfer.
    Regular,
    /// A stake-ticket purchase.
    Ticket,
    /// A ticket vote on a block.
    TicketVote,
    /// A revocation of a missed or expired ticket.
    Revocation,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular"),
            Self::Ticket => write!(f, "ticket"),
            Self::TicketVote => write!(f, "ticket-vote"),
            Self::Revocation => write!(f, "revocation"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A VELO transaction.
///
/// The `flash` flag marks a transaction submitted for vote-backed
/// pre-confirmation. It is part of the serialized payload (and therefore
/// of the hash): a flash transaction and its non-flash twin are different
/// transactions by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Serialization/rule version.
    pub version: u16,
    /// Staking classification.
    pub kind: TxKind,
    /// Absolute lock time (block height); 0 = always final.
    pub lock_time: u32,
    /// Inputs, each consuming one prior output.
    pub inputs: Vec<TxIn>,
    /// Outputs created by this transaction.
    pub outputs: Vec<TxOut>,
    /// True when the sender requested flash (pre-confirmation) handling.
    pub flash: bool,
}

impl Transaction {
    /// Computes the transaction hash: domain-separated BLAKE3 over the
    /// bincode encoding.
    ///
    /// Prefer [`FlashTx::hash`] inside the pool — it caches this.
    pub fn hash(&self) -> Hash {
        domain_hash(TX_HASH_CONTEXT, &self.to_bytes())
    }

    /// Canonical wire bytes of the transaction.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Serializing a plain in-memory struct with derived impls cannot
        // fail; bincode only errors on I/O or depth limits.
        bincode::serialize(self).expect("transaction serialization cannot fail")
    }

    /// Serialized size in bytes, used for relay-fee and priority math.
    pub fn serialized_size(&self) -> u64 {
        bincode::serialized_size(self).expect("transaction serialization cannot fail")
    }

    /// True when this transaction is a coinbase: exactly one input spending
    /// the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].previous_outpoint.is_null()
    }

    /// Sum of all output values, saturating rather than wrapping.
    pub fn total_output_value(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |acc, out| acc.saturating_add(out.value))
    }

    /// The flash surcharge owed by this transaction, in atoms.
    ///
    /// Charged per payment output. When the wallet attached a change
    /// output (`have_change`), the last output returns funds to the sender
    /// and is not a payment, so it is excluded from the count.
    pub fn flash_surcharge(&self, have_change: bool) -> u64 {
        let payment_outputs = if have_change {
            self.outputs.len().saturating_sub(1)
        } else {
            self.outputs.len()
        };
        FLASH_FEE_PER_OUTPUT.saturating_mul(payment_outputs as u64)
    }
}

// ---------------------------------------------------------------------------
// FlashTx
// ---------------------------------------------------------------------------

/// A transaction submitted for flash handling, with its hash precomputed.
///
/// The pool stores one `Arc<FlashTx>` per entry and shares it with the
/// outpoint index, so conflict lookups resolve to the same underlying
/// object rather than a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashTx {
    tx: Transaction,
    hash: Hash,
}

impl FlashTx {
    /// Wraps a transaction, computing and caching its hash.
    pub fn new(tx: Transaction) -> Self {
        let hash = tx.hash();
        Self { tx, hash }
    }

    /// The cached transaction hash.
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// The wrapped transaction.
    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    /// Canonical wire bytes of the wrapped transaction.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.tx.to_bytes()
    }
}
