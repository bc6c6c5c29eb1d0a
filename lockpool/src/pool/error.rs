//! Error taxonomy for lock-pool operations.
//!
//! Every failure is a typed [`PoolError`] returned to the caller; nothing
//! is swallowed except the two documented no-ops (votes past the per-entry
//! cap and serialization failures in the resend feed). Each error maps to
//! a wire [`RejectCode`] so the relay layer can answer peers with the
//! standard rejection taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::chain::transaction::OutPoint;
use crate::crypto::hash::Hash;

// ---------------------------------------------------------------------------
// RejectCode
// ---------------------------------------------------------------------------

/// Wire-level rejection category, mirroring the relay protocol's reject
/// message codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectCode {
    /// The transaction (or vote) is already known.
    Duplicate,
    /// The transaction violates a consensus rule.
    Invalid,
    /// The transaction is valid but violates relay policy.
    NonStandard,
    /// The fee does not meet relay requirements.
    InsufficientFee,
}

impl fmt::Display for RejectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => write!(f, "duplicate"),
            Self::Invalid => write!(f, "invalid"),
            Self::NonStandard => write!(f, "non-standard"),
            Self::InsufficientFee => write!(f, "insufficient-fee"),
        }
    }
}

// ---------------------------------------------------------------------------
// RuleError
// ---------------------------------------------------------------------------

/// A rule violation reported by a delegated validation capability
/// ([`crate::validate::ChainValidator`] or [`crate::validate::MempoolView`]).
///
/// Carries the reject code the rule maps to plus a human-readable reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {reason}")]
pub struct RuleError {
    /// Wire rejection category.
    pub code: RejectCode,
    /// Human-readable description of the violated rule.
    pub reason: String,
}

impl RuleError {
    /// Builds a rule error.
    pub fn new(code: RejectCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PoolError
// ---------------------------------------------------------------------------

/// Errors returned by lock-pool operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PoolError {
    /// The flash transaction is already tracked by the pool. Re-admitting
    /// would reset its vote state, so this is an outright rejection.
    #[error("flash transaction {0} already exists in the lock pool")]
    AlreadyExists(Hash),

    /// The transaction spends an outpoint already locked by a different,
    /// unconfirmed pool entry.
    #[error("transaction {tx} conflicts with flash transaction {locked_by} in the lock pool")]
    Conflict {
        /// The transaction that attempted the spend.
        tx: Hash,
        /// The pool entry holding the lock.
        locked_by: Hash,
    },

    /// A delegated validation rule failed; the inner error names the rule.
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The fee is below the relay minimum (surcharge included).
    #[error("transaction {tx} has {got} atoms fee, under the required {required}")]
    InsufficientFee {
        tx: Hash,
        got: u64,
        required: u64,
    },

    /// A free transaction lacks the priority to ride in the block's
    /// high-priority area.
    #[error("transaction {tx} has insufficient priority ({priority:.2} <= {min:.2})")]
    InsufficientPriority {
        tx: Hash,
        priority: f64,
        min: f64,
    },

    /// The penny-flood rate limiter rejected a free transaction.
    #[error("transaction {0} rejected by the free-relay rate limiter")]
    RateLimited(Hash),

    /// An input has not yet reached the required confirmation depth.
    #[error("input {outpoint} of {tx} has fewer than {depth} confirmations")]
    UnconfirmedInputs {
        tx: Hash,
        outpoint: OutPoint,
        depth: u64,
    },

    /// Flash transactions are not yet activated at the next block height.
    #[error("flash transactions are not active until height {activation} (next block is {next})")]
    HeightNotActivated { activation: u64, next: u64 },

    /// A vote referenced a transaction the pool is not tracking.
    #[error("flash transaction {0} is not in the lock pool")]
    UnknownTransaction(Hash),

    /// The same vote hash was already recorded for this entry.
    #[error("vote {0} already recorded")]
    DuplicateVote(Hash),

    /// A referenced input is unknown to the chain and pool overlay, or its
    /// output is already spent. Flash transactions never wait for parents,
    /// so this is a hard rejection rather than an orphan-queue entry.
    #[error("input {outpoint} of {tx} is missing or already spent")]
    MissingUtxo { tx: Hash, outpoint: OutPoint },
}

impl PoolError {
    /// The wire rejection category this error maps to.
    pub fn reject_code(&self) -> RejectCode {
        match self {
            Self::AlreadyExists(_) | Self::DuplicateVote(_) => RejectCode::Duplicate,
            Self::Conflict { .. }
            | Self::HeightNotActivated { .. }
            | Self::UnknownTransaction(_) => RejectCode::Invalid,
            Self::Rule(inner) => inner.code,
            Self::InsufficientFee { .. }
            | Self::InsufficientPriority { .. }
            | Self::RateLimited(_) => RejectCode::InsufficientFee,
            Self::UnconfirmedInputs { .. } | Self::MissingUtxo { .. } => RejectCode::NonStandard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::domain_hash;

    #[test]
    fn rule_errors_keep_their_code() {
        let err: PoolError = RuleError::new(RejectCode::NonStandard, "weird script").into();
        assert_eq!(err.reject_code(), RejectCode::NonStandard);
        assert_eq!(err.to_string(), "non-standard: weird script");
    }

    #[test]
    fn fee_errors_map_to_insufficient_fee() {
        let tx = domain_hash("t", b"tx");
        let err = PoolError::RateLimited(tx);
        assert_eq!(err.reject_code(), RejectCode::InsufficientFee);
    }

    #[test]
    fn duplicates_map_to_duplicate() {
        let h = domain_hash("t", b"x");
        assert_eq!(
            PoolError::AlreadyExists(h).reject_code(),
            RejectCode::Duplicate
        );
        assert_eq!(
            PoolError::DuplicateVote(h).reject_code(),
            RejectCode::Duplicate
        );
    }
}
