//! # Protocol Constants & Chain Parameters
//!
//! Every magic number the lock pool depends on lives here. If you're
//! hardcoding a constant somewhere else, you're doing it wrong and you owe
//! the team coffee.
//!
//! These values define consensus-visible behavior. Changing them after a
//! network has launched is somewhere between "difficult" and
//! "career-ending", so choose wisely during devnet.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lock-pool lifecycle
// ---------------------------------------------------------------------------

/// Number of blocks an input must be buried under before a flash
/// transaction may spend it, and the depth at which mined or stale pool
/// entries become prunable. Six blocks is the classic "final enough"
/// threshold on a UTXO chain.
pub const CONFIRM_DEPTH: u64 = 6;

/// Default look-back window for the resend feed: confirmed-but-unmined
/// entries older than this many blocks are handed back to the wallet for
/// rebroadcast.
pub const RESEND_BEHIND_WINDOW: u64 = 10;

/// A flash transaction is confirmed once it holds strictly more than this
/// many distinct validator votes.
pub const VOTE_QUORUM: usize = 2;

/// Hard cap on stored votes per pool entry. Votes past the cap are
/// accepted and discarded — quorum was long since reached, and unbounded
/// vote lists are a memory grief vector.
pub const MAX_ENTRY_VOTES: usize = 5;

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Number of atoms (smallest unit) per VELO coin.
pub const ATOMS_PER_COIN: u64 = 100_000_000;

/// Maximum total supply in atoms. Relay fee math saturates here.
pub const MAX_MONEY: u64 = 21_000_000 * ATOMS_PER_COIN;

/// Flash surcharge per payment output, in atoms. A flash transaction pays
/// this on top of the normal relay fee for every output that is not its
/// own change — validators do extra work per locked payment, and the fee
/// table reflects that.
pub const FLASH_FEE_PER_OUTPUT: u64 = 10_000;

// ---------------------------------------------------------------------------
// Chain parameters
// ---------------------------------------------------------------------------

/// Per-network parameters consumed by the lock pool.
///
/// Read-only after construction; the pool never mutates chain parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainParams {
    /// Human-readable network name ("mainnet", "testnet", "simnet").
    pub name: String,

    /// Height at which flash transactions activate. Below this height the
    /// pool rejects every flash admission outright, fee or no fee.
    pub flash_activation_height: u64,
}

impl ChainParams {
    /// Mainnet parameters.
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            flash_activation_height: 150_000,
        }
    }

    /// Simnet parameters: flash transactions active from genesis, which is
    /// what every test wants.
    pub fn simnet() -> Self {
        Self {
            name: "simnet".to_string(),
            flash_activation_height: 0,
        }
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}
