//! Self-Trade Prevention (STP) policy.
//!
//! STP controls what happens when an incoming order would trade against a
//! resting order recorded to the same trader.
//!
//! # Policies
//!
//! - [`StpPolicy::Allow`]: no STP checks (default, zero overhead).
//! - [`StpPolicy::CancelTaker`]: drop the overlapping incoming quantity.
//! - [`StpPolicy::CancelMaker`]: reduce the resting order by the overlap,
//!   then drop the taker.
//! - [`StpPolicy::CancelBoth`]: reduce both sides by the overlap.
//!
//! # Anonymous owners
//!
//! Orders with owner `0` (unknown) never trigger STP, regardless of policy.
//! In particular, anonymous resting orders may trade against any taker,
//! including an anonymous one.

use serde::{Deserialize, Serialize};

/// Self-Trade Prevention policy for the book.
///
/// The default is [`StpPolicy::Allow`], which disables the check entirely and
/// adds no work to the matching hot path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum StpPolicy {
    /// Trader identity is ignored; orders from the same trader match freely.
    #[default]
    Allow = 0,

    /// Drop the overlapping quantity from the incoming (taker) order. The
    /// resting order is untouched; if the taker is fully consumed by the
    /// overlap, matching stops.
    CancelTaker = 1,

    /// Reduce the resting (maker) order by the overlap, removing it when it
    /// reaches zero, then drop the taker entirely. A single submission never
    /// cancels more than one resting order of the same owner.
    CancelMaker = 2,

    /// Reduce both the taker and the maker by the overlap, removing the maker
    /// when it reaches zero. Matching continues with any remaining taker
    /// quantity.
    CancelBoth = 3,
}

impl StpPolicy {
    /// Returns `true` when STP checks are active (any policy other than
    /// [`StpPolicy::Allow`]).
    #[must_use]
    #[inline]
    pub fn is_enabled(self) -> bool {
        self != StpPolicy::Allow
    }
}

impl std::fmt::Display for StpPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StpPolicy::Allow => write!(f, "Allow"),
            StpPolicy::CancelTaker => write!(f, "CancelTaker"),
            StpPolicy::CancelMaker => write!(f, "CancelMaker"),
            StpPolicy::CancelBoth => write!(f, "CancelBoth"),
        }
    }
}
