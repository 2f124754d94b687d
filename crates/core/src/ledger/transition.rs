//! Status transition engine.
//!
//! One table of (current status, event) → (next status, balance effect).
//! Transactions, teller batches, and loan disbursement all resolve their
//! transitions here instead of re-implementing the balance math.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::effect::BalanceEffect;
use super::entry::EntryStatus;
use super::error::LedgerError;

/// An event applied to every leg of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryEvent {
    /// Supervisor approval.
    Approve,
    /// Supervisor rejection.
    Reject,
    /// Caller-initiated cancellation.
    Cancel,
    /// Reversal out of the ledger (delete).
    Reverse,
}

impl fmt::Display for EntryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Reverse => "reverse",
        };
        write!(f, "{s}")
    }
}

/// The outcome of a legal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Status every leg moves to.
    pub next: EntryStatus,
    /// Balance rule applied to every leg.
    pub effect: BalanceEffect,
}

/// Resolves a transition, or fails with a state-conflict error.
///
/// # Errors
///
/// Returns `LedgerError::InvalidTransition` when the event is not legal from
/// the current status (including anything attempted from Deleted).
pub fn transition(current: EntryStatus, event: EntryEvent) -> Result<Transition, LedgerError> {
    use BalanceEffect as E;
    use EntryEvent as Ev;
    use EntryStatus as S;

    let (next, effect) = match (current, event) {
        (S::Pending, Ev::Approve) => (S::Approved, E::Finalize),
        (S::Pending, Ev::Reject) => (S::Rejected, E::ReleaseHold),
        (S::Pending, Ev::Cancel) => (S::Cancelled, E::ReleaseHold),
        (S::Pending, Ev::Reverse) => (S::Deleted, E::ReleaseHold),

        (S::Approved, Ev::Reject) => (S::Rejected, E::UnwindFinal),
        (S::Approved, Ev::Cancel) => (S::Cancelled, E::UnwindFinal),
        (S::Approved, Ev::Reverse) => (S::Deleted, E::UnwindFinal),

        // Rejected/cancelled holds are already released; deleting them is
        // bookkeeping only.
        (S::Rejected | S::Cancelled, Ev::Reverse) => (S::Deleted, E::None),

        (from, ev) => return Err(LedgerError::InvalidTransition { from, event: ev }),
    };

    Ok(Transition { next, effect })
}
