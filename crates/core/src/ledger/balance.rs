//! Member account balance model.
//!
//! A member account stores five monetary fields; the available balance is
//! always derived from them and recomputed in the same write as any field
//! that changed:
//!
//! ```text
//! available = clear + unsupervised_credits - unsupervised_debits
//!           - frozen_amount - pending_charges
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The stored balance fields of a member account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalances {
    /// Settled, approved funds.
    pub clear: Decimal,
    /// Pending incoming amounts (credits awaiting approval).
    pub unsupervised_credits: Decimal,
    /// Pending outgoing amounts (debits awaiting approval).
    pub unsupervised_debits: Decimal,
    /// Funds frozen by administrative action.
    pub frozen_amount: Decimal,
    /// Charges assessed but not yet collected.
    pub pending_charges: Decimal,
}

impl MemberBalances {
    /// Returns the derived available balance.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.clear + self.unsupervised_credits
            - self.unsupervised_debits
            - self.frozen_amount
            - self.pending_charges
    }

    /// Applies a delta to the stored fields.
    ///
    /// The available balance is derived, so applying a delta never sets it
    /// directly; callers re-read it through [`MemberBalances::available`].
    pub fn apply(&mut self, delta: &MemberDelta) {
        self.clear += delta.clear;
        self.unsupervised_credits += delta.unsupervised_credits;
        self.unsupervised_debits += delta.unsupervised_debits;
    }
}

/// Signed adjustments to the mutable balance fields of a member account.
///
/// Frozen amounts and pending charges are owned by administrative flows, not
/// the posting engine, so deltas never touch them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberDelta {
    /// Change to the clear balance.
    pub clear: Decimal,
    /// Change to pending incoming amounts.
    pub unsupervised_credits: Decimal,
    /// Change to pending outgoing amounts.
    pub unsupervised_debits: Decimal,
}

impl MemberDelta {
    /// Returns true if every field is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.clear.is_zero()
            && self.unsupervised_credits.is_zero()
            && self.unsupervised_debits.is_zero()
    }

    /// Returns the change this delta makes to the available balance.
    #[must_use]
    pub fn available_change(&self) -> Decimal {
        self.clear + self.unsupervised_credits - self.unsupervised_debits
    }

    /// Returns the inverse delta.
    #[must_use]
    pub fn inverse(&self) -> Self {
        Self {
            clear: -self.clear,
            unsupervised_credits: -self.unsupervised_credits,
            unsupervised_debits: -self.unsupervised_debits,
        }
    }
}

impl std::ops::Add for MemberDelta {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            clear: self.clear + rhs.clear,
            unsupervised_credits: self.unsupervised_credits + rhs.unsupervised_credits,
            unsupervised_debits: self.unsupervised_debits + rhs.unsupervised_debits,
        }
    }
}
