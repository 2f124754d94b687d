//! Balance effects of postings and status transitions.
//!
//! Every call site (transactions, teller batches, disbursement) computes its
//! balance math through this single table. One rule holds for member and GL
//! accounts alike: a debit leg takes funds out of its account, a credit leg
//! puts funds in.
//!
//! Member accounts split that movement across two buckets depending on the
//! leg's status: a Pending leg parks the amount in the unsupervised fields
//! (the hold), approval moves it into the clear balance (the finalization).
//! GL accounts have no pending bucket; their available balance moves only on
//! finalization.

use rust_decimal::Decimal;

use super::balance::MemberDelta;
use super::entry::{AccountKind, EntryStatus, EntryType};
use super::error::LedgerError;

/// Which balance rule a leg applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceEffect {
    /// No balance movement.
    None,
    /// Park the amount in the member unsupervised bucket (Pending creation).
    Hold,
    /// Move a held amount into settled balances (Pending → Approved).
    Finalize,
    /// Settle directly, skipping the hold (creation with Approved status).
    Immediate,
    /// Release a hold without settling (Pending → Rejected/Cancelled/Deleted).
    ReleaseHold,
    /// Undo a settled effect (Approved → Rejected/Cancelled/Deleted).
    UnwindFinal,
}

/// The balance movement of one leg against one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegDelta {
    /// Nothing to write.
    None,
    /// Adjustments to a member account's stored fields.
    Member(MemberDelta),
    /// Adjustment to a GL account's available balance.
    Gl {
        /// Signed change to the available balance.
        available: Decimal,
    },
}

impl LegDelta {
    /// Returns true if the delta carries no movement.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::None => true,
            Self::Member(d) => d.is_zero(),
            Self::Gl { available } => available.is_zero(),
        }
    }
}

/// Returns the effect applied when an entry is created with `status`.
///
/// # Errors
///
/// Returns `LedgerError::InvalidInitialStatus` for anything other than
/// Pending or Approved.
pub fn creation_effect(status: EntryStatus) -> Result<BalanceEffect, LedgerError> {
    match status {
        EntryStatus::Pending => Ok(BalanceEffect::Hold),
        EntryStatus::Approved => Ok(BalanceEffect::Immediate),
        other => Err(LedgerError::InvalidInitialStatus(other)),
    }
}

/// Computes the balance movement of one leg for a given effect.
///
/// `amount` is the (positive) leg amount; the sign conventions live entirely
/// in this table.
#[must_use]
pub fn leg_delta(
    kind: AccountKind,
    entry_type: EntryType,
    effect: BalanceEffect,
    amount: Decimal,
) -> LegDelta {
    match (kind, effect) {
        (_, BalanceEffect::None) => LegDelta::None,

        // Member accounts: the hold bucket tracks the direction of the leg.
        (AccountKind::Member, BalanceEffect::Hold) => LegDelta::Member(match entry_type {
            EntryType::Debit => MemberDelta {
                unsupervised_debits: amount,
                ..MemberDelta::default()
            },
            EntryType::Credit => MemberDelta {
                unsupervised_credits: amount,
                ..MemberDelta::default()
            },
        }),
        (AccountKind::Member, BalanceEffect::ReleaseHold) => LegDelta::Member(match entry_type {
            EntryType::Debit => MemberDelta {
                unsupervised_debits: -amount,
                ..MemberDelta::default()
            },
            EntryType::Credit => MemberDelta {
                unsupervised_credits: -amount,
                ..MemberDelta::default()
            },
        }),
        (AccountKind::Member, BalanceEffect::Finalize) => LegDelta::Member(match entry_type {
            EntryType::Debit => MemberDelta {
                clear: -amount,
                unsupervised_debits: -amount,
                ..MemberDelta::default()
            },
            EntryType::Credit => MemberDelta {
                clear: amount,
                unsupervised_credits: -amount,
                ..MemberDelta::default()
            },
        }),
        (AccountKind::Member, BalanceEffect::Immediate) => LegDelta::Member(match entry_type {
            EntryType::Debit => MemberDelta {
                clear: -amount,
                ..MemberDelta::default()
            },
            EntryType::Credit => MemberDelta {
                clear: amount,
                ..MemberDelta::default()
            },
        }),
        (AccountKind::Member, BalanceEffect::UnwindFinal) => LegDelta::Member(match entry_type {
            EntryType::Debit => MemberDelta {
                clear: amount,
                ..MemberDelta::default()
            },
            EntryType::Credit => MemberDelta {
                clear: -amount,
                ..MemberDelta::default()
            },
        }),

        // GL accounts carry no pending bucket: holds are free, settlement
        // moves the available balance.
        (AccountKind::Gl, BalanceEffect::Hold | BalanceEffect::ReleaseHold) => LegDelta::None,
        (AccountKind::Gl, BalanceEffect::Finalize | BalanceEffect::Immediate) => LegDelta::Gl {
            available: match entry_type {
                EntryType::Debit => -amount,
                EntryType::Credit => amount,
            },
        },
        (AccountKind::Gl, BalanceEffect::UnwindFinal) => LegDelta::Gl {
            available: match entry_type {
                EntryType::Debit => amount,
                EntryType::Credit => -amount,
            },
        },
    }
}

/// Returns the amount a GL account must cover for this leg, if any.
///
/// A GL debit leg drains its account when it settles, so sufficiency is
/// checked at posting time and re-checked at approval time. Member accounts
/// are never balance-checked here; their guards are flow-level.
#[must_use]
pub fn gl_sufficiency_required(
    kind: AccountKind,
    entry_type: EntryType,
    amount: Decimal,
) -> Option<Decimal> {
    match (kind, entry_type) {
        (AccountKind::Gl, EntryType::Debit) => Some(amount),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_member_hold_directions() {
        let debit = leg_delta(
            AccountKind::Member,
            EntryType::Debit,
            BalanceEffect::Hold,
            dec!(200),
        );
        assert_eq!(
            debit,
            LegDelta::Member(MemberDelta {
                unsupervised_debits: dec!(200),
                ..MemberDelta::default()
            })
        );

        let credit = leg_delta(
            AccountKind::Member,
            EntryType::Credit,
            BalanceEffect::Hold,
            dec!(200),
        );
        assert_eq!(
            credit,
            LegDelta::Member(MemberDelta {
                unsupervised_credits: dec!(200),
                ..MemberDelta::default()
            })
        );
    }

    #[test]
    fn test_member_finalize_moves_hold_into_clear() {
        let debit = leg_delta(
            AccountKind::Member,
            EntryType::Debit,
            BalanceEffect::Finalize,
            dec!(200),
        );
        assert_eq!(
            debit,
            LegDelta::Member(MemberDelta {
                clear: dec!(-200),
                unsupervised_debits: dec!(-200),
                ..MemberDelta::default()
            })
        );

        let credit = leg_delta(
            AccountKind::Member,
            EntryType::Credit,
            BalanceEffect::Finalize,
            dec!(200),
        );
        assert_eq!(
            credit,
            LegDelta::Member(MemberDelta {
                clear: dec!(200),
                unsupervised_credits: dec!(-200),
                ..MemberDelta::default()
            })
        );
    }

    #[test]
    fn test_gl_settlement_directions() {
        assert_eq!(
            leg_delta(
                AccountKind::Gl,
                EntryType::Debit,
                BalanceEffect::Immediate,
                dec!(75)
            ),
            LegDelta::Gl {
                available: dec!(-75)
            }
        );
        assert_eq!(
            leg_delta(
                AccountKind::Gl,
                EntryType::Credit,
                BalanceEffect::Finalize,
                dec!(75)
            ),
            LegDelta::Gl {
                available: dec!(75)
            }
        );
    }

    #[test]
    fn test_gl_pending_is_untouched() {
        assert_eq!(
            leg_delta(
                AccountKind::Gl,
                EntryType::Debit,
                BalanceEffect::Hold,
                dec!(75)
            ),
            LegDelta::None
        );
        assert_eq!(
            leg_delta(
                AccountKind::Gl,
                EntryType::Credit,
                BalanceEffect::ReleaseHold,
                dec!(75)
            ),
            LegDelta::None
        );
    }

    #[test]
    fn test_creation_effect_statuses() {
        assert_eq!(
            creation_effect(EntryStatus::Pending).unwrap(),
            BalanceEffect::Hold
        );
        assert_eq!(
            creation_effect(EntryStatus::Approved).unwrap(),
            BalanceEffect::Immediate
        );
        assert!(matches!(
            creation_effect(EntryStatus::Rejected),
            Err(LedgerError::InvalidInitialStatus(EntryStatus::Rejected))
        ));
    }

    #[test]
    fn test_gl_sufficiency_only_for_debits() {
        assert_eq!(
            gl_sufficiency_required(AccountKind::Gl, EntryType::Debit, dec!(50)),
            Some(dec!(50))
        );
        assert_eq!(
            gl_sufficiency_required(AccountKind::Gl, EntryType::Credit, dec!(50)),
            None
        );
        assert_eq!(
            gl_sufficiency_required(AccountKind::Member, EntryType::Debit, dec!(50)),
            None
        );
    }
}
