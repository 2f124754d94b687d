//! Property tests tying the effect table to the transition engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{MemberBalances, MemberDelta};
use super::effect::{BalanceEffect, LegDelta, leg_delta};
use super::entry::{AccountKind, EntryType};
use super::transition::{EntryEvent, transition};
use super::{EntryStatus, LedgerError};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

fn member_delta(delta: LegDelta) -> MemberDelta {
    match delta {
        LegDelta::Member(d) => d,
        LegDelta::None => MemberDelta::default(),
        LegDelta::Gl { .. } => panic!("expected a member delta"),
    }
}

fn gl_delta(delta: LegDelta) -> Decimal {
    match delta {
        LegDelta::Gl { available } => available,
        LegDelta::None => Decimal::ZERO,
        LegDelta::Member(_) => panic!("expected a GL delta"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Hold followed by finalize lands on the same member fields as
    /// settling immediately.
    #[test]
    fn prop_hold_then_finalize_equals_immediate(
        entry_type in entry_type_strategy(),
        amount in amount_strategy(),
    ) {
        let held = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Hold, amount,
        ));
        let finalized = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Finalize, amount,
        ));
        let immediate = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Immediate, amount,
        ));

        prop_assert_eq!(held + finalized, immediate);
    }

    /// Releasing a hold is the exact inverse of taking it.
    #[test]
    fn prop_release_inverts_hold(
        entry_type in entry_type_strategy(),
        amount in amount_strategy(),
    ) {
        let held = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Hold, amount,
        ));
        let released = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::ReleaseHold, amount,
        ));

        prop_assert!((held + released).is_zero());
    }

    /// Unwinding a settled entry is the exact inverse of settling it,
    /// for member and GL accounts alike.
    #[test]
    fn prop_unwind_inverts_settlement(
        entry_type in entry_type_strategy(),
        amount in amount_strategy(),
    ) {
        let settled = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Immediate, amount,
        ));
        let unwound = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::UnwindFinal, amount,
        ));
        prop_assert!((settled + unwound).is_zero());

        let settled_gl = gl_delta(leg_delta(
            AccountKind::Gl, entry_type, BalanceEffect::Finalize, amount,
        ));
        let unwound_gl = gl_delta(leg_delta(
            AccountKind::Gl, entry_type, BalanceEffect::UnwindFinal, amount,
        ));
        prop_assert_eq!(settled_gl + unwound_gl, Decimal::ZERO);
    }

    /// A pending hold never moves the member's clear balance, and never
    /// touches GL accounts at all.
    #[test]
    fn prop_hold_leaves_settled_funds_alone(
        entry_type in entry_type_strategy(),
        amount in amount_strategy(),
    ) {
        let held = member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Hold, amount,
        ));
        prop_assert_eq!(held.clear, Decimal::ZERO);

        let gl = leg_delta(AccountKind::Gl, entry_type, BalanceEffect::Hold, amount);
        prop_assert_eq!(gl, LegDelta::None);
    }

    /// A posting's two legs conserve value: the debit leg's available
    /// movement cancels the credit leg's, in every settled phase.
    #[test]
    fn prop_pair_conserves_value(
        amount in amount_strategy(),
        effect in prop_oneof![
            Just(BalanceEffect::Immediate),
            Just(BalanceEffect::Finalize),
            Just(BalanceEffect::UnwindFinal),
        ],
    ) {
        // Member on both sides.
        let debit = member_delta(leg_delta(
            AccountKind::Member, EntryType::Debit, effect, amount,
        ));
        let credit = member_delta(leg_delta(
            AccountKind::Member, EntryType::Credit, effect, amount,
        ));
        prop_assert_eq!(
            debit.available_change() + credit.available_change(),
            Decimal::ZERO
        );

        // GL on both sides.
        let debit_gl = gl_delta(leg_delta(AccountKind::Gl, EntryType::Debit, effect, amount));
        let credit_gl = gl_delta(leg_delta(AccountKind::Gl, EntryType::Credit, effect, amount));
        prop_assert_eq!(debit_gl + credit_gl, Decimal::ZERO);

        // Mixed member/GL pair.
        prop_assert_eq!(debit.available_change() + credit_gl, Decimal::ZERO);
    }

    /// Walking a pending entry through approve-then-reverse leaves member
    /// balances exactly where they started.
    #[test]
    fn prop_approve_then_reverse_is_neutral(
        entry_type in entry_type_strategy(),
        amount in amount_strategy(),
        clear in (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2)),
    ) {
        let original = MemberBalances {
            clear,
            ..MemberBalances::default()
        };
        let mut b = original;

        // Create pending.
        b.apply(&member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Hold, amount,
        )));

        // Approve.
        let approve = transition(EntryStatus::Pending, EntryEvent::Approve).unwrap();
        b.apply(&member_delta(leg_delta(
            AccountKind::Member, entry_type, approve.effect, amount,
        )));

        // Reverse.
        let reverse = transition(approve.next, EntryEvent::Reverse).unwrap();
        b.apply(&member_delta(leg_delta(
            AccountKind::Member, entry_type, reverse.effect, amount,
        )));

        prop_assert_eq!(b, original);
    }

    /// Rejecting a pending entry releases the hold and leaves clear funds
    /// untouched.
    #[test]
    fn prop_pending_reject_restores_balances(
        entry_type in entry_type_strategy(),
        amount in amount_strategy(),
    ) {
        let original = MemberBalances::default();
        let mut b = original;

        b.apply(&member_delta(leg_delta(
            AccountKind::Member, entry_type, BalanceEffect::Hold, amount,
        )));

        let reject = transition(EntryStatus::Pending, EntryEvent::Reject).unwrap();
        b.apply(&member_delta(leg_delta(
            AccountKind::Member, entry_type, reject.effect, amount,
        )));

        prop_assert_eq!(b, original);
    }
}

#[test]
fn approving_twice_never_double_applies() {
    let first = transition(EntryStatus::Pending, EntryEvent::Approve).unwrap();
    assert!(matches!(
        transition(first.next, EntryEvent::Approve),
        Err(LedgerError::InvalidTransition { .. })
    ));
}
