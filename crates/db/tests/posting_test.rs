//! Integration tests for the posting repository.
//!
//! These tests exercise the posting engine against a real database: pair and
//! batch creation, approval, rejection, reversal, and the balance identity
//! of every touched account.
//!
//! They require a migrated database reachable via `DATABASE_URL` and skip
//! silently when the variable is unset.

use std::env;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::Database;
use uuid::Uuid;

use harambee_core::ledger::{
    EntryEvent, EntryKind, EntryStatus, EntryType, LedgerError, LegInput, UuidAllocator,
};
use harambee_db::repositories::{
    AccountRepository, CreateGlAccountInput, CreateMemberAccountInput, PostBatchInput,
    PostPairInput, PostingRepository, SaccoRepository,
};

struct Fixture {
    sacco_id: Uuid,
    accounts: AccountRepository,
    posting: PostingRepository,
}

/// Connects and seeds a fresh SACCO, or returns None when DATABASE_URL is
/// unset.
async fn fixture() -> Option<Fixture> {
    let url = env::var("DATABASE_URL").ok()?;
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");

    let sacco = SaccoRepository::new(db.clone())
        .create("Posting Test SACCO")
        .await
        .expect("Failed to create sacco");

    Some(Fixture {
        accounts: AccountRepository::new(db.clone()),
        posting: PostingRepository::new(db, Arc::new(UuidAllocator)),
        sacco_id: sacco.id,
    })
}

impl Fixture {
    /// Creates a member account holding `clear` settled funds, funded through
    /// the posting engine from a throwaway GL account.
    async fn member_with_clear(&self, clear: Decimal) -> Uuid {
        let account = self
            .accounts
            .create_member_account(CreateMemberAccountInput {
                sacco_id: self.sacco_id,
                member_id: Uuid::new_v4(),
                account_number: format!("SAV-{}", Uuid::new_v4().simple()),
                currency: "KES".to_string(),
            })
            .await
            .expect("Failed to create member account");

        if clear > Decimal::ZERO {
            let funding = self.gl_with_balance(clear).await;
            self.posting
                .post_pair(PostPairInput {
                    sacco_id: self.sacco_id,
                    debit_account_id: funding,
                    credit_account_id: account.id,
                    amount: clear,
                    kind: EntryKind::Transfer,
                    status: EntryStatus::Approved,
                    remarks: None,
                    created_by: Uuid::new_v4(),
                })
                .await
                .expect("Failed to fund member account");
        }

        account.id
    }

    async fn gl_with_balance(&self, balance: Decimal) -> Uuid {
        self.accounts
            .create_gl_account(CreateGlAccountInput {
                sacco_id: self.sacco_id,
                code: format!("GL-{}", Uuid::new_v4().simple()),
                name: "Test GL".to_string(),
                currency: "KES".to_string(),
                opening_balance: balance,
            })
            .await
            .expect("Failed to create GL account")
            .id
    }

    /// Asserts the derived-balance identity for a member account and returns
    /// the model.
    async fn assert_member_identity(&self, id: Uuid) -> harambee_db::entities::member_accounts::Model {
        let m = self
            .accounts
            .find_member(id)
            .await
            .expect("member account should exist");
        assert_eq!(
            m.available_balance,
            m.clear_balance + m.unsupervised_credits - m.unsupervised_debits - m.frozen_amount
                - m.pending_charges,
            "balance identity violated for {id}"
        );
        m
    }

    async fn gl_balance(&self, id: Uuid) -> Decimal {
        self.accounts
            .find_gl(id)
            .await
            .expect("GL account should exist")
            .available_balance
    }
}

#[tokio::test]
async fn test_pending_posting_holds_then_approval_settles() {
    let Some(fx) = fixture().await else { return };

    let a = fx.member_with_clear(dec!(1000)).await;
    let b = fx.member_with_clear(dec!(500)).await;

    let entries = fx
        .posting
        .post_pair(PostPairInput {
            sacco_id: fx.sacco_id,
            debit_account_id: a,
            credit_account_id: b,
            amount: dec!(200),
            kind: EntryKind::Transfer,
            status: EntryStatus::Pending,
            remarks: Some("pending transfer".to_string()),
            created_by: Uuid::new_v4(),
        })
        .await
        .expect("posting should succeed");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].reference_number, entries[1].reference_number);
    assert_eq!(entries[0].amount, entries[1].amount);
    assert_ne!(entries[0].entry_type, entries[1].entry_type);

    // The hold is visible, the clear balances are not yet touched.
    let ma = fx.assert_member_identity(a).await;
    assert_eq!(ma.clear_balance, dec!(1000));
    assert_eq!(ma.unsupervised_debits, dec!(200));
    assert_eq!(ma.available_balance, dec!(800));

    let mb = fx.assert_member_identity(b).await;
    assert_eq!(mb.clear_balance, dec!(500));
    assert_eq!(mb.unsupervised_credits, dec!(200));

    let approved = fx
        .posting
        .approve_reference(&entries[0].reference_number, Uuid::new_v4())
        .await
        .expect("approval should succeed");
    assert!(approved.iter().all(|e| e.approved_by.is_some()));

    // Settled: clear moved, holds back to baseline.
    let ma = fx.assert_member_identity(a).await;
    assert_eq!(ma.clear_balance, dec!(800));
    assert_eq!(ma.unsupervised_debits, Decimal::ZERO);

    let mb = fx.assert_member_identity(b).await;
    assert_eq!(mb.clear_balance, dec!(700));
    assert_eq!(mb.unsupervised_credits, Decimal::ZERO);
}

#[tokio::test]
async fn test_second_approval_is_state_conflict() {
    let Some(fx) = fixture().await else { return };

    let a = fx.member_with_clear(dec!(1000)).await;
    let b = fx.member_with_clear(Decimal::ZERO).await;

    let entries = fx
        .posting
        .post_pair(PostPairInput {
            sacco_id: fx.sacco_id,
            debit_account_id: a,
            credit_account_id: b,
            amount: dec!(300),
            kind: EntryKind::Transfer,
            status: EntryStatus::Pending,
            remarks: None,
            created_by: Uuid::new_v4(),
        })
        .await
        .expect("posting should succeed");
    let reference = entries[0].reference_number.clone();

    fx.posting
        .approve_reference(&reference, Uuid::new_v4())
        .await
        .expect("first approval should succeed");

    let second = fx.posting.approve_reference(&reference, Uuid::new_v4()).await;
    assert!(matches!(
        second,
        Err(LedgerError::InvalidTransition {
            from: EntryStatus::Approved,
            event: EntryEvent::Approve,
        })
    ));

    // The delta was not applied twice.
    let ma = fx.assert_member_identity(a).await;
    assert_eq!(ma.clear_balance, dec!(700));
    let mb = fx.assert_member_identity(b).await;
    assert_eq!(mb.clear_balance, dec!(300));
}

#[tokio::test]
async fn test_gl_debit_insufficient_funds_creates_nothing() {
    let Some(fx) = fixture().await else { return };

    let gl = fx.gl_with_balance(dec!(100)).await;
    let member = fx.member_with_clear(Decimal::ZERO).await;

    let result = fx
        .posting
        .post_pair(PostPairInput {
            sacco_id: fx.sacco_id,
            debit_account_id: gl,
            credit_account_id: member,
            amount: dec!(150),
            kind: EntryKind::Transfer,
            status: EntryStatus::Approved,
            remarks: None,
            created_by: Uuid::new_v4(),
        })
        .await;

    assert!(matches!(
        result,
        Err(LedgerError::InsufficientGlFunds { .. })
    ));

    assert_eq!(fx.gl_balance(gl).await, dec!(100));
    let entries = fx
        .posting
        .list_entries(fx.sacco_id, harambee_db::repositories::EntryFilter {
            account_id: Some(member),
            ..Default::default()
        })
        .await
        .expect("listing should succeed");
    assert!(entries.is_empty(), "no leg may survive a failed posting");
}

#[tokio::test]
async fn test_rejecting_pending_pair_releases_holds() {
    let Some(fx) = fixture().await else { return };

    let a = fx.member_with_clear(dec!(400)).await;
    let b = fx.member_with_clear(Decimal::ZERO).await;

    let entries = fx
        .posting
        .post_pair(PostPairInput {
            sacco_id: fx.sacco_id,
            debit_account_id: a,
            credit_account_id: b,
            amount: dec!(150),
            kind: EntryKind::Transfer,
            status: EntryStatus::Pending,
            remarks: None,
            created_by: Uuid::new_v4(),
        })
        .await
        .expect("posting should succeed");

    let rejected = fx
        .posting
        .transition_reference(
            &entries[0].reference_number,
            EntryEvent::Reject,
            Uuid::new_v4(),
            true,
        )
        .await
        .expect("rejection should succeed");
    assert!(
        rejected
            .iter()
            .all(|e| EntryStatus::from(e.status) == EntryStatus::Rejected)
    );

    // No phantom pending amounts survive the rejection.
    let ma = fx.assert_member_identity(a).await;
    assert_eq!(ma.clear_balance, dec!(400));
    assert_eq!(ma.unsupervised_debits, Decimal::ZERO);
    assert_eq!(ma.available_balance, dec!(400));

    let mb = fx.assert_member_identity(b).await;
    assert_eq!(mb.unsupervised_credits, Decimal::ZERO);
    assert_eq!(mb.available_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_reversing_approved_pair_restores_gl_balances() {
    let Some(fx) = fixture().await else { return };

    let source = fx.gl_with_balance(dec!(1000)).await;
    let sink = fx.gl_with_balance(dec!(250)).await;

    let entries = fx
        .posting
        .post_pair(PostPairInput {
            sacco_id: fx.sacco_id,
            debit_account_id: source,
            credit_account_id: sink,
            amount: dec!(300),
            kind: EntryKind::Transfer,
            status: EntryStatus::Approved,
            remarks: None,
            created_by: Uuid::new_v4(),
        })
        .await
        .expect("posting should succeed");

    assert_eq!(fx.gl_balance(source).await, dec!(700));
    assert_eq!(fx.gl_balance(sink).await, dec!(550));

    let reversed = fx
        .posting
        .reverse_entry(entries[0].id, Uuid::new_v4())
        .await
        .expect("reversal should succeed");
    assert_eq!(reversed.len(), 2);
    assert!(reversed.iter().all(|e| e.is_deleted));
    assert!(
        reversed
            .iter()
            .all(|e| EntryStatus::from(e.status) == EntryStatus::Deleted)
    );

    assert_eq!(fx.gl_balance(source).await, dec!(1000));
    assert_eq!(fx.gl_balance(sink).await, dec!(250));

    // Deleted is terminal.
    let again = fx.posting.reverse_entry(entries[0].id, Uuid::new_v4()).await;
    assert!(matches!(
        again,
        Err(LedgerError::InvalidTransition {
            from: EntryStatus::Deleted,
            ..
        })
    ));
}

#[tokio::test]
async fn test_cross_sacco_posting_rejected_before_any_write() {
    let Some(fx) = fixture().await else { return };
    let Some(other) = fixture().await else { return };

    let ours = fx.member_with_clear(dec!(100)).await;
    let theirs = other.member_with_clear(dec!(100)).await;

    let result = fx
        .posting
        .post_pair(PostPairInput {
            sacco_id: fx.sacco_id,
            debit_account_id: ours,
            credit_account_id: theirs,
            amount: dec!(50),
            kind: EntryKind::Transfer,
            status: EntryStatus::Pending,
            remarks: None,
            created_by: Uuid::new_v4(),
        })
        .await;

    assert!(matches!(result, Err(LedgerError::SaccoMismatch { .. })));

    let ma = fx.assert_member_identity(ours).await;
    assert_eq!(ma.unsupervised_debits, Decimal::ZERO);
}

#[tokio::test]
async fn test_batch_lifecycle_across_member_and_gl() {
    let Some(fx) = fixture().await else { return };

    let gl = fx.gl_with_balance(dec!(1000)).await;
    let a = fx.member_with_clear(dec!(100)).await;
    let b = fx.member_with_clear(Decimal::ZERO).await;

    let legs = vec![
        LegInput {
            account_id: gl,
            entry_type: EntryType::Debit,
            amount: dec!(500),
            remarks: None,
        },
        LegInput {
            account_id: a,
            entry_type: EntryType::Credit,
            amount: dec!(200),
            remarks: None,
        },
        LegInput {
            account_id: b,
            entry_type: EntryType::Credit,
            amount: dec!(300),
            remarks: None,
        },
    ];

    let entries = fx
        .posting
        .post_batch(PostBatchInput {
            sacco_id: fx.sacco_id,
            legs,
            kind: EntryKind::TellerBatch,
            status: EntryStatus::Pending,
            created_by: Uuid::new_v4(),
        })
        .await
        .expect("batch should post");
    assert_eq!(entries.len(), 3);

    // GL balances do not move while the batch is pending.
    assert_eq!(fx.gl_balance(gl).await, dec!(1000));

    fx.posting
        .transition_reference(
            &entries[0].reference_number,
            EntryEvent::Approve,
            Uuid::new_v4(),
            false,
        )
        .await
        .expect("batch approval should succeed");

    assert_eq!(fx.gl_balance(gl).await, dec!(500));
    let ma = fx.assert_member_identity(a).await;
    assert_eq!(ma.clear_balance, dec!(300));
    let mb = fx.assert_member_identity(b).await;
    assert_eq!(mb.clear_balance, dec!(300));
}

#[tokio::test]
async fn test_unbalanced_batch_rejected() {
    let Some(fx) = fixture().await else { return };

    let a = fx.member_with_clear(dec!(100)).await;
    let b = fx.member_with_clear(Decimal::ZERO).await;

    let legs = vec![
        LegInput {
            account_id: a,
            entry_type: EntryType::Debit,
            amount: dec!(100),
            remarks: None,
        },
        LegInput {
            account_id: b,
            entry_type: EntryType::Credit,
            amount: dec!(60),
            remarks: None,
        },
    ];

    let result = fx
        .posting
        .post_batch(PostBatchInput {
            sacco_id: fx.sacco_id,
            legs,
            kind: EntryKind::TellerBatch,
            status: EntryStatus::Pending,
            created_by: Uuid::new_v4(),
        })
        .await;

    assert!(matches!(result, Err(LedgerError::UnbalancedBatch { .. })));
}
