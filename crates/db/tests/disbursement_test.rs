//! Integration tests for the loan disbursement orchestrator.
//!
//! Covers the end-to-end disbursement flow: loan account creation, the
//! till-to-loan posting, application state, and the preconditions that stop
//! a disbursement before any write.
//!
//! They require a migrated database reachable via `DATABASE_URL` and skip
//! silently when the variable is unset.

use std::env;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use uuid::Uuid;

use harambee_core::ledger::{EntryStatus, UuidAllocator};
use harambee_core::loan::{LoanError, LoanStatus};
use harambee_db::entities::{loan_products, tills};
use harambee_db::repositories::{
    AccountRepository, CreateGlAccountInput, CreateLoanApplicationInput, LoanRepository,
    PostingRepository, SaccoRepository,
};

struct Fixture {
    sacco_id: Uuid,
    cashier_id: Uuid,
    member_id: Uuid,
    till_gl_id: Uuid,
    product_id: Uuid,
    accounts: AccountRepository,
    loans: LoanRepository,
}

/// Seeds a SACCO with a cashier till and a loan product, or returns None
/// when DATABASE_URL is unset.
async fn fixture(till_balance: Decimal) -> Option<Fixture> {
    let url = env::var("DATABASE_URL").ok()?;
    let db: DatabaseConnection = Database::connect(&url)
        .await
        .expect("Failed to connect to database");

    let sacco = SaccoRepository::new(db.clone())
        .create("Disbursement Test SACCO")
        .await
        .expect("Failed to create sacco");

    let accounts = AccountRepository::new(db.clone());
    let posting = PostingRepository::new(db.clone(), Arc::new(UuidAllocator));
    let cashier_id = Uuid::new_v4();

    let till_gl = accounts
        .create_gl_account(CreateGlAccountInput {
            sacco_id: sacco.id,
            code: format!("GL-{}", Uuid::new_v4().simple()),
            name: "Till Cash".to_string(),
            currency: "KES".to_string(),
            opening_balance: till_balance,
        })
        .await
        .expect("Failed to create till GL");

    let now = Utc::now().into();
    tills::ActiveModel {
        id: Set(Uuid::new_v4()),
        sacco_id: Set(sacco.id),
        name: Set("Counter 1".to_string()),
        cashier_id: Set(cashier_id),
        gl_account_id: Set(till_gl.id),
        max_transaction_amount: Set(dec!(50000)),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .expect("Failed to create till");

    let product = loan_products::ActiveModel {
        id: Set(Uuid::new_v4()),
        sacco_id: Set(sacco.id),
        name: Set("Development Loan".to_string()),
        currency: Set("KES".to_string()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&db)
    .await
    .expect("Failed to create loan product");

    Some(Fixture {
        sacco_id: sacco.id,
        cashier_id,
        member_id: Uuid::new_v4(),
        till_gl_id: till_gl.id,
        product_id: product.id,
        loans: LoanRepository::new(db.clone(), posting),
        accounts,
    })
}

impl Fixture {
    async fn application(&self, amount: Decimal, status: LoanStatus) -> Uuid {
        self.loans
            .create_application(CreateLoanApplicationInput {
                sacco_id: self.sacco_id,
                member_id: self.member_id,
                product_id: self.product_id,
                amount,
                status,
            })
            .await
            .expect("Failed to create application")
            .id
    }

    async fn till_balance(&self) -> Decimal {
        self.accounts
            .find_gl(self.till_gl_id)
            .await
            .expect("till GL should exist")
            .available_balance
    }
}

#[tokio::test]
async fn test_disburse_sanctioned_application_end_to_end() {
    let Some(fx) = fixture(dec!(10000)).await else { return };
    let application_id = fx.application(dec!(5000), LoanStatus::Sanctioned).await;

    let outcome = fx
        .loans
        .disburse(fx.sacco_id, application_id, fx.cashier_id, true)
        .await
        .expect("disbursement should succeed");

    // The till paid the principal out.
    assert_eq!(fx.till_balance().await, dec!(5000));

    // The loan account carries the credited principal.
    let loan_account = fx
        .accounts
        .find_member(outcome.loan_account.id)
        .await
        .expect("loan account should exist");
    assert_eq!(loan_account.member_id, fx.member_id);
    assert_eq!(loan_account.clear_balance, dec!(5000));
    assert_eq!(loan_account.available_balance, dec!(5000));
    assert_eq!(loan_account.currency, "KES");

    // The posting settled immediately with both legs approved.
    assert_eq!(outcome.entries.len(), 2);
    assert!(
        outcome
            .entries
            .iter()
            .all(|e| EntryStatus::from(e.status) == EntryStatus::Approved)
    );

    // The application is disbursed and linked to its repayment account.
    let application = fx
        .loans
        .find_application(fx.sacco_id, application_id)
        .await
        .expect("application should exist");
    assert_eq!(LoanStatus::from(application.status), LoanStatus::Disbursed);
    assert_eq!(
        application.main_repayment_account_id,
        Some(outcome.loan_account.id)
    );
    assert_eq!(application.disbursed_by, Some(fx.cashier_id));
    assert!(application.disbursed_at.is_some());
}

#[tokio::test]
async fn test_second_disbursement_is_state_conflict() {
    let Some(fx) = fixture(dec!(10000)).await else { return };
    let application_id = fx.application(dec!(5000), LoanStatus::Sanctioned).await;

    fx.loans
        .disburse(fx.sacco_id, application_id, fx.cashier_id, true)
        .await
        .expect("first disbursement should succeed");

    let second = fx
        .loans
        .disburse(fx.sacco_id, application_id, fx.cashier_id, true)
        .await;
    assert!(matches!(
        second,
        Err(LoanError::NotSanctioned {
            status: LoanStatus::Disbursed,
            ..
        })
    ));

    // Nothing moved the second time.
    assert_eq!(fx.till_balance().await, dec!(5000));
}

#[tokio::test]
async fn test_only_cashiers_may_disburse() {
    let Some(fx) = fixture(dec!(10000)).await else { return };
    let application_id = fx.application(dec!(5000), LoanStatus::Sanctioned).await;

    let result = fx
        .loans
        .disburse(fx.sacco_id, application_id, fx.cashier_id, false)
        .await;
    assert!(matches!(result, Err(LoanError::NotCashier)));

    let application = fx
        .loans
        .find_application(fx.sacco_id, application_id)
        .await
        .unwrap();
    assert_eq!(LoanStatus::from(application.status), LoanStatus::Sanctioned);
    assert_eq!(fx.till_balance().await, dec!(10000));
}

#[tokio::test]
async fn test_pending_application_cannot_be_disbursed() {
    let Some(fx) = fixture(dec!(10000)).await else { return };
    let application_id = fx.application(dec!(5000), LoanStatus::Pending).await;

    let result = fx
        .loans
        .disburse(fx.sacco_id, application_id, fx.cashier_id, true)
        .await;
    assert!(matches!(
        result,
        Err(LoanError::NotSanctioned {
            status: LoanStatus::Pending,
            ..
        })
    ));
    assert_eq!(fx.till_balance().await, dec!(10000));
}

#[tokio::test]
async fn test_insufficient_till_blocks_disbursement() {
    let Some(fx) = fixture(dec!(1000)).await else { return };
    let application_id = fx.application(dec!(5000), LoanStatus::Sanctioned).await;

    let result = fx
        .loans
        .disburse(fx.sacco_id, application_id, fx.cashier_id, true)
        .await;
    assert!(matches!(
        result,
        Err(LoanError::InsufficientTillFunds {
            available,
            requested,
        }) if available == dec!(1000) && requested == dec!(5000)
    ));

    // The rollback left no loan account behind.
    let application = fx
        .loans
        .find_application(fx.sacco_id, application_id)
        .await
        .unwrap();
    assert_eq!(LoanStatus::from(application.status), LoanStatus::Sanctioned);
    assert!(application.main_repayment_account_id.is_none());
    assert_eq!(fx.till_balance().await, dec!(1000));
}

#[tokio::test]
async fn test_cashier_without_till_cannot_disburse() {
    let Some(fx) = fixture(dec!(10000)).await else { return };
    let application_id = fx.application(dec!(5000), LoanStatus::Sanctioned).await;

    let stranger = Uuid::new_v4();
    let result = fx
        .loans
        .disburse(fx.sacco_id, application_id, stranger, true)
        .await;
    assert!(matches!(result, Err(LoanError::TillNotAssigned(_))));
    assert_eq!(fx.till_balance().await, dec!(10000));
}
