//! Loan repository: applications and the disbursement orchestrator.
//!
//! Disbursement creates the loan account, posts the till-to-loan pair, and
//! updates the application inside one database transaction. Any failure
//! rolls the whole sequence back; no loan account or partial posting is left
//! behind.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use harambee_core::ledger::{EntryKind, EntryStatus, LedgerError};
use harambee_core::loan::{DisbursementRequest, LoanError, LoanStatus, validate_disbursement};

use crate::entities::{gl_accounts, ledger_entries, loan_applications, loan_products, member_accounts, tills};
use crate::repositories::account::{AccountRepository, CreateMemberAccountInput};
use crate::repositories::posting::{PostPairInput, PostingRepository};

fn db_err(e: DbErr) -> LoanError {
    LoanError::Database(e.to_string())
}

/// Input for creating a loan application.
#[derive(Debug, Clone)]
pub struct CreateLoanApplicationInput {
    /// Owning SACCO.
    pub sacco_id: Uuid,
    /// Borrowing member.
    pub member_id: Uuid,
    /// Loan product applied for.
    pub product_id: Uuid,
    /// Requested principal.
    pub amount: Decimal,
    /// Initial status.
    pub status: LoanStatus,
}

/// Everything created by a successful disbursement.
#[derive(Debug, Clone)]
pub struct DisbursementOutcome {
    /// The application, now Disbursed.
    pub application: loan_applications::Model,
    /// The loan account created for the member.
    pub loan_account: member_accounts::Model,
    /// The posted pair (till debit, loan credit).
    pub entries: Vec<ledger_entries::Model>,
}

/// Repository for loan applications and disbursement.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    db: DatabaseConnection,
    posting: PostingRepository,
}

impl LoanRepository {
    /// Creates a new loan repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, posting: PostingRepository) -> Self {
        Self { db, posting }
    }

    /// Creates a loan application.
    ///
    /// # Errors
    ///
    /// Returns a database error on constraint violations.
    pub async fn create_application(
        &self,
        input: CreateLoanApplicationInput,
    ) -> Result<loan_applications::Model, LoanError> {
        let now = Utc::now().into();
        let application = loan_applications::ActiveModel {
            id: Set(Uuid::new_v4()),
            sacco_id: Set(input.sacco_id),
            member_id: Set(input.member_id),
            product_id: Set(input.product_id),
            amount: Set(input.amount),
            status: Set(input.status.into()),
            main_repayment_account_id: Set(None),
            disbursed_by: Set(None),
            disbursed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        application.insert(&self.db).await.map_err(db_err)
    }

    /// Fetches an application scoped to a SACCO.
    ///
    /// # Errors
    ///
    /// `ApplicationNotFound` when no row matches.
    pub async fn find_application(
        &self,
        sacco_id: Uuid,
        application_id: Uuid,
    ) -> Result<loan_applications::Model, LoanError> {
        loan_applications::Entity::find_by_id(application_id)
            .filter(loan_applications::Column::SaccoId.eq(sacco_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LoanError::ApplicationNotFound(application_id))
    }

    /// Disburses a sanctioned application.
    ///
    /// Within one database transaction: creates the member's loan account,
    /// posts debit till-GL / credit loan-account for the sanctioned amount,
    /// and marks the application Disbursed with the repayment account
    /// linked. Preconditions are all checked before the first write.
    ///
    /// # Errors
    ///
    /// Role, state, till, and posting errors; nothing persists on failure.
    pub async fn disburse(
        &self,
        sacco_id: Uuid,
        application_id: Uuid,
        cashier_id: Uuid,
        caller_is_cashier: bool,
    ) -> Result<DisbursementOutcome, LoanError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let application = loan_applications::Entity::find_by_id(application_id)
            .filter(loan_applications::Column::SaccoId.eq(sacco_id))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LoanError::ApplicationNotFound(application_id))?;

        let product = loan_products::Entity::find_by_id(application.product_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LoanError::ProductNotFound(application.product_id))?;

        let till = tills::Entity::find()
            .filter(tills::Column::SaccoId.eq(sacco_id))
            .filter(tills::Column::CashierId.eq(cashier_id))
            .filter(tills::Column::IsActive.eq(true))
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(LoanError::TillNotAssigned(cashier_id))?;

        let till_gl = gl_accounts::Entity::find_by_id(till.gl_account_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LoanError::Ledger(LedgerError::AccountNotFound(till.gl_account_id)))?;

        validate_disbursement(&DisbursementRequest {
            application_id,
            status: application.status.into(),
            amount: application.amount,
            caller_is_cashier,
            till_available: till_gl.available_balance,
        })?;

        let loan_account = AccountRepository::create_member_account_on(
            &txn,
            CreateMemberAccountInput {
                sacco_id,
                member_id: application.member_id,
                account_number: format!("LN-{}", application.id.simple()),
                currency: product.currency.clone(),
            },
        )
        .await?;

        let entries = self
            .posting
            .post_pair_on(
                &txn,
                PostPairInput {
                    sacco_id,
                    debit_account_id: till_gl.id,
                    credit_account_id: loan_account.id,
                    amount: application.amount,
                    kind: EntryKind::LoanDisbursement,
                    status: EntryStatus::Approved,
                    remarks: Some(format!("Disbursement of loan {}", application.id)),
                    created_by: cashier_id,
                },
            )
            .await?;

        let now = Utc::now();
        let mut active: loan_applications::ActiveModel = application.into();
        active.status = Set(LoanStatus::Disbursed.into());
        active.main_repayment_account_id = Set(Some(loan_account.id));
        active.disbursed_by = Set(Some(cashier_id));
        active.disbursed_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let application = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        info!(
            application = %application.id,
            loan_account = %loan_account.id,
            amount = %application.amount,
            "loan disbursed"
        );

        Ok(DisbursementOutcome {
            application,
            loan_account,
            entries,
        })
    }
}
