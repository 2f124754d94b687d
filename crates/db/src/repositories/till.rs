//! Till repository: cashier till lookup and cash transactions.
//!
//! Cash movements settle at the counter, so the legs are posted with
//! Approved status. The till capacity guard runs before the posting engine
//! is invoked; a failed guard leaves no trace.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::info;
use uuid::Uuid;

use harambee_core::ledger::{EntryKind, EntryStatus, EntryType, LedgerError};

use crate::entities::{gl_accounts, ledger_entries, tills};
use crate::repositories::posting::{PostPairInput, PostingRepository};

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

/// Input for a till cash transaction.
///
/// `member_side` is the entry type applied to the member account: a debit
/// pays cash out to the member (withdrawal), a credit takes cash in
/// (deposit). The cashier's till GL takes the opposite leg.
#[derive(Debug, Clone)]
pub struct CashTransactionInput {
    /// The SACCO named by the request.
    pub sacco_id: Uuid,
    /// The member account at the counter.
    pub member_account_id: Uuid,
    /// Cash amount (positive).
    pub amount: Decimal,
    /// Entry type applied to the member account.
    pub member_side: EntryType,
    /// Free-text remarks.
    pub remarks: Option<String>,
    /// The cashier handling the transaction.
    pub cashier_id: Uuid,
}

/// Repository for tills and cash transactions.
#[derive(Debug, Clone)]
pub struct TillRepository {
    db: DatabaseConnection,
    posting: PostingRepository,
}

impl TillRepository {
    /// Creates a new till repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, posting: PostingRepository) -> Self {
        Self { db, posting }
    }

    /// Finds the active till assigned to a cashier, with its GL account.
    ///
    /// # Errors
    ///
    /// `TillNotAssigned` when the cashier has no active till;
    /// `AccountNotFound` when the till's GL account is missing.
    pub async fn find_for_cashier(
        &self,
        sacco_id: Uuid,
        cashier_id: Uuid,
    ) -> Result<(tills::Model, gl_accounts::Model), LedgerError> {
        let till = tills::Entity::find()
            .filter(tills::Column::SaccoId.eq(sacco_id))
            .filter(tills::Column::CashierId.eq(cashier_id))
            .filter(tills::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::TillNotAssigned(cashier_id))?;

        let gl = gl_accounts::Entity::find_by_id(till.gl_account_id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(till.gl_account_id))?;

        Ok((till, gl))
    }

    /// Posts a cash deposit or withdrawal against the cashier's till.
    ///
    /// # Errors
    ///
    /// Guard failures (till limit, insufficient till cash) before any write;
    /// posting errors otherwise.
    pub async fn cash_transaction(
        &self,
        input: CashTransactionInput,
    ) -> Result<Vec<ledger_entries::Model>, LedgerError> {
        if input.amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if input.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }

        let (till, gl) = self.find_for_cashier(input.sacco_id, input.cashier_id).await?;

        if input.amount > till.max_transaction_amount {
            return Err(LedgerError::TillLimitExceeded {
                limit: till.max_transaction_amount,
                requested: input.amount,
            });
        }

        // A withdrawal pays out of till cash; the till must cover it before
        // anything is posted.
        if input.member_side == EntryType::Debit && gl.available_balance < input.amount {
            return Err(LedgerError::InsufficientTillFunds {
                available: gl.available_balance,
                requested: input.amount,
            });
        }

        let (debit_account_id, credit_account_id, kind) = match input.member_side {
            EntryType::Debit => (
                input.member_account_id,
                gl.id,
                EntryKind::CashWithdrawal,
            ),
            EntryType::Credit => (gl.id, input.member_account_id, EntryKind::CashDeposit),
        };

        let entries = self
            .posting
            .post_pair(PostPairInput {
                sacco_id: input.sacco_id,
                debit_account_id,
                credit_account_id,
                amount: input.amount,
                kind,
                status: EntryStatus::Approved,
                remarks: input.remarks,
                created_by: input.cashier_id,
            })
            .await?;

        info!(
            till = %till.id,
            member_account = %input.member_account_id,
            amount = %input.amount,
            kind = %kind,
            "cash transaction"
        );
        Ok(entries)
    }
}
