//! Account repository: polymorphic resolution and atomic balance deltas.
//!
//! An account identifier may name a member account or a GL account; exactly
//! one table is allowed to match. Balance mutations go through the
//! `apply_*_delta_on` methods, which express the new value in terms of the
//! old column value in one conditional UPDATE so concurrent postings cannot
//! lose updates.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use harambee_core::ledger::{AccountKind, LedgerError, MemberDelta};

use crate::entities::{gl_accounts, member_accounts};

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

/// The result of resolving an account identifier.
#[derive(Debug, Clone)]
pub enum ResolvedAccount {
    /// The identifier named a member account.
    Member(member_accounts::Model),
    /// The identifier named a GL account.
    Gl(gl_accounts::Model),
}

impl ResolvedAccount {
    /// Returns which table the identifier resolved against.
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        match self {
            Self::Member(_) => AccountKind::Member,
            Self::Gl(_) => AccountKind::Gl,
        }
    }

    /// Returns the account identifier.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Member(m) => m.id,
            Self::Gl(g) => g.id,
        }
    }

    /// Returns the owning SACCO.
    #[must_use]
    pub const fn sacco_id(&self) -> Uuid {
        match self {
            Self::Member(m) => m.sacco_id,
            Self::Gl(g) => g.sacco_id,
        }
    }

    /// Returns the account's available balance.
    #[must_use]
    pub const fn available_balance(&self) -> Decimal {
        match self {
            Self::Member(m) => m.available_balance,
            Self::Gl(g) => g.available_balance,
        }
    }
}

/// Input for creating a member account.
#[derive(Debug, Clone)]
pub struct CreateMemberAccountInput {
    /// Owning SACCO.
    pub sacco_id: Uuid,
    /// Owning member.
    pub member_id: Uuid,
    /// Human-readable account number.
    pub account_number: String,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Input for creating a GL account.
#[derive(Debug, Clone)]
pub struct CreateGlAccountInput {
    /// Owning SACCO.
    pub sacco_id: Uuid,
    /// GL code.
    pub code: String,
    /// GL name.
    pub name: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Opening balance.
    pub opening_balance: Decimal,
}

/// Repository for account resolution and balance mutation.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves an account identifier against both tables.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when neither table matches, `AmbiguousAccount` when
    /// both do.
    pub async fn resolve(&self, account_id: Uuid) -> Result<ResolvedAccount, LedgerError> {
        Self::resolve_on(&self.db, account_id).await
    }

    /// Resolves an account identifier on the given connection.
    ///
    /// # Errors
    ///
    /// See [`AccountRepository::resolve`].
    pub async fn resolve_on<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
    ) -> Result<ResolvedAccount, LedgerError> {
        let member = member_accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await
            .map_err(db_err)?;
        let gl = gl_accounts::Entity::find_by_id(account_id)
            .one(conn)
            .await
            .map_err(db_err)?;

        match (member, gl) {
            (Some(m), None) => Ok(ResolvedAccount::Member(m)),
            (None, Some(g)) => Ok(ResolvedAccount::Gl(g)),
            (Some(_), Some(_)) => Err(LedgerError::AmbiguousAccount(account_id)),
            (None, None) => Err(LedgerError::AccountNotFound(account_id)),
        }
    }

    /// Applies a delta to a member account's stored fields.
    ///
    /// The available balance is recomputed from the post-delta column values
    /// in the same UPDATE statement; nothing reads balances into application
    /// code first.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` if no row matched.
    pub async fn apply_member_delta_on<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        delta: &MemberDelta,
    ) -> Result<(), LedgerError> {
        use member_accounts::Column;

        if delta.is_zero() {
            return Ok(());
        }

        let result = member_accounts::Entity::update_many()
            .col_expr(
                Column::ClearBalance,
                Expr::col(Column::ClearBalance).add(delta.clear),
            )
            .col_expr(
                Column::UnsupervisedCredits,
                Expr::col(Column::UnsupervisedCredits).add(delta.unsupervised_credits),
            )
            .col_expr(
                Column::UnsupervisedDebits,
                Expr::col(Column::UnsupervisedDebits).add(delta.unsupervised_debits),
            )
            .col_expr(
                Column::AvailableBalance,
                Expr::col(Column::ClearBalance)
                    .add(delta.clear)
                    .add(Expr::col(Column::UnsupervisedCredits))
                    .add(delta.unsupervised_credits)
                    .sub(Expr::col(Column::UnsupervisedDebits))
                    .sub(delta.unsupervised_debits)
                    .sub(Expr::col(Column::FrozenAmount))
                    .sub(Expr::col(Column::PendingCharges)),
            )
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(account_id))
            .exec(conn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::AccountNotFound(account_id));
        }
        Ok(())
    }

    /// Applies a delta to a GL account's available balance.
    ///
    /// When `required` is set, the UPDATE carries an
    /// `available_balance >= required` condition, making the sufficiency
    /// check and the mutation one atomic statement.
    ///
    /// # Errors
    ///
    /// `InsufficientGlFunds` when the guard fails, `AccountNotFound` when no
    /// row matched.
    pub async fn apply_gl_delta_on<C: ConnectionTrait>(
        conn: &C,
        account_id: Uuid,
        delta: Decimal,
        required: Option<Decimal>,
    ) -> Result<(), LedgerError> {
        use gl_accounts::Column;

        if delta.is_zero() && required.is_none() {
            return Ok(());
        }

        let mut query = gl_accounts::Entity::update_many()
            .col_expr(
                Column::AvailableBalance,
                Expr::col(Column::AvailableBalance).add(delta),
            )
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(account_id));

        if let Some(amount) = required {
            query = query.filter(Column::AvailableBalance.gte(amount));
        }

        let result = query.exec(conn).await.map_err(db_err)?;

        if result.rows_affected == 0 {
            // Distinguish a missing row from a failed guard.
            let account = gl_accounts::Entity::find_by_id(account_id)
                .one(conn)
                .await
                .map_err(db_err)?
                .ok_or(LedgerError::AccountNotFound(account_id))?;

            return Err(LedgerError::InsufficientGlFunds {
                account_id,
                available: account.available_balance,
                requested: required.unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// Creates a member account with zero balances.
    ///
    /// # Errors
    ///
    /// Returns a database error on constraint violations.
    pub async fn create_member_account(
        &self,
        input: CreateMemberAccountInput,
    ) -> Result<member_accounts::Model, LedgerError> {
        Self::create_member_account_on(&self.db, input).await
    }

    /// Creates a member account on the given connection.
    ///
    /// # Errors
    ///
    /// Returns a database error on constraint violations.
    pub async fn create_member_account_on<C: ConnectionTrait>(
        conn: &C,
        input: CreateMemberAccountInput,
    ) -> Result<member_accounts::Model, LedgerError> {
        let now = Utc::now().into();
        let account = member_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            sacco_id: Set(input.sacco_id),
            member_id: Set(input.member_id),
            account_number: Set(input.account_number),
            currency: Set(input.currency),
            clear_balance: Set(Decimal::ZERO),
            unsupervised_credits: Set(Decimal::ZERO),
            unsupervised_debits: Set(Decimal::ZERO),
            frozen_amount: Set(Decimal::ZERO),
            pending_charges: Set(Decimal::ZERO),
            available_balance: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(conn).await.map_err(db_err)
    }

    /// Creates a GL account.
    ///
    /// # Errors
    ///
    /// Returns a database error on constraint violations.
    pub async fn create_gl_account(
        &self,
        input: CreateGlAccountInput,
    ) -> Result<gl_accounts::Model, LedgerError> {
        let now = Utc::now().into();
        let account = gl_accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            sacco_id: Set(input.sacco_id),
            code: Set(input.code),
            name: Set(input.name),
            currency: Set(input.currency),
            available_balance: Set(input.opening_balance),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        account.insert(&self.db).await.map_err(db_err)
    }

    /// Fetches a member account by id.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when no row matches.
    pub async fn find_member(&self, id: Uuid) -> Result<member_accounts::Model, LedgerError> {
        member_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Fetches a GL account by id.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when no row matches.
    pub async fn find_gl(&self, id: Uuid) -> Result<gl_accounts::Model, LedgerError> {
        gl_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::AccountNotFound(id))
    }
}
