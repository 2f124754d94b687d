//! Postgres enum types mapped to Rust enums.
//!
//! These mirror the domain enums in `harambee-core`; conversions in both
//! directions live here so repositories can move between the stored and the
//! domain representation without string juggling.

use harambee_core::ledger::{AccountKind, EntryKind, EntryStatus, EntryType};
use harambee_core::loan::LoanStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which table an entry leg's account identifier resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_kind")]
pub enum DbAccountKind {
    /// Member account.
    #[sea_orm(string_value = "member")]
    Member,
    /// General-ledger account.
    #[sea_orm(string_value = "gl")]
    Gl,
}

impl From<AccountKind> for DbAccountKind {
    fn from(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Member => Self::Member,
            AccountKind::Gl => Self::Gl,
        }
    }
}

impl From<DbAccountKind> for AccountKind {
    fn from(kind: DbAccountKind) -> Self {
        match kind {
            DbAccountKind::Member => Self::Member,
            DbAccountKind::Gl => Self::Gl,
        }
    }
}

/// Debit or credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_type")]
pub enum DbEntryType {
    /// Debit leg (funds out).
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit leg (funds in).
    #[sea_orm(string_value = "credit")]
    Credit,
}

impl From<EntryType> for DbEntryType {
    fn from(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Debit => Self::Debit,
            EntryType::Credit => Self::Credit,
        }
    }
}

impl From<DbEntryType> for EntryType {
    fn from(entry_type: DbEntryType) -> Self {
        match entry_type {
            DbEntryType::Debit => Self::Debit,
            DbEntryType::Credit => Self::Credit,
        }
    }
}

/// Entry leg status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum DbEntryStatus {
    /// Awaiting approval.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Finalized.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Reversed out of the ledger.
    #[sea_orm(string_value = "deleted")]
    Deleted,
}

impl From<EntryStatus> for DbEntryStatus {
    fn from(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Pending => Self::Pending,
            EntryStatus::Approved => Self::Approved,
            EntryStatus::Rejected => Self::Rejected,
            EntryStatus::Cancelled => Self::Cancelled,
            EntryStatus::Deleted => Self::Deleted,
        }
    }
}

impl From<DbEntryStatus> for EntryStatus {
    fn from(status: DbEntryStatus) -> Self {
        match status {
            DbEntryStatus::Pending => Self::Pending,
            DbEntryStatus::Approved => Self::Approved,
            DbEntryStatus::Rejected => Self::Rejected,
            DbEntryStatus::Cancelled => Self::Cancelled,
            DbEntryStatus::Deleted => Self::Deleted,
        }
    }
}

/// Business classification of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_kind")]
pub enum DbEntryKind {
    /// Account-to-account transfer.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Cash paid into a till.
    #[sea_orm(string_value = "cash_deposit")]
    CashDeposit,
    /// Cash paid out of a till.
    #[sea_orm(string_value = "cash_withdrawal")]
    CashWithdrawal,
    /// Loan principal paid out at disbursement.
    #[sea_orm(string_value = "loan_disbursement")]
    LoanDisbursement,
    /// Multi-leg teller batch.
    #[sea_orm(string_value = "teller_batch")]
    TellerBatch,
}

impl From<EntryKind> for DbEntryKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Transfer => Self::Transfer,
            EntryKind::CashDeposit => Self::CashDeposit,
            EntryKind::CashWithdrawal => Self::CashWithdrawal,
            EntryKind::LoanDisbursement => Self::LoanDisbursement,
            EntryKind::TellerBatch => Self::TellerBatch,
        }
    }
}

impl From<DbEntryKind> for EntryKind {
    fn from(kind: DbEntryKind) -> Self {
        match kind {
            DbEntryKind::Transfer => Self::Transfer,
            DbEntryKind::CashDeposit => Self::CashDeposit,
            DbEntryKind::CashWithdrawal => Self::CashWithdrawal,
            DbEntryKind::LoanDisbursement => Self::LoanDisbursement,
            DbEntryKind::TellerBatch => Self::TellerBatch,
        }
    }
}

/// Loan application status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "loan_status")]
pub enum DbLoanStatus {
    /// Awaiting sanction.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Sanctioned, ready for disbursement.
    #[sea_orm(string_value = "sanctioned")]
    Sanctioned,
    /// Principal paid out.
    #[sea_orm(string_value = "disbursed")]
    Disbursed,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<LoanStatus> for DbLoanStatus {
    fn from(status: LoanStatus) -> Self {
        match status {
            LoanStatus::Pending => Self::Pending,
            LoanStatus::Sanctioned => Self::Sanctioned,
            LoanStatus::Disbursed => Self::Disbursed,
            LoanStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<DbLoanStatus> for LoanStatus {
    fn from(status: DbLoanStatus) -> Self {
        match status {
            DbLoanStatus::Pending => Self::Pending,
            DbLoanStatus::Sanctioned => Self::Sanctioned,
            DbLoanStatus::Disbursed => Self::Disbursed,
            DbLoanStatus::Rejected => Self::Rejected,
        }
    }
}
