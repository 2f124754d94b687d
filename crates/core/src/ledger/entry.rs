//! Entry leg domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of ledger entry.
///
/// A debit leg takes funds out of its account; a credit leg puts funds in.
/// Both member accounts and GL accounts follow this rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry (funds out).
    Debit,
    /// Credit entry (funds in).
    Credit,
}

impl EntryType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses an entry type from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    /// Returns the opposite entry type.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of an entry leg.
///
/// Both legs of a reference always carry the same status and move together.
/// The valid transitions are:
/// - Pending → Approved (approve)
/// - Pending → Rejected / Cancelled (reject, cancel)
/// - Pending / Approved / Rejected / Cancelled → Deleted (reverse)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Awaiting supervisor approval; member holds applied, GL untouched.
    Pending,
    /// Finalized; settled balances carry the effect.
    Approved,
    /// Rejected before or after approval; effect undone.
    Rejected,
    /// Cancelled before or after approval; effect undone.
    Cancelled,
    /// Reversed out of the ledger; row kept for audit.
    Deleted,
}

impl EntryStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Returns true if the entry's amount may still be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of account a leg posts against.
///
/// An account identifier resolves to exactly one of these; the resolved kind
/// decides which balance fields the leg touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Member account with clear/unsupervised balance split.
    Member,
    /// General-ledger account with a single available balance.
    Gl,
}

impl AccountKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Gl => "gl",
        }
    }
}

/// Business classification of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Account-to-account transfer.
    Transfer,
    /// Cash paid into a till.
    CashDeposit,
    /// Cash paid out of a till.
    CashWithdrawal,
    /// Loan principal paid out at disbursement.
    LoanDisbursement,
    /// Multi-leg teller batch.
    TellerBatch,
}

impl EntryKind {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::CashDeposit => "cash_deposit",
            Self::CashWithdrawal => "cash_withdrawal",
            Self::LoanDisbursement => "loan_disbursement",
            Self::TellerBatch => "teller_batch",
        }
    }

    /// Parses a kind from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "transfer" => Some(Self::Transfer),
            "cash_deposit" => Some(Self::CashDeposit),
            "cash_withdrawal" => Some(Self::CashWithdrawal),
            "loan_disbursement" => Some(Self::LoanDisbursement),
            "teller_batch" => Some(Self::TellerBatch),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_type_opposite() {
        assert_eq!(EntryType::Debit.opposite(), EntryType::Credit);
        assert_eq!(EntryType::Credit.opposite(), EntryType::Debit);
    }

    #[test]
    fn test_entry_type_parse() {
        assert_eq!(EntryType::parse("debit"), Some(EntryType::Debit));
        assert_eq!(EntryType::parse("CREDIT"), Some(EntryType::Credit));
        assert_eq!(EntryType::parse("other"), None);
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            EntryStatus::Pending,
            EntryStatus::Approved,
            EntryStatus::Rejected,
            EntryStatus::Cancelled,
            EntryStatus::Deleted,
        ] {
            assert_eq!(EntryStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EntryStatus::parse("unknown"), None);
    }

    #[test]
    fn test_status_terminal() {
        assert!(EntryStatus::Deleted.is_terminal());
        assert!(!EntryStatus::Pending.is_terminal());
        assert!(!EntryStatus::Approved.is_terminal());
        assert!(!EntryStatus::Rejected.is_terminal());
        assert!(!EntryStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_editable() {
        assert!(EntryStatus::Pending.is_editable());
        assert!(!EntryStatus::Approved.is_editable());
        assert!(!EntryStatus::Deleted.is_editable());
    }

    #[test]
    fn test_entry_kind_parse_roundtrip() {
        for kind in [
            EntryKind::Transfer,
            EntryKind::CashDeposit,
            EntryKind::CashWithdrawal,
            EntryKind::LoanDisbursement,
            EntryKind::TellerBatch,
        ] {
            assert_eq!(EntryKind::parse(kind.as_str()), Some(kind));
        }
    }
}
