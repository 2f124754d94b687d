//! Ledger error types for validation, guard, and state errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::entry::EntryStatus;
use super::transition::EntryEvent;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry amount cannot be zero.
    #[error("Entry amount cannot be zero")]
    ZeroAmount,

    /// Entry amount cannot be negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// Debit and credit accounts must differ.
    #[error("Debit and credit account are the same: {0}")]
    SameAccount(Uuid),

    /// Posting must have at least 2 legs.
    #[error("Posting must have at least 2 legs")]
    InsufficientLegs,

    /// Posting must have both debit and credit legs.
    #[error("Posting must have both debit and credit legs")]
    SingleSided,

    /// Batch totals do not balance.
    #[error("Posting is not balanced. Debits: {debits}, Credits: {credits}")]
    UnbalancedBatch {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    /// Entry cannot be created with this status.
    #[error("Entries cannot be created with status {0}")]
    InvalidInitialStatus(EntryStatus),

    // ========== Tenancy Errors ==========
    /// Account belongs to a different SACCO than the request.
    #[error(
        "Account {account_id} belongs to SACCO {account_sacco}, request is for SACCO {request_sacco}"
    )]
    SaccoMismatch {
        /// The offending account.
        account_id: Uuid,
        /// The SACCO owning the account.
        account_sacco: Uuid,
        /// The SACCO named by the request.
        request_sacco: Uuid,
    },

    // ========== Resolution Errors ==========
    /// No member account or GL account matches the identifier.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// The identifier matches both a member account and a GL account.
    #[error("Account identifier {0} is ambiguous")]
    AmbiguousAccount(Uuid),

    /// Entry not found.
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    /// No entries carry the reference number.
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    // ========== Guard Errors ==========
    /// GL debit account lacks funds.
    #[error(
        "GL account {account_id} has insufficient funds: available {available}, requested {requested}"
    )]
    InsufficientGlFunds {
        /// The GL account.
        account_id: Uuid,
        /// Available balance at check time.
        available: Decimal,
        /// Requested amount.
        requested: Decimal,
    },

    /// Till GL account lacks cash to pay out.
    #[error("Till has insufficient funds: available {available}, requested {requested}")]
    InsufficientTillFunds {
        /// Available till balance at check time.
        available: Decimal,
        /// Requested amount.
        requested: Decimal,
    },

    /// Amount exceeds the till's per-transaction ceiling.
    #[error("Amount {requested} exceeds till transaction limit {limit}")]
    TillLimitExceeded {
        /// The configured ceiling.
        limit: Decimal,
        /// Requested amount.
        requested: Decimal,
    },

    /// The cashier has no till assigned.
    #[error("No till assigned to cashier {0}")]
    TillNotAssigned(Uuid),

    // ========== State Errors ==========
    /// Event not legal from the current status.
    #[error("Cannot {event} an entry in status {from}")]
    InvalidTransition {
        /// Status before the event.
        from: EntryStatus,
        /// The attempted event.
        event: EntryEvent,
    },

    /// A reference does not carry exactly one debit and one credit Pending leg.
    #[error("Reference {reference} is malformed: expected a balanced pair, found {legs} leg(s)")]
    MalformedPair {
        /// The reference number.
        reference: String,
        /// Number of legs found.
        legs: usize,
    },

    /// Legs of a reference disagree on status.
    #[error("Reference {0} has legs in differing statuses")]
    MixedStatus(String),

    /// Only pending entries may be edited.
    #[error("Only pending entries may be edited")]
    NotEditable,

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::InsufficientLegs => "INSUFFICIENT_LEGS",
            Self::SingleSided => "SINGLE_SIDED",
            Self::UnbalancedBatch { .. } => "UNBALANCED_POSTING",
            Self::InvalidInitialStatus(_) => "INVALID_INITIAL_STATUS",
            Self::SaccoMismatch { .. } => "SACCO_MISMATCH",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AmbiguousAccount(_) => "AMBIGUOUS_ACCOUNT",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ReferenceNotFound(_) => "REFERENCE_NOT_FOUND",
            Self::InsufficientGlFunds { .. } => "INSUFFICIENT_GL_FUNDS",
            Self::InsufficientTillFunds { .. } => "INSUFFICIENT_TILL_FUNDS",
            Self::TillLimitExceeded { .. } => "TILL_LIMIT_EXCEEDED",
            Self::TillNotAssigned(_) => "TILL_NOT_ASSIGNED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::MalformedPair { .. } => "MALFORMED_PAIR",
            Self::MixedStatus(_) => "MIXED_STATUS",
            Self::NotEditable => "NOT_EDITABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and guard errors
            Self::ZeroAmount
            | Self::NegativeAmount
            | Self::SameAccount(_)
            | Self::InsufficientLegs
            | Self::SingleSided
            | Self::UnbalancedBatch { .. }
            | Self::InvalidInitialStatus(_)
            | Self::SaccoMismatch { .. }
            | Self::AmbiguousAccount(_)
            | Self::InsufficientGlFunds { .. }
            | Self::InsufficientTillFunds { .. }
            | Self::TillLimitExceeded { .. }
            | Self::TillNotAssigned(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::EntryNotFound(_) | Self::ReferenceNotFound(_) => 404,

            // 409 Conflict - state machine violations
            Self::InvalidTransition { .. }
            | Self::MalformedPair { .. }
            | Self::MixedStatus(_)
            | Self::NotEditable => 409,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}
