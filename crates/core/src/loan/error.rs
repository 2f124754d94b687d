//! Loan error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::LoanStatus;
use crate::ledger::LedgerError;

/// Errors that can occur during loan operations.
#[derive(Debug, Error)]
pub enum LoanError {
    /// Only cashiers may disburse.
    #[error("Only a cashier may disburse a loan")]
    NotCashier,

    /// Application is not in the Sanctioned state.
    #[error("Loan application {application_id} is {status}, only sanctioned applications can be disbursed")]
    NotSanctioned {
        /// The application.
        application_id: Uuid,
        /// Its current status.
        status: LoanStatus,
    },

    /// Disbursement amount must be positive.
    #[error("Loan amount must be positive")]
    InvalidAmount,

    /// Application not found.
    #[error("Loan application not found: {0}")]
    ApplicationNotFound(Uuid),

    /// Loan product not found.
    #[error("Loan product not found: {0}")]
    ProductNotFound(Uuid),

    /// The cashier has no till assigned.
    #[error("No till assigned to cashier {0}")]
    TillNotAssigned(Uuid),

    /// The till cannot cover the disbursement.
    #[error("Till has insufficient funds: available {available}, requested {requested}")]
    InsufficientTillFunds {
        /// Available till balance.
        available: Decimal,
        /// Loan amount requested.
        requested: Decimal,
    },

    /// Underlying posting failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LoanError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotCashier => "NOT_CASHIER",
            Self::NotSanctioned { .. } => "NOT_SANCTIONED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::TillNotAssigned(_) => "TILL_NOT_ASSIGNED",
            Self::InsufficientTillFunds { .. } => "INSUFFICIENT_TILL_FUNDS",
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::NotCashier => 403,
            Self::NotSanctioned { .. } => 409,
            Self::InvalidAmount
            | Self::TillNotAssigned(_)
            | Self::InsufficientTillFunds { .. } => 400,
            Self::ApplicationNotFound(_) | Self::ProductNotFound(_) => 404,
            Self::Ledger(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LoanError::NotCashier.error_code(), "NOT_CASHIER");
        assert_eq!(
            LoanError::NotSanctioned {
                application_id: Uuid::nil(),
                status: LoanStatus::Disbursed,
            }
            .error_code(),
            "NOT_SANCTIONED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LoanError::NotCashier.http_status_code(), 403);
        assert_eq!(
            LoanError::NotSanctioned {
                application_id: Uuid::nil(),
                status: LoanStatus::Pending,
            }
            .http_status_code(),
            409
        );
        assert_eq!(
            LoanError::InsufficientTillFunds {
                available: dec!(100),
                requested: dec!(500),
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            LoanError::ApplicationNotFound(Uuid::nil()).http_status_code(),
            404
        );
    }

    #[test]
    fn test_ledger_errors_pass_through() {
        let err = LoanError::from(LedgerError::ZeroAmount);
        assert_eq!(err.error_code(), "ZERO_AMOUNT");
        assert_eq!(err.http_status_code(), 400);
    }
}
