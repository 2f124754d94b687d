//! Pre-disbursement checks.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LoanError;
use super::types::LoanStatus;

/// Everything the orchestrator has resolved before asking whether a
/// disbursement may proceed.
#[derive(Debug, Clone)]
pub struct DisbursementRequest {
    /// The application being disbursed.
    pub application_id: Uuid,
    /// Its current status.
    pub status: LoanStatus,
    /// The sanctioned loan amount.
    pub amount: Decimal,
    /// Whether the caller holds the cashier role.
    pub caller_is_cashier: bool,
    /// Available balance of the cashier's till GL account.
    pub till_available: Decimal,
}

/// Validates a disbursement request against every precondition.
///
/// Checks are ordered so that the caller's authority is established before
/// any statement about application or till state leaks back.
///
/// # Errors
///
/// Returns the first violated precondition.
pub fn validate_disbursement(request: &DisbursementRequest) -> Result<(), LoanError> {
    if !request.caller_is_cashier {
        return Err(LoanError::NotCashier);
    }

    if !request.status.can_disburse() {
        return Err(LoanError::NotSanctioned {
            application_id: request.application_id,
            status: request.status,
        });
    }

    if request.amount <= Decimal::ZERO {
        return Err(LoanError::InvalidAmount);
    }

    if request.till_available < request.amount {
        return Err(LoanError::InsufficientTillFunds {
            available: request.till_available,
            requested: request.amount,
        });
    }

    Ok(())
}
