//! Business rule validation for postings.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::entry::EntryType;
use super::error::LedgerError;

/// One requested leg of a posting, before account resolution.
#[derive(Debug, Clone)]
pub struct LegInput {
    /// The account to post against.
    pub account_id: Uuid,
    /// Whether this leg is a debit or credit.
    pub entry_type: EntryType,
    /// The leg amount (must be positive).
    pub amount: Decimal,
    /// Optional remarks for this leg.
    pub remarks: Option<String>,
}

/// Validates a two-leg posting request.
///
/// # Errors
///
/// Returns an error if the amount is not positive or the two accounts are
/// the same.
pub fn validate_pair(
    debit_account_id: Uuid,
    credit_account_id: Uuid,
    amount: Decimal,
) -> Result<(), LedgerError> {
    if amount.is_zero() {
        return Err(LedgerError::ZeroAmount);
    }
    if amount < Decimal::ZERO {
        return Err(LedgerError::NegativeAmount);
    }
    if debit_account_id == credit_account_id {
        return Err(LedgerError::SameAccount(debit_account_id));
    }
    Ok(())
}

/// Validates a teller batch of N legs.
///
/// # Errors
///
/// Returns an error if there are fewer than two legs, any amount is not
/// positive, only one side is present, or total debits do not equal total
/// credits.
pub fn validate_batch(legs: &[LegInput]) -> Result<(), LedgerError> {
    if legs.len() < 2 {
        return Err(LedgerError::InsufficientLegs);
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for leg in legs {
        if leg.amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if leg.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }

        match leg.entry_type {
            EntryType::Debit => {
                total_debits += leg.amount;
                has_debit = true;
            }
            EntryType::Credit => {
                total_credits += leg.amount;
                has_credit = true;
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(LedgerError::SingleSided);
    }

    if total_debits != total_credits {
        return Err(LedgerError::UnbalancedBatch {
            debits: total_debits,
            credits: total_credits,
        });
    }

    Ok(())
}
