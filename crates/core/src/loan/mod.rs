//! Loan disbursement rules.
//!
//! The orchestration (account creation, posting, status update) lives in the
//! data layer; this module owns the application status machine and the
//! pre-disbursement checks.

pub mod disbursement;
pub mod error;
pub mod types;

pub use disbursement::{DisbursementRequest, validate_disbursement};
pub use error::LoanError;
pub use types::LoanStatus;
