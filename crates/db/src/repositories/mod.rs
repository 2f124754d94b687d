//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Balance fields are written exclusively by the posting path, via atomic
//! conditional updates inside database transactions.

pub mod account;
pub mod loan;
pub mod posting;
pub mod sacco;
pub mod till;

pub use account::{
    AccountRepository, CreateGlAccountInput, CreateMemberAccountInput, ResolvedAccount,
};
pub use loan::{CreateLoanApplicationInput, DisbursementOutcome, LoanRepository};
pub use posting::{
    EntryFilter, PostBatchInput, PostPairInput, PostingRepository, UpdateEntryInput,
};
pub use sacco::SaccoRepository;
pub use till::{CashTransactionInput, TillRepository};
