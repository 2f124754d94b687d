//! Double-entry ledger posting logic.
//!
//! This module implements the core posting engine:
//! - Entry legs (debits and credits) and their statuses
//! - Member account balance model
//! - Balance effects for posting and status transitions
//! - The status transition engine shared by every call site
//! - Business rule validation for pairs and teller batches
//! - Reference number allocation
//! - Error types for ledger operations

pub mod balance;
pub mod effect;
pub mod entry;
pub mod error;
pub mod reference;
pub mod transition;
pub mod validation;

#[cfg(test)]
mod effect_props;

pub use balance::{MemberBalances, MemberDelta};
pub use effect::{BalanceEffect, LegDelta, creation_effect, gl_sufficiency_required, leg_delta};
pub use entry::{AccountKind, EntryKind, EntryStatus, EntryType};
pub use error::LedgerError;
pub use reference::{ReferenceAllocator, SequenceAllocator, UuidAllocator};
pub use transition::{EntryEvent, Transition, transition};
pub use validation::{LegInput, validate_batch, validate_pair};
