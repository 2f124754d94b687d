//! Loan application domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Loan application status.
///
/// Applications progress Pending → Sanctioned → Disbursed; rejection is
/// terminal. Only a Sanctioned application may be disbursed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// Submitted, awaiting sanction.
    Pending,
    /// Sanctioned by a loan officer; ready for disbursement.
    Sanctioned,
    /// Principal paid out; repayment account linked.
    Disbursed,
    /// Rejected; terminal.
    Rejected,
}

impl LoanStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sanctioned => "sanctioned",
            Self::Disbursed => "disbursed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "sanctioned" => Some(Self::Sanctioned),
            "disbursed" => Some(Self::Disbursed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the application can be disbursed.
    #[must_use]
    pub fn can_disburse(&self) -> bool {
        matches!(self, Self::Sanctioned)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
