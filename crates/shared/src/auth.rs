//! Authentication claims carried by access tokens.
//!
//! Session issuance and password management are owned by an external identity
//! service; this crate only defines and validates the claims it mints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SaccoId, UserId};

/// JWT claims for access tokens.
///
/// The typed-ID wrappers serialize transparently, so tokens carry plain
/// UUID strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    pub sub: UserId,
    /// SACCO ID (tenant context).
    pub sacco: SaccoId,
    /// User's role within the SACCO (e.g. "cashier", "supervisor").
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a user.
    #[must_use]
    pub fn new(user_id: Uuid, sacco_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: UserId::from_uuid(user_id),
            sacco: SaccoId::from_uuid(sacco_id),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.sub.into_inner()
    }

    /// Returns the SACCO ID from claims.
    #[must_use]
    pub const fn sacco_id(&self) -> Uuid {
        self.sacco.into_inner()
    }

    /// Returns true if the caller holds the cashier role.
    #[must_use]
    pub fn is_cashier(&self) -> bool {
        self.role.eq_ignore_ascii_case("cashier")
    }
}
