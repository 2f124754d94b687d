//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Balance fields are only ever written by the posting repository, inside a
//! database transaction, through single conditional UPDATE statements.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, LoanRepository, PostingRepository, ResolvedAccount, SaccoRepository,
    TillRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
