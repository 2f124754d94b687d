//! Sacco repository.
//!
//! Tenant rows are owned by an external administration flow; this repository
//! only covers what the seeder and tenancy checks need.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::saccos;

/// Repository for SACCO tenant rows.
#[derive(Debug, Clone)]
pub struct SaccoRepository {
    db: DatabaseConnection,
}

impl SaccoRepository {
    /// Creates a new sacco repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a SACCO.
    ///
    /// # Errors
    ///
    /// Returns a database error on constraint violations.
    pub async fn create(&self, name: &str) -> Result<saccos::Model, DbErr> {
        let now = Utc::now().into();
        let sacco = saccos::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        sacco.insert(&self.db).await
    }

    /// Fetches a SACCO by id.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<saccos::Model>, DbErr> {
        saccos::Entity::find_by_id(id).one(&self.db).await
    }
}
