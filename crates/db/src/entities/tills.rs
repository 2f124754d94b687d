//! `SeaORM` Entity for the tills table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sacco_id: Uuid,
    pub name: String,
    pub cashier_id: Uuid,
    pub gl_account_id: Uuid,
    pub max_transaction_amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gl_accounts::Entity",
        from = "Column::GlAccountId",
        to = "super::gl_accounts::Column::Id"
    )]
    GlAccounts,
    #[sea_orm(
        belongs_to = "super::saccos::Entity",
        from = "Column::SaccoId",
        to = "super::saccos::Column::Id"
    )]
    Saccos,
}

impl Related<super::gl_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GlAccounts.def()
    }
}

impl Related<super::saccos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saccos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
