//! `SeaORM` Entity for the gl_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "gl_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sacco_id: Uuid,
    pub code: String,
    pub name: String,
    pub currency: String,
    pub available_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::saccos::Entity",
        from = "Column::SaccoId",
        to = "super::saccos::Column::Id"
    )]
    Saccos,
    #[sea_orm(has_many = "super::tills::Entity")]
    Tills,
}

impl Related<super::saccos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saccos.def()
    }
}

impl Related<super::tills::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tills.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
