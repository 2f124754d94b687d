//! `SeaORM` Entity for the member_accounts table.
//!
//! `available_balance` is a derived column; it is only ever written together
//! with the fields it derives from, in the same UPDATE statement.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "member_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sacco_id: Uuid,
    pub member_id: Uuid,
    #[sea_orm(unique)]
    pub account_number: String,
    pub currency: String,
    pub clear_balance: Decimal,
    pub unsupervised_credits: Decimal,
    pub unsupervised_debits: Decimal,
    pub frozen_amount: Decimal,
    pub pending_charges: Decimal,
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
}

impl Related<super::saccos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saccos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
