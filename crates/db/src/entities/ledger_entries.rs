//! `SeaORM` Entity for the ledger_entries table.
//!
//! One row per leg. Rows are never hard-deleted; reversal sets `is_deleted`
//! and the Deleted status on every leg of the reference together.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{DbAccountKind, DbEntryKind, DbEntryStatus, DbEntryType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub transaction_code: String,
    pub reference_number: String,
    pub sacco_id: Uuid,
    pub account_id: Uuid,
    pub account_kind: DbAccountKind,
    pub entry_type: DbEntryType,
    pub amount: Decimal,
    pub status: DbEntryStatus,
    pub kind: DbEntryKind,
    pub remarks: Option<String>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub is_deleted: bool,
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
