//! `SeaORM` Entity for the loan_applications table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::DbLoanStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub sacco_id: Uuid,
    pub member_id: Uuid,
    pub product_id: Uuid,
    pub amount: Decimal,
    pub status: DbLoanStatus,
    pub main_repayment_account_id: Option<Uuid>,
    pub disbursed_by: Option<Uuid>,
    pub disbursed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loan_products::Entity",
        from = "Column::ProductId",
        to = "super::loan_products::Column::Id"
    )]
    LoanProducts,
    #[sea_orm(
        belongs_to = "super::saccos::Entity",
        from = "Column::SaccoId",
        to = "super::saccos::Column::Id"
    )]
    Saccos,
}

impl Related<super::loan_products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanProducts.def()
    }
}

impl Related<super::saccos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Saccos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
