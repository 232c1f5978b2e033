//! `SeaORM` Entity for installments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InstallmentStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub client_id: Uuid,
    pub product_name: String,
    pub total_amount_minor_units: i64,
    pub status: InstallmentStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installment_allocations::Entity")]
    InstallmentAllocations,
}

impl Related<super::installment_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallmentAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
