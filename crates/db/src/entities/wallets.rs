//! `SeaORM` Entity for wallets table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{WalletStatus, WalletType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub wallet_type: WalletType,
    #[sea_orm(column_type = "Char(Some(3))")]
    pub currency: String,
    pub status: WalletStatus,
    pub require_nonnegative: bool,
    pub allow_partial_allocation: bool,
    pub investment_amount_minor_units: Option<i64>,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))", nullable)]
    pub investor_percentage: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))", nullable)]
    pub user_percentage: Option<Decimal>,
    pub investment_return_date: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::wallet_balances::Entity")]
    WalletBalances,
    #[sea_orm(has_many = "super::ledger_transactions::Entity")]
    LedgerTransactions,
    #[sea_orm(has_many = "super::installment_allocations::Entity")]
    InstallmentAllocations,
}

impl Related<super::wallet_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WalletBalances.def()
    }
}

impl Related<super::ledger_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerTransactions.def()
    }
}

impl Related<super::installment_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InstallmentAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
