//! `SeaORM` active enums mirroring the PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `wallet_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_type")]
pub enum WalletType {
    /// personal
    #[sea_orm(string_value = "personal")]
    Personal,
    /// investor
    #[sea_orm(string_value = "investor")]
    Investor,
}

/// `wallet_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_status")]
pub enum WalletStatus {
    /// active
    #[sea_orm(string_value = "active")]
    Active,
    /// archived
    #[sea_orm(string_value = "archived")]
    Archived,
}

/// `ledger_direction` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_direction")]
pub enum LedgerDirection {
    /// credit
    #[sea_orm(string_value = "credit")]
    Credit,
    /// debit
    #[sea_orm(string_value = "debit")]
    Debit,
}

/// `ledger_reference_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_reference_type")]
pub enum LedgerReferenceType {
    /// initial_investment
    #[sea_orm(string_value = "initial_investment")]
    InitialInvestment,
    /// adjustment
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// installment
    #[sea_orm(string_value = "installment")]
    Installment,
    /// reversal
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

/// `allocation_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "allocation_status")]
pub enum AllocationStatus {
    /// active
    #[sea_orm(string_value = "active")]
    Active,
    /// void
    #[sea_orm(string_value = "void")]
    Void,
}

/// `installment_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "installment_status")]
pub enum InstallmentStatus {
    /// active
    #[sea_orm(string_value = "active")]
    Active,
    /// completed
    #[sea_orm(string_value = "completed")]
    Completed,
    /// cancelled
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}
