//! Conversions between `SeaORM` models and core domain types.

use std::str::FromStr;

use chrono::Utc;
use tranche_core::LedgerError;
use tranche_core::allocation::{self as domain_allocation, Allocation, Installment};
use tranche_core::ledger::{BalanceSnapshot, Direction, LedgerEntry, ReferenceType};
use tranche_core::wallet::{self as domain_wallet, InvestorTerms, Wallet};
use tranche_shared::types::{
    AllocationId, ClientId, Currency, InstallmentId, LedgerTransactionId, OwnerId, WalletId,
};

use crate::entities::{
    installment_allocations, installments, ledger_transactions,
    sea_orm_active_enums::{
        AllocationStatus, InstallmentStatus, LedgerDirection, LedgerReferenceType, WalletStatus,
        WalletType,
    },
    wallet_balances, wallets,
};

// ============================================================================
// Enums
// ============================================================================

impl From<domain_wallet::WalletType> for WalletType {
    fn from(value: domain_wallet::WalletType) -> Self {
        match value {
            domain_wallet::WalletType::Personal => Self::Personal,
            domain_wallet::WalletType::Investor => Self::Investor,
        }
    }
}

impl From<WalletType> for domain_wallet::WalletType {
    fn from(value: WalletType) -> Self {
        match value {
            WalletType::Personal => Self::Personal,
            WalletType::Investor => Self::Investor,
        }
    }
}

impl From<WalletStatus> for domain_wallet::WalletStatus {
    fn from(value: WalletStatus) -> Self {
        match value {
            WalletStatus::Active => Self::Active,
            WalletStatus::Archived => Self::Archived,
        }
    }
}

impl From<Direction> for LedgerDirection {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Credit => Self::Credit,
            Direction::Debit => Self::Debit,
        }
    }
}

impl From<LedgerDirection> for Direction {
    fn from(value: LedgerDirection) -> Self {
        match value {
            LedgerDirection::Credit => Self::Credit,
            LedgerDirection::Debit => Self::Debit,
        }
    }
}

impl From<ReferenceType> for LedgerReferenceType {
    fn from(value: ReferenceType) -> Self {
        match value {
            ReferenceType::InitialInvestment => Self::InitialInvestment,
            ReferenceType::Adjustment => Self::Adjustment,
            ReferenceType::Installment => Self::Installment,
            ReferenceType::Reversal => Self::Reversal,
        }
    }
}

impl From<LedgerReferenceType> for ReferenceType {
    fn from(value: LedgerReferenceType) -> Self {
        match value {
            LedgerReferenceType::InitialInvestment => Self::InitialInvestment,
            LedgerReferenceType::Adjustment => Self::Adjustment,
            LedgerReferenceType::Installment => Self::Installment,
            LedgerReferenceType::Reversal => Self::Reversal,
        }
    }
}

impl From<AllocationStatus> for domain_allocation::AllocationStatus {
    fn from(value: AllocationStatus) -> Self {
        match value {
            AllocationStatus::Active => Self::Active,
            AllocationStatus::Void => Self::Void,
        }
    }
}

impl From<InstallmentStatus> for domain_allocation::InstallmentStatus {
    fn from(value: InstallmentStatus) -> Self {
        match value {
            InstallmentStatus::Active => Self::Active,
            InstallmentStatus::Completed => Self::Completed,
            InstallmentStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<domain_allocation::InstallmentStatus> for InstallmentStatus {
    fn from(value: domain_allocation::InstallmentStatus) -> Self {
        match value {
            domain_allocation::InstallmentStatus::Active => Self::Active,
            domain_allocation::InstallmentStatus::Completed => Self::Completed,
            domain_allocation::InstallmentStatus::Cancelled => Self::Cancelled,
        }
    }
}

// ============================================================================
// Models
// ============================================================================

fn currency(code: &str) -> Result<Currency, LedgerError> {
    Currency::from_str(code).map_err(LedgerError::Internal)
}

impl TryFrom<wallets::Model> for Wallet {
    type Error = LedgerError;

    fn try_from(m: wallets::Model) -> Result<Self, Self::Error> {
        let investor = match (
            m.investment_amount_minor_units,
            m.investor_percentage,
            m.user_percentage,
            m.investment_return_date,
        ) {
            (Some(investment_amount), Some(investor_percentage), Some(user_percentage), Some(date)) => {
                Some(InvestorTerms {
                    investment_amount,
                    investor_percentage,
                    user_percentage,
                    investment_return_date: date,
                })
            }
            _ => None,
        };

        Ok(Self {
            id: WalletId::from_uuid(m.id),
            owner_id: OwnerId::from_uuid(m.owner_id),
            name: m.name,
            wallet_type: m.wallet_type.into(),
            currency: currency(&m.currency)?,
            status: m.status.into(),
            require_nonnegative: m.require_nonnegative,
            allow_partial_allocation: m.allow_partial_allocation,
            investor,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
        })
    }
}

impl From<wallet_balances::Model> for BalanceSnapshot {
    fn from(m: wallet_balances::Model) -> Self {
        Self {
            wallet_id: WalletId::from_uuid(m.wallet_id),
            balance: m.balance_minor_units,
            version: m.version,
            updated_at: m.updated_at.with_timezone(&Utc),
        }
    }
}

impl TryFrom<ledger_transactions::Model> for LedgerEntry {
    type Error = LedgerError;

    fn try_from(m: ledger_transactions::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LedgerTransactionId::from_uuid(m.id),
            wallet_id: WalletId::from_uuid(m.wallet_id),
            owner_id: OwnerId::from_uuid(m.owner_id),
            direction: m.direction.into(),
            amount: m.amount_minor_units,
            currency: currency(&m.currency)?,
            reference_type: m.reference_type.into(),
            reference_id: m.reference_id,
            description: m.description,
            created_by: OwnerId::from_uuid(m.created_by),
            created_at: m.created_at.with_timezone(&Utc),
        })
    }
}

impl From<installments::Model> for Installment {
    fn from(m: installments::Model) -> Self {
        Self {
            id: InstallmentId::from_uuid(m.id),
            owner_id: OwnerId::from_uuid(m.owner_id),
            client_id: ClientId::from_uuid(m.client_id),
            product_name: m.product_name,
            total_amount: m.total_amount_minor_units,
            status: m.status.into(),
        }
    }
}

impl From<installment_allocations::Model> for Allocation {
    fn from(m: installment_allocations::Model) -> Self {
        Self {
            id: AllocationId::from_uuid(m.id),
            installment_id: InstallmentId::from_uuid(m.installment_id),
            wallet_id: WalletId::from_uuid(m.wallet_id),
            owner_id: OwnerId::from_uuid(m.owner_id),
            amount: m.amount_minor_units,
            status: m.status.into(),
            notes: m.notes,
            transaction_id: LedgerTransactionId::from_uuid(m.transaction_id),
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}
