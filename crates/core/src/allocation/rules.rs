//! Allocation and void rules.
//!
//! The engine fetches the rows inside one serializable transaction and hands
//! them here; these functions decide and describe the writes, nothing else.

use tranche_shared::types::{AllocationId, InstallmentId};

use crate::ledger::{
    BalanceSnapshot, BalanceUpdate, Direction, LedgerError, NewLedgerEntry, ReferenceType,
};
use crate::wallet::Wallet;

use super::types::{AllocateRequest, Allocation, Installment};

/// Writes an accepted allocation performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Debit appended to the ledger.
    pub entry: NewLedgerEntry,
    /// Guarded balance write.
    pub balance_update: BalanceUpdate,
}

/// Writes an accepted void performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoidPlan {
    /// Reversal credit appended to the ledger.
    pub entry: NewLedgerEntry,
    /// Guarded balance write.
    pub balance_update: BalanceUpdate,
}

/// Amount still unallocated on an installment, never below zero.
#[must_use]
pub fn remaining(total_amount: i64, allocated_total: i64) -> i64 {
    total_amount.saturating_sub(allocated_total).max(0)
}

/// Ledger description of an allocation debit.
#[must_use]
pub fn allocation_description(installment_id: InstallmentId, notes: Option<&str>) -> String {
    match notes {
        Some(notes) => format!("Installment allocation: {notes}"),
        None => format!("Allocation for installment {installment_id}"),
    }
}

/// Ledger description of a reversal credit.
#[must_use]
pub fn reversal_description(allocation_id: AllocationId) -> String {
    format!("Reversal for allocation {allocation_id}")
}

/// Decides an allocation.
///
/// Checks run in order: installment not cancelled, wallet active, wallet
/// balance covers the amount, amount fits the installment's remaining cap.
///
/// # Errors
///
/// `InstallmentCancelled`, `WalletInactive`, `InsufficientFunds` or
/// `AllocationExceedsRemaining`, whichever check fails first.
pub fn plan_allocation(
    request: &AllocateRequest,
    installment: &Installment,
    wallet: &Wallet,
    balance: &BalanceSnapshot,
    already_allocated: i64,
) -> Result<AllocationPlan, LedgerError> {
    installment.ensure_allocatable()?;
    wallet.ensure_active()?;

    if balance.balance < request.amount {
        return Err(LedgerError::InsufficientFunds {
            wallet_id: wallet.id,
            balance: balance.balance,
            requested: request.amount,
        });
    }

    let remaining = remaining(installment.total_amount, already_allocated);
    if request.amount > remaining {
        return Err(LedgerError::AllocationExceedsRemaining {
            installment_id: installment.id,
            remaining,
            requested: request.amount,
        });
    }

    let balance_update = balance.apply(Direction::Debit, request.amount, wallet.require_nonnegative)?;
    let entry = NewLedgerEntry {
        wallet_id: wallet.id,
        owner_id: request.owner_id,
        direction: Direction::Debit,
        amount: request.amount,
        currency: wallet.currency,
        reference_type: ReferenceType::Installment,
        reference_id: Some(installment.id.to_string()),
        description: allocation_description(installment.id, request.notes.as_deref()),
    };

    Ok(AllocationPlan {
        entry,
        balance_update,
    })
}

/// Decides a void: the allocation must be active, the full amount is credited back.
///
/// # Errors
///
/// `AllocationNotActive` if the allocation is already void.
pub fn plan_void(
    allocation: &Allocation,
    wallet: &Wallet,
    balance: &BalanceSnapshot,
) -> Result<VoidPlan, LedgerError> {
    allocation.ensure_active()?;

    let balance_update = balance.apply(Direction::Credit, allocation.amount, wallet.require_nonnegative)?;
    let entry = NewLedgerEntry {
        wallet_id: allocation.wallet_id,
        owner_id: allocation.owner_id,
        direction: Direction::Credit,
        amount: allocation.amount,
        currency: wallet.currency,
        reference_type: ReferenceType::Reversal,
        reference_id: Some(allocation.id.to_string()),
        description: reversal_description(allocation.id),
    };

    Ok(VoidPlan {
        entry,
        balance_update,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use tranche_shared::types::{
        AllocationId, ClientId, Currency, InstallmentId, LedgerTransactionId, OwnerId, WalletId,
    };

    use crate::allocation::types::{
        AllocateRequest, Allocation, AllocationStatus, Installment, InstallmentStatus,
    };
    use crate::ledger::BalanceSnapshot;
    use crate::wallet::{Wallet, WalletStatus, WalletType};

    pub fn installment(owner: OwnerId, total: i64) -> Installment {
        Installment {
            id: InstallmentId::new(),
            owner_id: owner,
            client_id: ClientId::new(),
            product_name: "Washing machine".to_string(),
            total_amount: total,
            status: InstallmentStatus::Active,
        }
    }

    pub fn wallet(owner: OwnerId) -> Wallet {
        Wallet {
            id: WalletId::new(),
            owner_id: owner,
            name: "Cash".to_string(),
            wallet_type: WalletType::Personal,
            currency: Currency::Rub,
            status: WalletStatus::Active,
            require_nonnegative: true,
            allow_partial_allocation: false,
            investor: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn balance(wallet: &Wallet, amount: i64, version: i64) -> BalanceSnapshot {
        BalanceSnapshot {
            wallet_id: wallet.id,
            balance: amount,
            version,
            updated_at: Utc::now(),
        }
    }

    pub fn request(installment: &Installment, wallet: &Wallet, amount: i64) -> AllocateRequest {
        AllocateRequest {
            installment_id: installment.id,
            wallet_id: wallet.id,
            owner_id: wallet.owner_id,
            amount,
            notes: None,
        }
    }

    pub fn allocation(request: &AllocateRequest, status: AllocationStatus) -> Allocation {
        Allocation {
            id: AllocationId::new(),
            installment_id: request.installment_id,
            wallet_id: request.wallet_id,
            owner_id: request.owner_id,
            amount: request.amount,
            status,
            notes: request.notes.clone(),
            transaction_id: LedgerTransactionId::new(),
            created_at: Utc::now(),
        }
    }
}
