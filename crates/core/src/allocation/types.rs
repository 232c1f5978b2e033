//! Allocation and installment domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tranche_shared::types::{
    AllocationId, ClientId, InstallmentId, LedgerTransactionId, Money, OwnerId, WalletId,
};

use crate::ledger::LedgerError;

/// Maximum length of allocation notes, in characters.
pub const MAX_NOTES_LEN: usize = 500;

/// Allocation lifecycle: `Active -> Void`, and void is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStatus {
    /// Counts against the installment total.
    Active,
    /// Reversed; no longer counts.
    Void,
}

/// Installment status, owned by the installment CRUD layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    /// Payments are still expected.
    Active,
    /// Fully paid.
    Completed,
    /// Cancelled; cannot receive allocations.
    Cancelled,
}

/// The slice of an installment the allocation manager reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installment {
    /// Installment ID.
    pub id: InstallmentId,
    /// Owner.
    pub owner_id: OwnerId,
    /// Client the goods were sold to.
    pub client_id: ClientId,
    /// What was sold.
    pub product_name: String,
    /// Allocation cap, in minor units.
    pub total_amount: i64,
    /// Status.
    pub status: InstallmentStatus,
}

impl Installment {
    /// Fails with `InstallmentCancelled` for cancelled installments.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InstallmentCancelled` if the installment is cancelled.
    pub fn ensure_allocatable(&self) -> Result<(), LedgerError> {
        if self.status == InstallmentStatus::Cancelled {
            return Err(LedgerError::InstallmentCancelled(self.id));
        }
        Ok(())
    }
}

/// A link between a wallet debit and an installment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    /// Allocation ID.
    pub id: AllocationId,
    /// Funded installment.
    pub installment_id: InstallmentId,
    /// Wallet the money came from.
    pub wallet_id: WalletId,
    /// Owner.
    pub owner_id: OwnerId,
    /// Amount in minor units.
    pub amount: i64,
    /// Lifecycle status.
    pub status: AllocationStatus,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// Originating debit entry.
    pub transaction_id: LedgerTransactionId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Allocation {
    /// Fails with `AllocationNotActive` unless the allocation is active.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AllocationNotActive` for void allocations.
    pub fn ensure_active(&self) -> Result<(), LedgerError> {
        if self.status == AllocationStatus::Active {
            Ok(())
        } else {
            Err(LedgerError::AllocationNotActive(self.id))
        }
    }
}

/// Request to fund an installment from a wallet.
#[derive(Debug, Clone)]
pub struct AllocateRequest {
    /// Installment to fund.
    pub installment_id: InstallmentId,
    /// Source wallet.
    pub wallet_id: WalletId,
    /// Authenticated owner.
    pub owner_id: OwnerId,
    /// Amount in minor units, must be positive.
    pub amount: i64,
    /// Optional notes, at most 500 characters.
    pub notes: Option<String>,
}

impl AllocateRequest {
    /// Validates the request and returns it with trimmed notes.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` listing every violated rule.
    pub fn validate(self) -> Result<Self, LedgerError> {
        let mut errors = Vec::new();
        if self.amount < 1 {
            errors.push("amount_minor_units must be at least 1".to_string());
        }
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if notes
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
        {
            errors.push(format!("notes must be at most {MAX_NOTES_LEN} characters"));
        }
        if !errors.is_empty() {
            return Err(LedgerError::Validation(errors.join("; ")));
        }
        Ok(Self { notes, ..self })
    }
}

/// Request to void an allocation.
#[derive(Debug, Clone, Copy)]
pub struct VoidRequest {
    /// Installment the allocation belongs to.
    pub installment_id: InstallmentId,
    /// Allocation to void.
    pub allocation_id: AllocationId,
    /// Authenticated owner.
    pub owner_id: OwnerId,
}

/// Result of a successful void.
#[derive(Debug, Clone)]
pub struct VoidOutcome {
    /// The voided allocation.
    pub allocation_id: AllocationId,
    /// The reversal credit entry.
    pub reversal_transaction_id: LedgerTransactionId,
    /// Wallet balance after the reversal.
    pub new_balance: Money,
}

/// An installment's allocations with the cap position.
#[derive(Debug, Clone, Serialize)]
pub struct AllocationList {
    /// The installment.
    pub installment: Installment,
    /// All allocations, newest first.
    pub allocations: Vec<Allocation>,
    /// Sum of active allocations.
    pub allocated_total: i64,
    /// `total_amount - allocated_total`, never below zero.
    pub remaining: i64,
}

impl AllocationList {
    /// Builds the listing and its totals.
    #[must_use]
    pub fn new(installment: Installment, allocations: Vec<Allocation>) -> Self {
        let allocated_total = allocations
            .iter()
            .filter(|a| a.status == AllocationStatus::Active)
            .fold(0i64, |acc, a| acc.saturating_add(a.amount));
        let remaining = super::rules::remaining(installment.total_amount, allocated_total);
        Self {
            installment,
            allocations,
            allocated_total,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_request_trims_notes() {
        let req = AllocateRequest {
            installment_id: InstallmentId::new(),
            wallet_id: WalletId::new(),
            owner_id: OwnerId::new(),
            amount: 100,
            notes: Some("  first payment ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(req.notes.as_deref(), Some("first payment"));
    }

    #[test]
    fn test_allocate_request_rejects_bad_input() {
        let result = AllocateRequest {
            installment_id: InstallmentId::new(),
            wallet_id: WalletId::new(),
            owner_id: OwnerId::new(),
            amount: 0,
            notes: Some("x".repeat(501)),
        }
        .validate();
        let Err(LedgerError::Validation(msg)) = result else {
            panic!("expected validation error");
        };
        assert!(msg.contains("amount_minor_units"));
        assert!(msg.contains("notes"));
    }

    #[test]
    fn test_allocation_list_counts_active_only() {
        let owner = OwnerId::new();
        let installment = Installment {
            id: InstallmentId::new(),
            owner_id: owner,
            client_id: ClientId::new(),
            product_name: "Phone".to_string(),
            total_amount: 3_000_000,
            status: InstallmentStatus::Active,
        };
        let allocation = |amount, status| Allocation {
            id: AllocationId::new(),
            installment_id: installment.id,
            wallet_id: WalletId::new(),
            owner_id: owner,
            amount,
            status,
            notes: None,
            transaction_id: LedgerTransactionId::new(),
            created_at: Utc::now(),
        };
        let allocations = vec![
            allocation(1_000_000, AllocationStatus::Active),
            allocation(2_000_000, AllocationStatus::Void),
            allocation(500_000, AllocationStatus::Active),
        ];

        let list = AllocationList::new(installment.clone(), allocations);
        assert_eq!(list.allocated_total, 1_500_000);
        assert_eq!(list.remaining, 1_500_000);
    }
}
