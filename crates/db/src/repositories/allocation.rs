//! Installment allocation persistence.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tranche_core::LedgerError;
use tranche_core::allocation::{AllocateRequest, Allocation};
use tranche_shared::types::{AllocationId, InstallmentId, LedgerTransactionId, OwnerId};

use crate::entities::{installment_allocations, sea_orm_active_enums::AllocationStatus};
use crate::error::map_db_err;

/// Allocation repository.
#[derive(Debug, Clone, Copy)]
pub struct AllocationRepository;

impl AllocationRepository {
    /// Sums the active allocations of an installment.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sum overflows.
    pub async fn active_total<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        installment_id: InstallmentId,
    ) -> Result<i64, LedgerError> {
        let amounts: Vec<i64> = installment_allocations::Entity::find()
            .select_only()
            .column(installment_allocations::Column::AmountMinorUnits)
            .filter(installment_allocations::Column::InstallmentId.eq(installment_id.into_inner()))
            .filter(installment_allocations::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(installment_allocations::Column::Status.eq(AllocationStatus::Active))
            .into_tuple()
            .all(conn)
            .await
            .map_err(map_db_err)?;

        amounts
            .into_iter()
            .try_fold(0i64, i64::checked_add)
            .ok_or_else(|| LedgerError::Internal("Allocation total overflow".to_string()))
    }

    /// Inserts an active allocation linked to its originating debit.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        request: &AllocateRequest,
        transaction_id: LedgerTransactionId,
    ) -> Result<Allocation, LedgerError> {
        let now = Utc::now().fixed_offset();
        let model = installment_allocations::ActiveModel {
            id: Set(AllocationId::new().into_inner()),
            installment_id: Set(request.installment_id.into_inner()),
            wallet_id: Set(request.wallet_id.into_inner()),
            owner_id: Set(request.owner_id.into_inner()),
            amount_minor_units: Set(request.amount),
            status: Set(AllocationStatus::Active),
            notes: Set(request.notes.clone()),
            transaction_id: Set(transaction_id.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(conn).await.map_err(map_db_err)?;
        Ok(Allocation::from(inserted))
    }

    /// Finds an allocation by owner and installment.
    ///
    /// # Errors
    ///
    /// Returns `AllocationNotFound` if no such allocation exists for the
    /// owner under that installment.
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        installment_id: InstallmentId,
        allocation_id: AllocationId,
    ) -> Result<Allocation, LedgerError> {
        installment_allocations::Entity::find_by_id(allocation_id.into_inner())
            .filter(installment_allocations::Column::InstallmentId.eq(installment_id.into_inner()))
            .filter(installment_allocations::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await
            .map_err(map_db_err)?
            .map(Allocation::from)
            .ok_or(LedgerError::AllocationNotFound(allocation_id))
    }

    /// Marks an active allocation as void. Only the status changes.
    ///
    /// # Errors
    ///
    /// Returns `AllocationNotActive` if the allocation was no longer active
    /// when the update ran.
    pub async fn mark_void<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        allocation_id: AllocationId,
    ) -> Result<(), LedgerError> {
        let result = installment_allocations::Entity::update_many()
            .set(installment_allocations::ActiveModel {
                status: Set(AllocationStatus::Void),
                updated_at: Set(Utc::now().fixed_offset()),
                ..Default::default()
            })
            .filter(installment_allocations::Column::Id.eq(allocation_id.into_inner()))
            .filter(installment_allocations::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(installment_allocations::Column::Status.eq(AllocationStatus::Active))
            .exec(conn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::AllocationNotActive(allocation_id));
        }

        Ok(())
    }

    /// Lists all allocations of an installment, newest first, any status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        installment_id: InstallmentId,
    ) -> Result<Vec<Allocation>, LedgerError> {
        Ok(installment_allocations::Entity::find()
            .filter(installment_allocations::Column::InstallmentId.eq(installment_id.into_inner()))
            .filter(installment_allocations::Column::OwnerId.eq(owner_id.into_inner()))
            .order_by_desc(installment_allocations::Column::CreatedAt)
            .order_by_desc(installment_allocations::Column::Id)
            .all(conn)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(Allocation::from)
            .collect())
    }
}
