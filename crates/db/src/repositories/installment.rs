//! Installment reads. Installments are owned by the CRUD layer; the ledger
//! only reads them, apart from the seeder and tests.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tranche_core::LedgerError;
use tranche_core::allocation::{Installment, InstallmentStatus};
use tranche_shared::types::{ClientId, InstallmentId, OwnerId};

use crate::entities::installments;
use crate::error::map_db_err;

/// Input for inserting an installment.
#[derive(Debug, Clone)]
pub struct NewInstallment {
    /// Owner of the installment.
    pub owner_id: OwnerId,
    /// Client buying the product.
    pub client_id: ClientId,
    /// Product being paid off.
    pub product_name: String,
    /// Total amount in minor units.
    pub total_amount: i64,
    /// Initial status.
    pub status: InstallmentStatus,
}

/// Installment repository.
#[derive(Debug, Clone, Copy)]
pub struct InstallmentRepository;

impl InstallmentRepository {
    /// Finds an installment owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `InstallmentNotFound` if it is absent or belongs to another owner.
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        installment_id: InstallmentId,
    ) -> Result<Installment, LedgerError> {
        installments::Entity::find_by_id(installment_id.into_inner())
            .filter(installments::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await
            .map_err(map_db_err)?
            .map(Installment::from)
            .ok_or(LedgerError::InstallmentNotFound(installment_id))
    }

    /// Inserts an installment.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        input: NewInstallment,
    ) -> Result<Installment, LedgerError> {
        let now = Utc::now().fixed_offset();
        let model = installments::ActiveModel {
            id: Set(InstallmentId::new().into_inner()),
            owner_id: Set(input.owner_id.into_inner()),
            client_id: Set(input.client_id.into_inner()),
            product_name: Set(input.product_name),
            total_amount_minor_units: Set(input.total_amount),
            status: Set(input.status.into()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(conn).await.map_err(map_db_err)?;
        Ok(Installment::from(inserted))
    }
}
