//! Transaction ledger persistence. Append and read only.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tranche_core::LedgerError;
use tranche_core::ledger::{Direction, LedgerEntry, LedgerQuery, NewLedgerEntry};
use tranche_shared::types::{LedgerTransactionId, OwnerId, WalletId};

use crate::entities::{ledger_transactions, sea_orm_active_enums};
use crate::error::map_db_err;

/// Ledger repository.
///
/// Entries are never updated or deleted; the table's triggers reject both.
#[derive(Debug, Clone, Copy)]
pub struct LedgerRepository;

impl LedgerRepository {
    /// Appends one entry, recorded as created by `created_by`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        entry: NewLedgerEntry,
        created_by: OwnerId,
    ) -> Result<LedgerEntry, LedgerError> {
        let model = ledger_transactions::ActiveModel {
            id: Set(LedgerTransactionId::new().into_inner()),
            wallet_id: Set(entry.wallet_id.into_inner()),
            owner_id: Set(entry.owner_id.into_inner()),
            direction: Set(sea_orm_active_enums::LedgerDirection::from(entry.direction)),
            amount_minor_units: Set(entry.amount),
            currency: Set(entry.currency.code().to_string()),
            reference_type: Set(sea_orm_active_enums::LedgerReferenceType::from(
                entry.reference_type,
            )),
            reference_id: Set(entry.reference_id),
            description: Set(entry.description),
            created_by: Set(created_by.into_inner()),
            created_at: Set(Utc::now().fixed_offset()),
        };

        let inserted = model.insert(conn).await.map_err(map_db_err)?;
        LedgerEntry::try_from(inserted)
    }

    /// Lists a wallet's entries newest first (`created_at DESC, id DESC`),
    /// applying the query's filters and limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        query: &LedgerQuery,
    ) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut select = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::WalletId.eq(query.wallet_id.into_inner()))
            .filter(ledger_transactions::Column::OwnerId.eq(query.owner_id.into_inner()));

        if let Some(reference_type) = query.reference_type {
            select = select.filter(
                ledger_transactions::Column::ReferenceType
                    .eq(sea_orm_active_enums::LedgerReferenceType::from(reference_type)),
            );
        }

        if let Some(start) = query.start {
            select = select.filter(ledger_transactions::Column::CreatedAt.gte(start.fixed_offset()));
        }

        if let Some(end) = query.end {
            select = select.filter(ledger_transactions::Column::CreatedAt.lte(end.fixed_offset()));
        }

        select
            .order_by_desc(ledger_transactions::Column::CreatedAt)
            .order_by_desc(ledger_transactions::Column::Id)
            .limit(query.limit.as_u64())
            .all(conn)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect()
    }

    /// Returns the signed sum of every entry of a wallet.
    ///
    /// Used to check that a balance row agrees with its ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the sum overflows.
    pub async fn signed_total<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        wallet_id: WalletId,
    ) -> Result<i64, LedgerError> {
        let rows: Vec<(sea_orm_active_enums::LedgerDirection, i64)> =
            ledger_transactions::Entity::find()
                .select_only()
                .column(ledger_transactions::Column::Direction)
                .column(ledger_transactions::Column::AmountMinorUnits)
                .filter(ledger_transactions::Column::WalletId.eq(wallet_id.into_inner()))
                .filter(ledger_transactions::Column::OwnerId.eq(owner_id.into_inner()))
                .into_tuple()
                .all(conn)
                .await
                .map_err(map_db_err)?;

        rows.into_iter()
            .try_fold(0i64, |acc, (direction, amount)| {
                let signed = Direction::from(direction).signed(amount);
                acc.checked_add(signed)
            })
            .ok_or_else(|| LedgerError::Internal("Ledger total overflow".to_string()))
    }
}
