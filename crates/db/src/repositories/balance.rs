//! Balance store: one row per wallet, guarded by an optimistic version.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tranche_core::LedgerError;
use tranche_core::ledger::{BalanceSnapshot, BalanceUpdate};
use tranche_shared::types::{OwnerId, WalletId};

use crate::entities::wallet_balances;
use crate::error::map_db_err;

/// Balance repository.
#[derive(Debug, Clone, Copy)]
pub struct BalanceRepository;

impl BalanceRepository {
    /// Inserts the balance row for a new wallet at version 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_initial<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        wallet_id: WalletId,
        balance: i64,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let model = wallet_balances::ActiveModel {
            wallet_id: Set(wallet_id.into_inner()),
            owner_id: Set(owner_id.into_inner()),
            balance_minor_units: Set(balance),
            version: Set(1),
            updated_at: Set(Utc::now().fixed_offset()),
        };

        let inserted = model.insert(conn).await.map_err(map_db_err)?;
        Ok(BalanceSnapshot::from(inserted))
    }

    /// Reads a wallet's balance row.
    ///
    /// # Errors
    ///
    /// Returns `WalletNotFound` if no row is visible to the owner.
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        wallet_id: WalletId,
    ) -> Result<BalanceSnapshot, LedgerError> {
        wallet_balances::Entity::find_by_id(wallet_id.into_inner())
            .filter(wallet_balances::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await
            .map_err(map_db_err)?
            .map(BalanceSnapshot::from)
            .ok_or(LedgerError::WalletNotFound(wallet_id))
    }

    /// Reads the balance rows of several wallets, keyed by wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_many<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        wallet_ids: &[WalletId],
    ) -> Result<HashMap<WalletId, BalanceSnapshot>, LedgerError> {
        if wallet_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = wallet_balances::Entity::find()
            .filter(wallet_balances::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(
                wallet_balances::Column::WalletId
                    .is_in(wallet_ids.iter().copied().map(WalletId::into_inner)),
            )
            .all(conn)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let snapshot = BalanceSnapshot::from(row);
                (snapshot.wallet_id, snapshot)
            })
            .collect())
    }

    /// Applies a guarded balance update.
    ///
    /// The write only lands if the row still carries `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` when zero rows were affected, so the retry
    /// loop re-runs the whole attempt.
    pub async fn apply_update<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        update: &BalanceUpdate,
    ) -> Result<BalanceSnapshot, LedgerError> {
        let now = Utc::now();

        let result = wallet_balances::Entity::update_many()
            .col_expr(
                wallet_balances::Column::BalanceMinorUnits,
                Expr::value(update.new_balance),
            )
            .col_expr(wallet_balances::Column::Version, Expr::value(update.new_version))
            .col_expr(
                wallet_balances::Column::UpdatedAt,
                Expr::value(now.fixed_offset()),
            )
            .filter(wallet_balances::Column::WalletId.eq(update.wallet_id.into_inner()))
            .filter(wallet_balances::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(wallet_balances::Column::Version.eq(update.expected_version))
            .exec(conn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::VersionConflict {
                wallet_id: update.wallet_id,
                expected_version: update.expected_version,
            });
        }

        Ok(BalanceSnapshot {
            wallet_id: update.wallet_id,
            balance: update.new_balance,
            version: update.new_version,
            updated_at: now,
        })
    }
}
