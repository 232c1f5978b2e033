//! Wallet registry persistence.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tranche_core::LedgerError;
use tranche_core::wallet::{NewWallet, Wallet, WalletType};
use tranche_shared::types::{OwnerId, WalletId};

use crate::entities::{sea_orm_active_enums, wallets};
use crate::error::map_db_err;

/// Wallet repository.
#[derive(Debug, Clone, Copy)]
pub struct WalletRepository;

impl WalletRepository {
    /// Inserts a validated wallet as `active`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert<C: ConnectionTrait>(
        conn: &C,
        wallet_id: WalletId,
        new_wallet: &NewWallet,
    ) -> Result<Wallet, LedgerError> {
        let now = Utc::now().fixed_offset();
        let terms = new_wallet.investor.as_ref();

        let model = wallets::ActiveModel {
            id: Set(wallet_id.into_inner()),
            owner_id: Set(new_wallet.owner_id.into_inner()),
            name: Set(new_wallet.name.clone()),
            wallet_type: Set(new_wallet.wallet_type.into()),
            currency: Set(new_wallet.currency.code().to_string()),
            status: Set(sea_orm_active_enums::WalletStatus::Active),
            require_nonnegative: Set(true),
            allow_partial_allocation: Set(false),
            investment_amount_minor_units: Set(terms.map(|t| t.investment_amount)),
            investor_percentage: Set(terms.map(|t| t.investor_percentage)),
            user_percentage: Set(terms.map(|t| t.user_percentage)),
            investment_return_date: Set(terms.map(|t| t.investment_return_date)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = model.insert(conn).await.map_err(map_db_err)?;
        Wallet::try_from(inserted)
    }

    /// Finds a wallet owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `WalletNotFound` if the wallet is absent or belongs to another owner.
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        wallet_id: WalletId,
    ) -> Result<Wallet, LedgerError> {
        let model = wallets::Entity::find_by_id(wallet_id.into_inner())
            .filter(wallets::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await
            .map_err(map_db_err)?
            .ok_or(LedgerError::WalletNotFound(wallet_id))?;

        Wallet::try_from(model)
    }

    /// Lists an owner's wallets, newest first, optionally of one type.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        owner_id: OwnerId,
        wallet_type: Option<WalletType>,
    ) -> Result<Vec<Wallet>, LedgerError> {
        let mut query =
            wallets::Entity::find().filter(wallets::Column::OwnerId.eq(owner_id.into_inner()));

        if let Some(wallet_type) = wallet_type {
            query = query.filter(
                wallets::Column::WalletType.eq(sea_orm_active_enums::WalletType::from(wallet_type)),
            );
        }

        query
            .order_by_desc(wallets::Column::CreatedAt)
            .order_by_desc(wallets::Column::Id)
            .all(conn)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(Wallet::try_from)
            .collect()
    }
}
