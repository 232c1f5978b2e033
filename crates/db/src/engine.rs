//! The ledger engine: every money-moving operation as one owner-scoped,
//! serializable unit of work, re-run on optimistic-concurrency conflicts.
//!
//! Each public operation opens an [`OwnerScope`], runs an `*_in` step against
//! its transaction and hands the outcome to [`OwnerScope::finish`], which
//! commits on success and rolls back on any error.

use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::info;
use tranche_core::allocation::{
    AllocateRequest, Allocation, AllocationList, VoidOutcome, VoidRequest, plan_allocation,
    plan_void,
};
use tranche_core::ledger::{Direction, LedgerPage, LedgerQuery, TopUpOutcome, TopUpRequest};
use tranche_core::wallet::{CreateWalletInput, NewWallet, WalletType, WalletView};
use tranche_core::{LedgerError, RetryPolicy, retry_on_conflict};
use tranche_shared::LedgerConfig;
use tranche_shared::types::{InstallmentId, Money, OwnerId, WalletId};

use crate::error::map_db_err;
use crate::repositories::{
    AllocationRepository, BalanceRepository, InstallmentRepository, LedgerRepository,
    WalletRepository,
};
use crate::rls::{OwnerScope, ScopeMode};

/// A wallet together with one page of its ledger.
#[derive(Debug, Clone)]
pub struct WalletLedger {
    /// Wallet summary as of the listing.
    pub wallet: WalletView,
    /// The requested page, with running balances.
    pub page: LedgerPage,
}

/// Orchestrates wallet creation, top-ups, allocations and voids.
#[derive(Debug, Clone)]
pub struct LedgerEngine {
    db: DatabaseConnection,
    policy: RetryPolicy,
    statement_timeout_ms: u64,
}

impl LedgerEngine {
    /// Creates an engine on a pooled connection.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            policy: RetryPolicy::from(config),
            statement_timeout_ms: config.statement_timeout_ms,
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Opens an owner-scoped transaction with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns a mapped storage error if the transaction cannot be started.
    pub async fn scope(
        &self,
        owner_id: OwnerId,
        mode: ScopeMode,
    ) -> Result<OwnerScope, LedgerError> {
        OwnerScope::begin(&self.db, owner_id, mode, self.statement_timeout_ms)
            .await
            .map_err(map_db_err)
    }

    // ========================================================================
    // Wallet registry
    // ========================================================================

    /// Creates a wallet, its balance row at version 1 and, for a nonzero
    /// opening balance, the opening credit.
    ///
    /// # Errors
    ///
    /// Returns `Validation` listing every problem with the input, or a
    /// storage error.
    pub async fn create_wallet(&self, input: CreateWalletInput) -> Result<WalletView, LedgerError> {
        let new_wallet = &input.validate(Utc::now().date_naive())?;
        let wallet_id = WalletId::new();

        let view = retry_on_conflict(&self.policy, "create_wallet", |_| async move {
            let scope = self.scope(new_wallet.owner_id, ScopeMode::Write).await?;
            let outcome = Self::create_wallet_in(&scope, wallet_id, new_wallet).await;
            scope.finish(outcome).await
        })
        .await?;

        info!(
            wallet_id = %view.wallet.id,
            owner_id = %view.wallet.owner_id,
            wallet_type = view.wallet.wallet_type.as_str(),
            balance = view.balance.balance,
            "Wallet created"
        );
        Ok(view)
    }

    async fn create_wallet_in(
        scope: &OwnerScope,
        wallet_id: WalletId,
        new_wallet: &NewWallet,
    ) -> Result<WalletView, LedgerError> {
        let wallet = WalletRepository::insert(scope.txn(), wallet_id, new_wallet).await?;
        let balance = BalanceRepository::insert_initial(
            scope.txn(),
            new_wallet.owner_id,
            wallet_id,
            new_wallet.opening_balance,
        )
        .await?;

        if let Some(entry) = new_wallet.opening_entry(wallet_id) {
            LedgerRepository::append(scope.txn(), entry, new_wallet.owner_id).await?;
        }

        Ok(WalletView::new(wallet, balance))
    }

    /// Lists an owner's wallets, newest first, with balances and investor
    /// summaries.
    ///
    /// # Errors
    ///
    /// Returns a storage error, or `Internal` if a wallet has no balance row.
    pub async fn list_wallets(
        &self,
        owner_id: OwnerId,
        wallet_type: Option<WalletType>,
    ) -> Result<Vec<WalletView>, LedgerError> {
        let scope = self.scope(owner_id, ScopeMode::Read).await?;
        let outcome = Self::list_wallets_in(&scope, wallet_type).await;
        scope.finish(outcome).await
    }

    async fn list_wallets_in(
        scope: &OwnerScope,
        wallet_type: Option<WalletType>,
    ) -> Result<Vec<WalletView>, LedgerError> {
        let owner_id = scope.owner_id();
        let wallets = WalletRepository::list(scope.txn(), owner_id, wallet_type).await?;
        let ids: Vec<WalletId> = wallets.iter().map(|w| w.id).collect();
        let mut balances = BalanceRepository::find_many(scope.txn(), owner_id, &ids).await?;

        let mut views = Vec::with_capacity(wallets.len());
        for wallet in wallets {
            let Some(balance) = balances.remove(&wallet.id) else {
                return Err(LedgerError::Internal(format!(
                    "Wallet {} has no balance row",
                    wallet.id
                )));
            };
            views.push(WalletView::new(wallet, balance));
        }
        Ok(views)
    }

    /// Fetches one wallet with its balance.
    ///
    /// # Errors
    ///
    /// Returns `WalletNotFound` if absent or owned by someone else.
    pub async fn get_wallet(
        &self,
        owner_id: OwnerId,
        wallet_id: WalletId,
    ) -> Result<WalletView, LedgerError> {
        let scope = self.scope(owner_id, ScopeMode::Read).await?;
        let outcome = Self::wallet_view_in(&scope, wallet_id).await;
        scope.finish(outcome).await
    }

    async fn wallet_view_in(
        scope: &OwnerScope,
        wallet_id: WalletId,
    ) -> Result<WalletView, LedgerError> {
        let wallet = WalletRepository::find(scope.txn(), scope.owner_id(), wallet_id).await?;
        let balance = BalanceRepository::find(scope.txn(), scope.owner_id(), wallet_id).await?;
        Ok(WalletView::new(wallet, balance))
    }

    // ========================================================================
    // Money movement
    // ========================================================================

    /// Credits a wallet.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `WalletNotFound`, `WalletInactive`,
    /// `ConcurrencyExhausted` or a storage error.
    pub async fn top_up(&self, request: TopUpRequest) -> Result<TopUpOutcome, LedgerError> {
        let request = &request.validate()?;

        let outcome = retry_on_conflict(&self.policy, "top_up", |_| async move {
            let scope = self.scope(request.owner_id, ScopeMode::Write).await?;
            let outcome = Self::top_up_in(&scope, request).await;
            scope.finish(outcome).await
        })
        .await?;

        info!(
            wallet_id = %request.wallet_id,
            transaction_id = %outcome.transaction_id,
            amount = request.amount,
            new_balance = outcome.new_balance.minor_units,
            "Wallet topped up"
        );
        Ok(outcome)
    }

    async fn top_up_in(
        scope: &OwnerScope,
        request: &TopUpRequest,
    ) -> Result<TopUpOutcome, LedgerError> {
        let wallet = WalletRepository::find(scope.txn(), request.owner_id, request.wallet_id).await?;
        wallet.ensure_active()?;

        let balance =
            BalanceRepository::find(scope.txn(), request.owner_id, request.wallet_id).await?;
        let update = balance.apply(Direction::Credit, request.amount, wallet.require_nonnegative)?;

        let entry = LedgerRepository::append(
            scope.txn(),
            request.ledger_entry(wallet.currency),
            request.owner_id,
        )
        .await?;
        let snapshot =
            BalanceRepository::apply_update(scope.txn(), request.owner_id, &update).await?;

        Ok(TopUpOutcome {
            transaction_id: entry.id,
            new_balance: Money::new(snapshot.balance, wallet.currency),
            amount_added: Money::new(request.amount, wallet.currency),
        })
    }

    /// Funds an installment from a wallet.
    ///
    /// The installment aggregate, the balance check and the guarded balance
    /// update all run in the same serializable transaction.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, a not-found or invalid-state error,
    /// `InsufficientFunds`, `AllocationExceedsRemaining`,
    /// `ConcurrencyExhausted` or a storage error.
    pub async fn allocate(&self, request: AllocateRequest) -> Result<Allocation, LedgerError> {
        let request = &request.validate()?;

        let allocation = retry_on_conflict(&self.policy, "allocate", |_| async move {
            let scope = self.scope(request.owner_id, ScopeMode::Write).await?;
            let outcome = Self::allocate_in(&scope, request).await;
            scope.finish(outcome).await
        })
        .await?;

        info!(
            allocation_id = %allocation.id,
            installment_id = %allocation.installment_id,
            wallet_id = %allocation.wallet_id,
            amount = allocation.amount,
            "Allocation created"
        );
        Ok(allocation)
    }

    async fn allocate_in(
        scope: &OwnerScope,
        request: &AllocateRequest,
    ) -> Result<Allocation, LedgerError> {
        let owner_id = request.owner_id;
        let installment =
            InstallmentRepository::find(scope.txn(), owner_id, request.installment_id).await?;
        installment.ensure_allocatable()?;

        let wallet = WalletRepository::find(scope.txn(), owner_id, request.wallet_id).await?;
        let balance = BalanceRepository::find(scope.txn(), owner_id, request.wallet_id).await?;
        let already_allocated =
            AllocationRepository::active_total(scope.txn(), owner_id, installment.id).await?;

        let plan = plan_allocation(request, &installment, &wallet, &balance, already_allocated)?;

        let entry = LedgerRepository::append(scope.txn(), plan.entry, owner_id).await?;
        let allocation = AllocationRepository::insert(scope.txn(), request, entry.id).await?;
        BalanceRepository::apply_update(scope.txn(), owner_id, &plan.balance_update).await?;

        Ok(allocation)
    }

    /// Voids an active allocation and credits its amount back.
    ///
    /// # Errors
    ///
    /// Returns `AllocationNotFound`, `AllocationNotActive`,
    /// `ConcurrencyExhausted` or a storage error.
    pub async fn void_allocation(&self, request: VoidRequest) -> Result<VoidOutcome, LedgerError> {
        let outcome = retry_on_conflict(&self.policy, "void_allocation", |_| async move {
            let scope = self.scope(request.owner_id, ScopeMode::Write).await?;
            let outcome = Self::void_in(&scope, request).await;
            scope.finish(outcome).await
        })
        .await?;

        info!(
            allocation_id = %outcome.allocation_id,
            installment_id = %request.installment_id,
            reversal_transaction_id = %outcome.reversal_transaction_id,
            new_balance = outcome.new_balance.minor_units,
            "Allocation voided"
        );
        Ok(outcome)
    }

    async fn void_in(scope: &OwnerScope, request: VoidRequest) -> Result<VoidOutcome, LedgerError> {
        let owner_id = request.owner_id;
        let allocation = AllocationRepository::find(
            scope.txn(),
            owner_id,
            request.installment_id,
            request.allocation_id,
        )
        .await?;
        allocation.ensure_active()?;

        let wallet = WalletRepository::find(scope.txn(), owner_id, allocation.wallet_id).await?;
        let balance = BalanceRepository::find(scope.txn(), owner_id, allocation.wallet_id).await?;
        let plan = plan_void(&allocation, &wallet, &balance)?;

        AllocationRepository::mark_void(scope.txn(), owner_id, allocation.id).await?;
        let entry = LedgerRepository::append(scope.txn(), plan.entry, owner_id).await?;
        let snapshot =
            BalanceRepository::apply_update(scope.txn(), owner_id, &plan.balance_update).await?;

        Ok(VoidOutcome {
            allocation_id: allocation.id,
            reversal_transaction_id: entry.id,
            new_balance: Money::new(snapshot.balance, wallet.currency),
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Returns a wallet summary and one page of its ledger, newest first,
    /// with running balances folded back from the current balance.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an inverted date range, `WalletNotFound`,
    /// or a storage error.
    pub async fn get_ledger(&self, query: LedgerQuery) -> Result<WalletLedger, LedgerError> {
        query.validate()?;

        let scope = self.scope(query.owner_id, ScopeMode::Read).await?;
        let outcome = Self::ledger_in(&scope, &query).await;
        scope.finish(outcome).await
    }

    async fn ledger_in(
        scope: &OwnerScope,
        query: &LedgerQuery,
    ) -> Result<WalletLedger, LedgerError> {
        let wallet = Self::wallet_view_in(scope, query.wallet_id).await?;
        let entries = LedgerRepository::list(scope.txn(), query).await?;

        Ok(WalletLedger {
            page: LedgerPage::build(wallet.balance.balance, entries, query.limit),
            wallet,
        })
    }

    /// Lists an installment's allocations, newest first, with its active
    /// total and remaining amount.
    ///
    /// # Errors
    ///
    /// Returns `InstallmentNotFound` or a storage error.
    pub async fn list_allocations(
        &self,
        owner_id: OwnerId,
        installment_id: InstallmentId,
    ) -> Result<AllocationList, LedgerError> {
        let scope = self.scope(owner_id, ScopeMode::Read).await?;
        let outcome = Self::allocations_in(&scope, installment_id).await;
        scope.finish(outcome).await
    }

    async fn allocations_in(
        scope: &OwnerScope,
        installment_id: InstallmentId,
    ) -> Result<AllocationList, LedgerError> {
        let owner_id = scope.owner_id();
        let installment = InstallmentRepository::find(scope.txn(), owner_id, installment_id).await?;
        let allocations = AllocationRepository::list(scope.txn(), owner_id, installment_id).await?;
        Ok(AllocationList::new(installment, allocations))
    }

    /// Reads a wallet's balance and the signed sum of its ledger in one
    /// snapshot. The two are equal for every wallet the engine wrote.
    ///
    /// Returns `(balance, ledger_total)`.
    ///
    /// # Errors
    ///
    /// Returns `WalletNotFound` or a storage error.
    pub async fn reconcile(
        &self,
        owner_id: OwnerId,
        wallet_id: WalletId,
    ) -> Result<(i64, i64), LedgerError> {
        let scope = self.scope(owner_id, ScopeMode::Read).await?;
        let outcome = Self::reconcile_in(&scope, wallet_id).await;
        scope.finish(outcome).await
    }

    async fn reconcile_in(
        scope: &OwnerScope,
        wallet_id: WalletId,
    ) -> Result<(i64, i64), LedgerError> {
        let owner_id = scope.owner_id();
        let balance = BalanceRepository::find(scope.txn(), owner_id, wallet_id).await?;
        let total = LedgerRepository::signed_total(scope.txn(), owner_id, wallet_id).await?;
        Ok((balance.balance, total))
    }
}
