//! Wallet domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tranche_shared::types::{Currency, OwnerId, WalletId};

use crate::ledger::{BalanceSnapshot, LedgerError};

use super::investment::InvestmentSummary;

/// Wallet kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    /// The owner's own money.
    Personal,
    /// Money put in by an investor under a profit-sharing agreement.
    Investor,
}

impl WalletType {
    /// Returns the storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Investor => "investor",
        }
    }
}

impl std::str::FromStr for WalletType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "personal" => Ok(Self::Personal),
            "investor" => Ok(Self::Investor),
            other => Err(LedgerError::Validation(format!(
                "type must be 'personal' or 'investor', got '{other}'"
            ))),
        }
    }
}

/// Wallet lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    /// Accepts money movement.
    Active,
    /// Read-only.
    Archived,
}

/// Profit-sharing terms of an investor wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestorTerms {
    /// Amount invested, in minor units.
    pub investment_amount: i64,
    /// Investor's share of profit, 0-100.
    pub investor_percentage: Decimal,
    /// Owner's share of profit, 0-100.
    pub user_percentage: Decimal,
    /// Agreed date the investment is returned.
    pub investment_return_date: NaiveDate,
}

/// Wallet metadata. Immutable apart from `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Wallet ID.
    pub id: WalletId,
    /// Owner.
    pub owner_id: OwnerId,
    /// Display name.
    pub name: String,
    /// Wallet kind.
    pub wallet_type: WalletType,
    /// Currency of every amount on the wallet.
    pub currency: Currency,
    /// Lifecycle status.
    pub status: WalletStatus,
    /// Debits may never take the balance below zero.
    pub require_nonnegative: bool,
    /// Stored policy flag; allocations are all-or-nothing regardless.
    pub allow_partial_allocation: bool,
    /// Present for investor wallets.
    pub investor: Option<InvestorTerms>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last metadata change.
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Returns true if the wallet accepts money movement.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == WalletStatus::Active
    }

    /// Fails with `WalletInactive` unless the wallet is active.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::WalletInactive` for archived wallets.
    pub fn ensure_active(&self) -> Result<(), LedgerError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(LedgerError::WalletInactive(self.id))
        }
    }
}

/// A wallet with its balance row and, for investor wallets, the investment summary.
#[derive(Debug, Clone, Serialize)]
pub struct WalletView {
    /// Wallet metadata.
    pub wallet: Wallet,
    /// Current balance row.
    pub balance: BalanceSnapshot,
    /// Investment summary for investor wallets.
    pub investment_summary: Option<InvestmentSummary>,
}

impl WalletView {
    /// Combines a wallet with its balance and derives the investment summary.
    #[must_use]
    pub fn new(wallet: Wallet, balance: BalanceSnapshot) -> Self {
        let investment_summary = wallet
            .investor
            .as_ref()
            .map(|terms| InvestmentSummary::compute(terms, balance.balance));
        Self {
            wallet,
            balance,
            investment_summary,
        }
    }
}
