//! Wallet balance arithmetic and running-balance reconstruction.
//!
//! A wallet's balance row is the single serialization point for money movement:
//! every mutation reads a `BalanceSnapshot`, computes a `BalanceUpdate`, and
//! writes it back guarded on the version it read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tranche_shared::types::WalletId;

use super::error::LedgerError;
use super::types::Direction;

/// Balance row of a wallet as read at the start of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// The wallet ID.
    pub wallet_id: WalletId,
    /// Signed balance in minor units.
    pub balance: i64,
    /// Version counter, starts at 1.
    pub version: i64,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
}

/// A guarded balance write: applies only if the stored version is still `expected_version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceUpdate {
    /// The wallet ID.
    pub wallet_id: WalletId,
    /// Version the update was computed from.
    pub expected_version: i64,
    /// Balance after the movement.
    pub new_balance: i64,
    /// `expected_version + 1`.
    pub new_version: i64,
}

impl BalanceSnapshot {
    /// Computes the balance write for moving `amount` in `direction`.
    ///
    /// # Errors
    ///
    /// - `Validation` if `amount` is not positive or the result overflows.
    /// - `InsufficientFunds` if the result is negative and `require_nonnegative` is set.
    pub fn apply(
        &self,
        direction: Direction,
        amount: i64,
        require_nonnegative: bool,
    ) -> Result<BalanceUpdate, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::Validation(
                "amount must be positive".to_string(),
            ));
        }

        let new_balance = self
            .balance
            .checked_add(direction.signed(amount))
            .ok_or_else(|| LedgerError::Validation("amount overflows wallet balance".to_string()))?;

        if require_nonnegative && new_balance < 0 {
            return Err(LedgerError::InsufficientFunds {
                wallet_id: self.wallet_id,
                balance: self.balance,
                requested: amount,
            });
        }

        let new_version = self
            .version
            .checked_add(1)
            .ok_or_else(|| LedgerError::Internal("balance version overflow".to_string()))?;

        Ok(BalanceUpdate {
            wallet_id: self.wallet_id,
            expected_version: self.version,
            new_balance,
            new_version,
        })
    }
}

/// Reconstructs per-row running balances for a newest-first page of signed amounts.
///
/// The newest row shows `current_balance`; each older row shows the newer row's
/// value minus the newer row's signed amount.
#[must_use]
pub fn running_balances(current_balance: i64, signed_amounts_newest_first: &[i64]) -> Vec<i64> {
    let mut out = Vec::with_capacity(signed_amounts_newest_first.len());
    let mut running = current_balance;
    for signed in signed_amounts_newest_first {
        out.push(running);
        running = running.saturating_sub(*signed);
    }
    out
}
