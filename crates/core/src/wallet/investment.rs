//! Investor wallet profit summary.
//!
//! A pure function of the investor terms and the current balance. Active
//! allocations are not added back: money lent out to installments counts as
//! not yet returned.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use super::types::InvestorTerms;

/// Profit position of an investor wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvestmentSummary {
    /// Amount invested, in minor units.
    pub total_invested: i64,
    /// Current wallet balance, in minor units.
    pub current_wallet_value: i64,
    /// `max(0, value - invested)`.
    pub total_profit: i64,
    /// Investor's cut of the profit, truncated to the minor unit.
    pub investor_profit_share: i64,
    /// `invested + investor_profit_share`.
    pub expected_returns: i64,
    /// `investor_profit_share / invested * 100`, two decimal places.
    pub roi_percentage: Decimal,
}

impl InvestmentSummary {
    /// Computes the summary for the given terms and current balance.
    #[must_use]
    pub fn compute(terms: &InvestorTerms, current_balance: i64) -> Self {
        let invested = terms.investment_amount;
        let total_profit = current_balance.saturating_sub(invested).max(0);

        let investor_profit_share = if total_profit > 0 {
            (Decimal::from(total_profit) * terms.investor_percentage / Decimal::ONE_HUNDRED)
                .trunc()
                .to_i64()
                .unwrap_or(0)
        } else {
            0
        };

        let roi_percentage = if invested > 0 {
            (Decimal::from(investor_profit_share) / Decimal::from(invested) * Decimal::ONE_HUNDRED)
                .round_dp(2)
        } else {
            Decimal::ZERO
        };

        Self {
            total_invested: invested,
            current_wallet_value: current_balance,
            total_profit,
            investor_profit_share,
            expected_returns: invested.saturating_add(investor_profit_share),
            roi_percentage,
        }
    }
}
