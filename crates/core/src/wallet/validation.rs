//! Wallet creation input and its validation rules.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tranche_shared::types::{Currency, Money, OwnerId, WalletId};

use crate::ledger::{Direction, LedgerError, NewLedgerEntry, ReferenceType};

use super::types::{InvestorTerms, WalletType};

/// Maximum wallet name length, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Raw wallet creation input, as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct CreateWalletInput {
    /// Authenticated owner.
    pub owner_id: OwnerId,
    /// Display name.
    pub name: String,
    /// `personal` or `investor`.
    pub wallet_type: String,
    /// Currency code, defaults to RUB.
    pub currency: Option<String>,
    /// Opening balance of a personal wallet, minor units.
    pub initial_balance: Option<i64>,
    /// Investor wallets: amount invested, minor units.
    pub investment_amount: Option<i64>,
    /// Investor wallets: investor's profit share.
    pub investor_percentage: Option<Decimal>,
    /// Investor wallets: owner's profit share.
    pub user_percentage: Option<Decimal>,
    /// Investor wallets: agreed return date.
    pub investment_return_date: Option<NaiveDate>,
}

/// A validated wallet ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWallet {
    /// Owner.
    pub owner_id: OwnerId,
    /// Trimmed display name.
    pub name: String,
    /// Wallet kind.
    pub wallet_type: WalletType,
    /// Currency.
    pub currency: Currency,
    /// Present for investor wallets.
    pub investor: Option<InvestorTerms>,
    /// Balance the wallet opens with: the investment for investor wallets.
    pub opening_balance: i64,
}

impl CreateWalletInput {
    /// Validates the input, collecting every violation into one error.
    ///
    /// `today` is the date the return date must be strictly after.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` listing every violated rule.
    pub fn validate(self, today: NaiveDate) -> Result<NewWallet, LedgerError> {
        let mut errors: Vec<String> = Vec::new();

        let name = self.name.trim().to_string();
        let name_len = name.chars().count();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            errors.push(format!("name must be 1-{MAX_NAME_LEN} characters"));
        }

        let wallet_type = WalletType::from_str(&self.wallet_type)
            .map_err(|e| push_validation(&mut errors, e))
            .ok();

        let currency = match self.currency.as_deref() {
            None => Some(Currency::Rub),
            Some(code) => Currency::from_str(code)
                .map_err(|_| errors.push(format!("currency must be RUB, got '{code}'")))
                .ok(),
        };

        let investor = match wallet_type {
            Some(WalletType::Investor) => validate_investor_terms(&self, today, &mut errors),
            _ => None,
        };

        let initial_balance = self.initial_balance.unwrap_or(0);
        if wallet_type == Some(WalletType::Personal) && initial_balance < 0 {
            errors.push("initial_balance_minor_units must not be negative".to_string());
        }

        if !errors.is_empty() {
            return Err(LedgerError::Validation(errors.join("; ")));
        }

        let (Some(wallet_type), Some(currency)) = (wallet_type, currency) else {
            return Err(LedgerError::Internal(
                "wallet validation passed without type or currency".to_string(),
            ));
        };

        let opening_balance = match &investor {
            Some(terms) => terms.investment_amount,
            None => initial_balance,
        };

        Ok(NewWallet {
            owner_id: self.owner_id,
            name,
            wallet_type,
            currency,
            investor,
            opening_balance,
        })
    }
}

fn push_validation(errors: &mut Vec<String>, err: LedgerError) {
    match err {
        LedgerError::Validation(msg) => errors.push(msg),
        other => errors.push(other.to_string()),
    }
}

fn validate_investor_terms(
    input: &CreateWalletInput,
    today: NaiveDate,
    errors: &mut Vec<String>,
) -> Option<InvestorTerms> {
    let before = errors.len();

    match input.investment_amount {
        None => errors.push("investment_amount_minor_units is required for investor wallets".to_string()),
        Some(amount) if amount < 1 => {
            errors.push("investment_amount_minor_units must be at least 1".to_string());
        }
        Some(_) => {}
    }

    let in_range = |p: Decimal| p >= Decimal::ZERO && p <= Decimal::ONE_HUNDRED;
    match input.investor_percentage {
        None => errors.push("investor_percentage is required for investor wallets".to_string()),
        Some(p) if !in_range(p) => errors.push("investor_percentage must be 0-100".to_string()),
        Some(_) => {}
    }
    match input.user_percentage {
        None => errors.push("user_percentage is required for investor wallets".to_string()),
        Some(p) if !in_range(p) => errors.push("user_percentage must be 0-100".to_string()),
        Some(_) => {}
    }
    if let (Some(investor), Some(user)) = (input.investor_percentage, input.user_percentage)
        && (investor + user - Decimal::ONE_HUNDRED).abs() > Decimal::new(1, 2)
    {
        errors.push("investor_percentage and user_percentage must sum to 100".to_string());
    }

    match input.investment_return_date {
        None => errors.push("investment_return_date is required for investor wallets".to_string()),
        Some(date) if date <= today => {
            errors.push("investment_return_date must be in the future".to_string());
        }
        Some(_) => {}
    }

    if errors.len() > before {
        return None;
    }

    Some(InvestorTerms {
        investment_amount: input.investment_amount?,
        investor_percentage: input.investor_percentage?,
        user_percentage: input.user_percentage?,
        investment_return_date: input.investment_return_date?,
    })
}

impl NewWallet {
    /// Builds the credit entry recording the opening balance, if there is one.
    #[must_use]
    pub fn opening_entry(&self, wallet_id: WalletId) -> Option<NewLedgerEntry> {
        if self.opening_balance <= 0 {
            return None;
        }

        let amount = Money::new(self.opening_balance, self.currency);
        let (reference_type, description) = match self.wallet_type {
            WalletType::Investor => (
                ReferenceType::InitialInvestment,
                format!("Initial investment: {amount}"),
            ),
            WalletType::Personal => (
                ReferenceType::Adjustment,
                format!("Initial balance: {amount}"),
            ),
        };

        Some(NewLedgerEntry {
            wallet_id,
            owner_id: self.owner_id,
            direction: Direction::Credit,
            amount: self.opening_balance,
            currency: self.currency,
            reference_type,
            reference_id: None,
            description,
        })
    }
}
