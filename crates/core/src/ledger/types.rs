//! Ledger domain types: entry direction, reference tagging, entries and top-ups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tranche_shared::types::{Currency, LedgerTransactionId, Money, OwnerId, WalletId};

use super::error::LedgerError;

/// Maximum length of a top-up description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Maximum length of a caller-supplied reference id, in characters.
pub const MAX_REFERENCE_ID_LEN: usize = 100;

/// Direction of a money movement on a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Money into the wallet.
    Credit,
    /// Money out of the wallet.
    Debit,
}

impl Direction {
    /// Applies the direction's sign to a positive amount.
    #[must_use]
    pub const fn signed(self, amount: i64) -> i64 {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }

    /// Returns the storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

/// What a ledger entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Opening credit of an investor wallet.
    InitialInvestment,
    /// Opening balance of a personal wallet or a manual top-up.
    Adjustment,
    /// Debit that funds an installment allocation.
    Installment,
    /// Credit that undoes a voided allocation.
    Reversal,
}

impl ReferenceType {
    /// Returns the storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InitialInvestment => "initial_investment",
            Self::Adjustment => "adjustment",
            Self::Installment => "installment",
            Self::Reversal => "reversal",
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReferenceType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial_investment" => Ok(Self::InitialInvestment),
            "adjustment" => Ok(Self::Adjustment),
            "installment" => Ok(Self::Installment),
            "reversal" => Ok(Self::Reversal),
            other => Err(LedgerError::Validation(format!(
                "type must be one of initial_investment, adjustment, installment, reversal; got '{other}'"
            ))),
        }
    }
}

/// An immutable, persisted ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID.
    pub id: LedgerTransactionId,
    /// Wallet the money moved on.
    pub wallet_id: WalletId,
    /// Owner of the wallet.
    pub owner_id: OwnerId,
    /// Credit or debit.
    pub direction: Direction,
    /// Positive amount in minor units.
    pub amount: i64,
    /// Currency of the amount.
    pub currency: Currency,
    /// What the entry refers to.
    pub reference_type: ReferenceType,
    /// Installment id, voided allocation id, or caller reference.
    pub reference_id: Option<String>,
    /// Human-readable description.
    pub description: String,
    /// Who recorded the entry.
    pub created_by: OwnerId,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the amount with the direction's sign applied.
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        self.direction.signed(self.amount)
    }
}

/// A ledger entry about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    /// Wallet the money moves on.
    pub wallet_id: WalletId,
    /// Owner of the wallet, also recorded as the author.
    pub owner_id: OwnerId,
    /// Credit or debit.
    pub direction: Direction,
    /// Positive amount in minor units.
    pub amount: i64,
    /// Currency of the amount.
    pub currency: Currency,
    /// What the entry refers to.
    pub reference_type: ReferenceType,
    /// Reference id, if any.
    pub reference_id: Option<String>,
    /// Human-readable description.
    pub description: String,
}

/// Request to credit a wallet.
#[derive(Debug, Clone)]
pub struct TopUpRequest {
    /// Target wallet.
    pub wallet_id: WalletId,
    /// Authenticated owner.
    pub owner_id: OwnerId,
    /// Amount in minor units, must be positive.
    pub amount: i64,
    /// Description, 1-500 characters after trimming.
    pub description: String,
    /// Optional caller reference, at most 100 characters.
    pub reference_id: Option<String>,
}

impl TopUpRequest {
    /// Validates the request and returns it with trimmed text fields.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` listing every violated rule.
    pub fn validate(self) -> Result<Self, LedgerError> {
        let mut errors = Vec::new();

        if self.amount < 1 {
            errors.push("amount_minor_units must be at least 1".to_string());
        }

        let description = self.description.trim().to_string();
        let description_len = description.chars().count();
        if description_len == 0 || description_len > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "description must be 1-{MAX_DESCRIPTION_LEN} characters"
            ));
        }

        let reference_id = self
            .reference_id
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        if reference_id
            .as_ref()
            .is_some_and(|r| r.chars().count() > MAX_REFERENCE_ID_LEN)
        {
            errors.push(format!(
                "reference_id must be at most {MAX_REFERENCE_ID_LEN} characters"
            ));
        }

        if !errors.is_empty() {
            return Err(LedgerError::Validation(errors.join("; ")));
        }

        Ok(Self {
            description,
            reference_id,
            ..self
        })
    }

    /// Builds the credit entry this top-up appends.
    #[must_use]
    pub fn ledger_entry(&self, currency: Currency) -> NewLedgerEntry {
        NewLedgerEntry {
            wallet_id: self.wallet_id,
            owner_id: self.owner_id,
            direction: Direction::Credit,
            amount: self.amount,
            currency,
            reference_type: ReferenceType::Adjustment,
            reference_id: self.reference_id.clone(),
            description: self.description.clone(),
        }
    }
}

/// Result of a successful top-up.
#[derive(Debug, Clone)]
pub struct TopUpOutcome {
    /// ID of the appended credit entry.
    pub transaction_id: LedgerTransactionId,
    /// Balance after the credit.
    pub new_balance: Money,
    /// Amount credited.
    pub amount_added: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn request(amount: i64, description: &str, reference_id: Option<&str>) -> TopUpRequest {
        TopUpRequest {
            wallet_id: WalletId::new(),
            owner_id: OwnerId::new(),
            amount,
            description: description.to_string(),
            reference_id: reference_id.map(str::to_string),
        }
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Credit.signed(500), 500);
        assert_eq!(Direction::Debit.signed(500), -500);
    }

    #[test]
    fn test_reference_type_parse() {
        assert_eq!(
            ReferenceType::from_str("reversal").unwrap(),
            ReferenceType::Reversal
        );
        assert!(matches!(
            ReferenceType::from_str("refund"),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_top_up_valid_is_trimmed() {
        let req = request(500_000, "  Cash deposit ", Some(" ")).validate().unwrap();
        assert_eq!(req.description, "Cash deposit");
        assert_eq!(req.reference_id, None);

        let entry = req.ledger_entry(Currency::Rub);
        assert_eq!(entry.direction, Direction::Credit);
        assert_eq!(entry.reference_type, ReferenceType::Adjustment);
    }

    #[rstest]
    #[case(0, "deposit".to_string(), None)]
    #[case(-5, "deposit".to_string(), None)]
    #[case(100, "   ".to_string(), None)]
    #[case(100, "x".repeat(501), None)]
    #[case(100, "deposit".to_string(), Some("r".repeat(101)))]
    fn test_top_up_invalid(
        #[case] amount: i64,
        #[case] description: String,
        #[case] reference_id: Option<String>,
    ) {
        let result = request(amount, &description, reference_id.as_deref()).validate();
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_top_up_collects_all_violations() {
        let Err(LedgerError::Validation(msg)) = request(0, "", None).validate() else {
            panic!("expected validation error");
        };
        assert!(msg.contains("amount_minor_units"));
        assert!(msg.contains("description"));
    }
}
