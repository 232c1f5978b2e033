//! Money type in integer minor units with currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored and computed as `i64` minor units (kopecks for RUB);
//! `rust_decimal::Decimal` is only used to render the major-unit value for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a monetary amount with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., kopecks).
    pub minor_units: i64,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Russian Ruble
    #[default]
    Rub,
}

impl Currency {
    /// Number of minor-unit digits (2 for RUB: 100 kopecks = 1 ruble).
    #[must_use]
    pub const fn minor_digits(self) -> u32 {
        match self {
            Self::Rub => 2,
        }
    }

    /// Returns the ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Rub => "RUB",
        }
    }
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor_units,
            currency,
        }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            minor_units: 0,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Returns the amount in major units (e.g. rubles), exact to the minor unit.
    #[must_use]
    pub fn to_major(&self) -> Decimal {
        to_major(self.minor_units, self.currency)
    }
}

/// Converts a minor-unit amount to its major-unit decimal representation.
#[must_use]
pub fn to_major(minor_units: i64, currency: Currency) -> Decimal {
    Decimal::new(minor_units, currency.minor_digits())
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.to_major(), self.currency)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RUB" => Ok(Self::Rub),
            _ => Err(format!("Unsupported currency: {s}")),
        }
    }
}
