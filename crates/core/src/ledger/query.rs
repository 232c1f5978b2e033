//! Ledger query filters and the running-balance page.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tranche_shared::types::{OwnerId, PageLimit, PageMeta, WalletId};

use super::balance::running_balances;
use super::error::LedgerError;
use super::types::{LedgerEntry, ReferenceType};

/// Filters for a wallet's ledger listing.
#[derive(Debug, Clone)]
pub struct LedgerQuery {
    /// Wallet to list.
    pub wallet_id: WalletId,
    /// Authenticated owner.
    pub owner_id: OwnerId,
    /// Only entries with this reference type.
    pub reference_type: Option<ReferenceType>,
    /// Inclusive lower bound on `created_at`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end: Option<DateTime<Utc>>,
    /// Page size.
    pub limit: PageLimit,
}

impl LedgerQuery {
    /// Checks that the date range is not inverted.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if `start` is after `end`.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(LedgerError::Validation(
                "start_date must not be after end_date".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which end of a date range a bare `YYYY-MM-DD` value stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// Start of the day.
    Start,
    /// Last microsecond of the day.
    End,
}

/// Parses a `YYYY-MM-DD` or RFC 3339 query value.
///
/// # Errors
///
/// Returns `LedgerError::Validation` naming `field` if the value is neither.
pub fn parse_date_bound(
    field: &str,
    value: &str,
    bound: DateBound,
) -> Result<DateTime<Utc>, LedgerError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        LedgerError::Validation(format!(
            "{field} must be YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })?;
    let time = match bound {
        DateBound::Start => NaiveTime::MIN,
        DateBound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
            .ok_or_else(|| LedgerError::Internal("invalid end-of-day time".to_string()))?,
    };
    Ok(date.and_time(time).and_utc())
}

/// One ledger row as listed, with its running balance.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerRow {
    /// The persisted entry.
    #[serde(flatten)]
    pub entry: LedgerEntry,
    /// Amount with sign applied.
    pub signed_amount: i64,
    /// Wallet balance right after this entry.
    pub running_balance: i64,
}

/// A newest-first page of ledger rows.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerPage {
    /// Rows, newest first.
    pub rows: Vec<LedgerRow>,
    /// Pagination metadata.
    pub pagination: PageMeta,
}

impl LedgerPage {
    /// Builds a page from newest-first entries and the wallet's current balance.
    #[must_use]
    pub fn build(current_balance: i64, entries: Vec<LedgerEntry>, limit: PageLimit) -> Self {
        let signed: Vec<i64> = entries.iter().map(LedgerEntry::signed_amount).collect();
        let balances = running_balances(current_balance, &signed);
        let pagination = PageMeta::new(limit, entries.len());

        let rows = entries
            .into_iter()
            .zip(signed)
            .zip(balances)
            .map(|((entry, signed_amount), running_balance)| LedgerRow {
                entry,
                signed_amount,
                running_balance,
            })
            .collect();

        Self { rows, pagination }
    }
}
