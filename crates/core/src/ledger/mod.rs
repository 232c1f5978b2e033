//! Wallet ledger logic.
//!
//! This module implements the money-movement rules shared by every engine operation:
//! - Ledger entries (signed credits and debits, tagged by reference)
//! - Balance snapshots and guarded balance updates
//! - Running-balance reconstruction for ledger listings
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod query;
pub mod types;

pub use balance::{BalanceSnapshot, BalanceUpdate, running_balances};
pub use error::LedgerError;
pub use query::{DateBound, LedgerPage, LedgerQuery, LedgerRow, parse_date_bound};
pub use types::{
    Direction, LedgerEntry, NewLedgerEntry, ReferenceType, TopUpOutcome, TopUpRequest,
};
