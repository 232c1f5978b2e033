//! Core ledger logic for Tranche.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and money arithmetic live here.
//!
//! # Modules
//!
//! - `ledger` - Ledger entries, balance snapshots, running balances, `LedgerError`
//! - `wallet` - Wallet metadata, creation rules, investment summaries
//! - `allocation` - Installment allocation cap and void rules
//! - `retry` - Bounded retry on optimistic-concurrency conflicts

pub mod allocation;
pub mod ledger;
pub mod retry;
pub mod wallet;

pub use ledger::LedgerError;
pub use retry::{RetryPolicy, retry_on_conflict};
