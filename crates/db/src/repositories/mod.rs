//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every function takes the connection or transaction to run on, so the
//! engine can compose them inside one owner-scoped transaction, and every
//! query filters by owner in addition to row-level security.

pub mod allocation;
pub mod balance;
pub mod installment;
pub mod ledger;
pub mod wallet;

pub use allocation::AllocationRepository;
pub use balance::BalanceRepository;
pub use installment::{InstallmentRepository, NewInstallment};
pub use ledger::LedgerRepository;
pub use wallet::WalletRepository;
