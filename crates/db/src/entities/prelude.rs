//! Entity re-exports.

pub use super::installment_allocations::Entity as InstallmentAllocations;
pub use super::installments::Entity as Installments;
pub use super::ledger_transactions::Entity as LedgerTransactions;
pub use super::wallet_balances::Entity as WalletBalances;
pub use super::wallets::Entity as Wallets;
