//! `SeaORM` entities for the wallet ledger tables.

pub mod prelude;

pub mod installment_allocations;
pub mod installments;
pub mod ledger_transactions;
pub mod sea_orm_active_enums;
pub mod wallet_balances;
pub mod wallets;
