//! Migration to enable FORCE ROW LEVEL SECURITY on all owner-scoped tables.
//!
//! RLS policies then apply to the table owner as well, so the application
//! role cannot read or write another owner's rows even without a WHERE clause.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(FORCE_RLS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DISABLE_FORCE_RLS_SQL).await?;
        Ok(())
    }
}

const FORCE_RLS_SQL: &str = r"
ALTER TABLE installments FORCE ROW LEVEL SECURITY;
ALTER TABLE wallets FORCE ROW LEVEL SECURITY;
ALTER TABLE wallet_balances FORCE ROW LEVEL SECURITY;
ALTER TABLE ledger_transactions FORCE ROW LEVEL SECURITY;
ALTER TABLE installment_allocations FORCE ROW LEVEL SECURITY;
";

const DISABLE_FORCE_RLS_SQL: &str = r"
ALTER TABLE installments NO FORCE ROW LEVEL SECURITY;
ALTER TABLE wallets NO FORCE ROW LEVEL SECURITY;
ALTER TABLE wallet_balances NO FORCE ROW LEVEL SECURITY;
ALTER TABLE ledger_transactions NO FORCE ROW LEVEL SECURITY;
ALTER TABLE installment_allocations NO FORCE ROW LEVEL SECURITY;
";
