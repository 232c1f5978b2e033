//! Row-Level Security (RLS) context management.
//!
//! Every ledger unit of work runs inside an `OwnerScope`: one PostgreSQL
//! transaction with `app.current_owner_id` set, so RLS policies hide and
//! reject other owners' rows, and with `statement_timeout` bounding each
//! statement.
//!
//! # Usage
//!
//! ```ignore
//! use tranche_db::rls::{OwnerScope, ScopeMode};
//!
//! let scope = OwnerScope::begin(&db, owner_id, ScopeMode::Write, 5_000).await?;
//! let wallets = Wallets::find().all(scope.txn()).await?;
//! scope.commit().await?;
//! ```

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr,
    IsolationLevel, Statement, TransactionTrait,
};
use tracing::warn;
use tranche_core::LedgerError;
use tranche_shared::types::OwnerId;

use crate::error::map_db_err;

/// How a scope's transaction is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// Read-modify-write: `SERIALIZABLE`, read-write.
    Write,
    /// Consistent snapshot for listings: `REPEATABLE READ`, read-only.
    Read,
}

/// A transaction bound to one owner's RLS context.
pub struct OwnerScope {
    txn: DatabaseTransaction,
    owner_id: OwnerId,
}

impl OwnerScope {
    /// Begins a transaction and sets the owner context and statement timeout.
    ///
    /// Both settings are transaction-local and vanish on commit or rollback.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or configured.
    pub async fn begin(
        db: &DatabaseConnection,
        owner_id: OwnerId,
        mode: ScopeMode,
        statement_timeout_ms: u64,
    ) -> Result<Self, DbErr> {
        let txn = match mode {
            ScopeMode::Write => {
                db.begin_with_config(Some(IsolationLevel::Serializable), Some(AccessMode::ReadWrite))
                    .await?
            }
            ScopeMode::Read => {
                db.begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
                    .await?
            }
        };

        txn.execute(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT set_config('app.current_owner_id', $1, true)",
            [owner_id.to_string().into()],
        ))
        .await?;

        if statement_timeout_ms > 0 {
            txn.execute_unprepared(&statement_timeout_sql(statement_timeout_ms))
                .await?;
        }

        Ok(Self { txn, owner_id })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Returns the owner this scope acts for.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }

    /// Commits on `Ok`, rolls back on `Err`, and returns the outcome.
    ///
    /// A failed commit is mapped like any other statement error, so a
    /// serialization failure at commit time stays retryable.
    ///
    /// # Errors
    ///
    /// Returns the original error, or the mapped commit error.
    pub async fn finish<T>(self, outcome: Result<T, LedgerError>) -> Result<T, LedgerError> {
        match outcome {
            Ok(value) => {
                self.commit().await.map_err(map_db_err)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

fn statement_timeout_sql(statement_timeout_ms: u64) -> String {
    format!("SET LOCAL statement_timeout = {statement_timeout_ms}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_timeout_sql_format() {
        assert_eq!(
            statement_timeout_sql(5_000),
            "SET LOCAL statement_timeout = 5000"
        );
    }
}
