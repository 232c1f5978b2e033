//! Database layer with `SeaORM` entities, repositories and the ledger engine.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Owner-scoped transactions under row-level security
//! - The `LedgerEngine` that runs every money-moving operation
//! - Database migrations

pub mod convert;
pub mod engine;
pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;
pub mod rls;

pub use engine::{LedgerEngine, WalletLedger};
pub use error::map_db_err;
pub use migration::Migrator;
pub use rls::{OwnerScope, ScopeMode};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tranche_shared::config::DatabaseConfig;

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);

    Database::connect(options).await
}
