//! Mapping of storage errors onto `LedgerError`.

use sea_orm::{DbErr, RuntimeErr};
use tranche_core::LedgerError;

/// PostgreSQL `serialization_failure`.
pub const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// PostgreSQL `deadlock_detected`.
pub const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";
/// PostgreSQL `query_canceled`, raised when `statement_timeout` fires.
pub const SQLSTATE_QUERY_CANCELED: &str = "57014";

/// Extracts the SQLSTATE code from a database error, if the driver reported one.
#[must_use]
pub fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(db_err)))
        | DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(db_err))) => {
            db_err.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

/// Classifies a SQLSTATE code.
#[must_use]
pub fn ledger_error_for_sqlstate(code: &str) -> Option<LedgerError> {
    match code {
        SQLSTATE_SERIALIZATION_FAILURE | SQLSTATE_DEADLOCK_DETECTED => {
            Some(LedgerError::SerializationFailure)
        }
        SQLSTATE_QUERY_CANCELED => Some(LedgerError::Timeout),
        _ => None,
    }
}

/// Maps a `DbErr` to a `LedgerError`.
///
/// Serialization failures and deadlocks become the retryable
/// `SerializationFailure`, statement timeouts become `Timeout`, and
/// everything else is an opaque `Storage` error.
#[must_use]
pub fn map_db_err(err: DbErr) -> LedgerError {
    sqlstate(&err)
        .and_then(|code| ledger_error_for_sqlstate(&code))
        .unwrap_or_else(|| LedgerError::Storage(err.to_string()))
}
