//! Ledger error types for validation, state, concurrency and storage errors.
//!
//! Every engine operation resolves to `Result<T, LedgerError>`. Only the
//! concurrency variants are retryable; everything else is final.

use thiserror::Error;
use tranche_shared::types::{AllocationId, InstallmentId, WalletId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Malformed input. Multiple violations are joined into one message.
    #[error("Validation failed: {0}")]
    Validation(String),

    // ========== Not Found Errors ==========
    /// Wallet does not exist or belongs to another owner.
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// Installment does not exist or belongs to another owner.
    #[error("Installment not found: {0}")]
    InstallmentNotFound(InstallmentId),

    /// Allocation does not exist under the given installment.
    #[error("Allocation not found: {0}")]
    AllocationNotFound(AllocationId),

    // ========== State Errors ==========
    /// Wallet is archived and cannot move money.
    #[error("Wallet {0} is not active")]
    WalletInactive(WalletId),

    /// Installment is cancelled and cannot receive allocations.
    #[error("Installment {0} is cancelled")]
    InstallmentCancelled(InstallmentId),

    /// Allocation is already void.
    #[error("Allocation {0} is not active and cannot be voided")]
    AllocationNotActive(AllocationId),

    // ========== Business Rule Errors ==========
    /// Wallet balance does not cover the requested debit.
    #[error("Insufficient funds in wallet {wallet_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The wallet ID.
        wallet_id: WalletId,
        /// Current balance in minor units.
        balance: i64,
        /// Requested amount in minor units.
        requested: i64,
    },

    /// Allocation would push the installment past its total.
    #[error(
        "Allocation exceeds remaining amount for installment {installment_id}: remaining {remaining}, requested {requested}"
    )]
    AllocationExceedsRemaining {
        /// The installment ID.
        installment_id: InstallmentId,
        /// Amount still unallocated, in minor units.
        remaining: i64,
        /// Requested amount in minor units.
        requested: i64,
    },

    // ========== Concurrency Errors ==========
    /// Guarded balance update matched no row: another writer bumped the version.
    #[error("Balance version mismatch for wallet {wallet_id}: expected {expected_version}")]
    VersionConflict {
        /// The wallet ID.
        wallet_id: WalletId,
        /// Version read at the start of the attempt.
        expected_version: i64,
    },

    /// The database aborted the transaction (serialization failure or deadlock).
    #[error("Transaction could not be serialized, please retry")]
    SerializationFailure,

    /// Retries ran out while conflicts kept occurring.
    #[error("Operation {operation} gave up after {attempts} attempts due to concurrent modification")]
    ConcurrencyExhausted {
        /// The engine operation.
        operation: &'static str,
        /// Attempts made.
        attempts: u32,
    },

    // ========== Storage Errors ==========
    /// A statement exceeded the configured timeout.
    #[error("Ledger operation timed out")]
    Timeout,

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::WalletNotFound(_) => "wallet_not_found",
            Self::InstallmentNotFound(_) => "installment_not_found",
            Self::AllocationNotFound(_) => "allocation_not_found",
            Self::WalletInactive(_) => "wallet_inactive",
            Self::InstallmentCancelled(_) => "installment_cancelled",
            Self::AllocationNotActive(_) => "allocation_not_active",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::AllocationExceedsRemaining { .. } => "allocation_exceeds_remaining",
            Self::VersionConflict { .. } => "version_conflict",
            Self::SerializationFailure => "serialization_failure",
            Self::ConcurrencyExhausted { .. } => "concurrency_exhausted",
            Self::Timeout => "timeout",
            Self::Storage(_) => "storage_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and business rules
            Self::Validation(_)
            | Self::InsufficientFunds { .. }
            | Self::AllocationExceedsRemaining { .. } => 400,

            // 404 Not Found
            Self::WalletNotFound(_) | Self::InstallmentNotFound(_) | Self::AllocationNotFound(_) => {
                404
            }

            // 409 Conflict - invalid state for the operation
            Self::WalletInactive(_) | Self::InstallmentCancelled(_) | Self::AllocationNotActive(_) => {
                409
            }

            // 500 Internal Server Error
            Self::VersionConflict { .. }
            | Self::SerializationFailure
            | Self::ConcurrencyExhausted { .. }
            | Self::Timeout
            | Self::Storage(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::VersionConflict { .. } | Self::SerializationFailure
        )
    }

    /// Returns true for storage faults whose message must not reach API callers.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.http_status_code() >= 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LedgerError::Validation("x".into()), 400, "validation_error")]
    #[case(LedgerError::WalletNotFound(WalletId::new()), 404, "wallet_not_found")]
    #[case(LedgerError::InstallmentNotFound(InstallmentId::new()), 404, "installment_not_found")]
    #[case(LedgerError::AllocationNotFound(AllocationId::new()), 404, "allocation_not_found")]
    #[case(LedgerError::WalletInactive(WalletId::new()), 409, "wallet_inactive")]
    #[case(LedgerError::InstallmentCancelled(InstallmentId::new()), 409, "installment_cancelled")]
    #[case(LedgerError::AllocationNotActive(AllocationId::new()), 409, "allocation_not_active")]
    #[case(
        LedgerError::InsufficientFunds { wallet_id: WalletId::new(), balance: 1, requested: 2 },
        400,
        "insufficient_funds"
    )]
    #[case(
        LedgerError::AllocationExceedsRemaining {
            installment_id: InstallmentId::new(),
            remaining: 1,
            requested: 2,
        },
        400,
        "allocation_exceeds_remaining"
    )]
    #[case(
        LedgerError::ConcurrencyExhausted { operation: "top_up", attempts: 5 },
        500,
        "concurrency_exhausted"
    )]
    #[case(LedgerError::Timeout, 500, "timeout")]
    #[case(LedgerError::Storage("db".into()), 500, "storage_error")]
    fn test_status_and_code(#[case] err: LedgerError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.http_status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(
            LedgerError::VersionConflict {
                wallet_id: WalletId::new(),
                expected_version: 3,
            }
            .is_retryable()
        );
        assert!(LedgerError::SerializationFailure.is_retryable());
        assert!(!LedgerError::Timeout.is_retryable());
        assert!(!LedgerError::Validation(String::new()).is_retryable());
        assert!(
            !LedgerError::InsufficientFunds {
                wallet_id: WalletId::new(),
                balance: 0,
                requested: 1,
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let id = InstallmentId::new();
        let err = LedgerError::AllocationExceedsRemaining {
            installment_id: id,
            remaining: 1_000_000,
            requested: 1_500_000,
        };
        assert_eq!(
            err.to_string(),
            format!(
                "Allocation exceeds remaining amount for installment {id}: remaining 1000000, requested 1500000"
            )
        );
        assert!(LedgerError::Storage("boom".into()).is_internal());
        assert!(!LedgerError::WalletInactive(WalletId::new()).is_internal());
    }
}
