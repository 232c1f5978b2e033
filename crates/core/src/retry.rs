//! Bounded retry for optimistic-concurrency conflicts.
//!
//! Every mutating engine operation runs its whole read-modify-write inside
//! `retry_on_conflict`. Only retryable `LedgerError`s (version conflicts and
//! serialization failures) trigger another attempt; business-rule and storage
//! errors return immediately.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};
use tranche_shared::LedgerConfig;

use crate::ledger::LedgerError;

/// Retry policy: attempt budget plus capped exponential backoff with jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff before the second attempt.
    pub base_backoff: Duration,
    /// Upper bound for a single backoff before jitter.
    pub max_backoff: Duration,
    /// Add up to 50% random jitter to each backoff.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for RetryPolicy {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_backoff: Duration::from_millis(config.base_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Backoff after failed attempt `attempt` (1-based), without jitter.
    #[must_use]
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Backoff after failed attempt `attempt` (1-based), with jitter applied.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.backoff_ceiling(attempt);
        if !self.jitter {
            return delay;
        }
        let half_ms = u64::try_from(delay.as_millis() / 2).unwrap_or(u64::MAX);
        if half_ms == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::rng().random_range(0..=half_ms))
    }
}

/// Runs `attempt_fn` until it succeeds, fails with a non-retryable error, or
/// the attempt budget is spent.
///
/// `attempt_fn` receives the 1-based attempt number and must perform the whole
/// unit of work (open transaction, read, write, commit) each time.
///
/// # Errors
///
/// Returns the first non-retryable error, or `ConcurrencyExhausted` when every
/// attempt hit a conflict.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut attempt_fn: F,
) -> Result<T, LedgerError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LedgerError>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        match attempt_fn(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for_attempt(attempt);
                debug!(
                    operation,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "Concurrency conflict, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) if e.is_retryable() => {
                warn!(operation, attempts = max_attempts, error = %e, "Retries exhausted");
            }
            Err(e) => return Err(e),
        }
    }

    Err(LedgerError::ConcurrencyExhausted {
        operation,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{BalanceSnapshot, Direction};
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tranche_shared::types::WalletId;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(4),
            jitter: false,
        }
    }

    /// In-memory balance row with a version-guarded write.
    struct BalanceCell(Mutex<BalanceSnapshot>);

    impl BalanceCell {
        fn new(balance: i64) -> Self {
            Self(Mutex::new(BalanceSnapshot {
                wallet_id: WalletId::new(),
                balance,
                version: 1,
                updated_at: Utc::now(),
            }))
        }

        fn read(&self) -> BalanceSnapshot {
            *self.0.lock().unwrap()
        }

        fn write_if_version(&self, read: &BalanceSnapshot, amount: i64) -> Result<i64, LedgerError> {
            let update = read.apply(Direction::Credit, amount, true)?;
            let mut row = self.0.lock().unwrap();
            if row.version != update.expected_version {
                return Err(LedgerError::VersionConflict {
                    wallet_id: row.wallet_id,
                    expected_version: update.expected_version,
                });
            }
            row.balance = update.new_balance;
            row.version = update.new_version;
            Ok(row.balance)
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            jitter: false,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff_ceiling(1), Duration::from_millis(20));
        assert_eq!(policy.backoff_ceiling(2), Duration::from_millis(40));
        assert_eq!(policy.backoff_ceiling(5), Duration::from_millis(320));
        assert_eq!(policy.backoff_ceiling(6), Duration::from_millis(500));
        assert_eq!(policy.backoff_ceiling(40), Duration::from_millis(500));
    }

    #[test]
    fn test_jitter_stays_within_half() {
        let policy = RetryPolicy::default();
        for attempt in 1..6 {
            let ceiling = policy.backoff_ceiling(attempt);
            let delay = policy.delay_for_attempt(attempt);
            assert!(delay >= ceiling);
            assert!(delay <= ceiling + ceiling / 2);
        }
    }

    #[tokio::test]
    async fn test_racing_top_ups_retry_exactly_once() {
        let cell = Arc::new(BalanceCell::new(1_000_000));
        let attempts = AtomicU32::new(0);

        let result = retry_on_conflict(&fast_policy(5), "top_up", |attempt| {
            attempts.fetch_add(1, Ordering::SeqCst);
            let cell = Arc::clone(&cell);
            async move {
                let snapshot = cell.read();
                if attempt == 1 {
                    // a rival top-up commits between our read and our write
                    let rival = cell.read();
                    cell.write_if_version(&rival, 200_000)?;
                }
                cell.write_if_version(&snapshot, 500_000)
            }
        })
        .await
        .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(result, 1_700_000);
        assert_eq!(cell.read().version, 3);
    }

    #[tokio::test]
    async fn test_business_errors_are_not_retried() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = retry_on_conflict(&fast_policy(5), "allocate", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LedgerError::InsufficientFunds {
                    wallet_id: WalletId::new(),
                    balance: 0,
                    requested: 1,
                })
            }
        })
        .await;

        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_attempts() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = retry_on_conflict(&fast_policy(3), "void_allocation", |_| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(LedgerError::SerializationFailure) }
        })
        .await;

        assert!(matches!(
            result,
            Err(LedgerError::ConcurrencyExhausted {
                operation: "void_allocation",
                attempts: 3,
            })
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
