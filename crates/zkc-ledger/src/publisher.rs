//! # Resilient Publisher
//!
//! Runs an ordered sequence of ledger steps as one unit. If any step fails
//! with a retryable error the whole sequence starts again after a backoff
//! of `base_delay * 2^attempt` (attempt counted from zero). Fatal errors
//! end publication immediately. After `max_attempts` failed attempts the
//! last error is returned inside [`PublishError::Update`].
//!
//! Steps must be idempotent: a sequence that failed half-way is replayed
//! from its first step.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, PublishError};
use crate::ledger::{Ledger, Receipt};
use crate::transaction::SignedTransaction;

/// Retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishConfig {
    pub max_attempts: u32,
    #[serde(with = "millis")]
    pub base_delay: Duration,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl PublishConfig {
    /// Wait before the attempt following `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Publisher {
    config: PublishConfig,
}

impl Publisher {
    pub fn new(config: PublishConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Run `op` until it succeeds, fails fatally, or runs out of attempts.
    ///
    /// `op` receives the zero-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, PublishError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LedgerError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            metrics::counter!("zkc_publish_attempts_total").increment(1);
            let err = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            metrics::counter!("zkc_publish_failures_total").increment(1);

            if err.is_fatal() {
                tracing::warn!(attempt = attempt + 1, error = %err, "publication aborted");
                return Err(PublishError::Fatal {
                    attempt: attempt + 1,
                    source: err,
                });
            }
            if attempt + 1 >= max_attempts {
                tracing::warn!(attempts = max_attempts, error = %err, "publication failed");
                return Err(PublishError::Update {
                    attempts: max_attempts,
                    last: err,
                });
            }

            let delay = self.config.delay_after(attempt);
            tracing::warn!(
                attempt = attempt + 1,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "publication failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Submit each transaction in its own block, in order, and require a
    /// successful receipt for each.
    pub async fn publish<L>(
        &self,
        ledger: &L,
        transactions: &[SignedTransaction],
    ) -> Result<Vec<Receipt>, PublishError>
    where
        L: Ledger + ?Sized,
    {
        self.run(|_| async move { publish_once(ledger, transactions) })
            .await
    }
}

fn publish_once<L>(ledger: &L, transactions: &[SignedTransaction]) -> Result<Vec<Receipt>, LedgerError>
where
    L: Ledger + ?Sized,
{
    let mut receipts = Vec::with_capacity(transactions.len());
    for tx in transactions {
        let tx_id = ledger.submit(tx.clone())?;
        let block = ledger.produce_block()?;
        // Another producer may have drained the transaction into its block.
        let receipt = match block.receipt(&tx_id) {
            Some(receipt) => receipt.clone(),
            None => ledger
                .receipt(&tx_id)?
                .ok_or(LedgerError::NotIncluded(tx_id))?,
        };
        receipts.push(receipt.into_result()?);
    }
    Ok(receipts)
}
