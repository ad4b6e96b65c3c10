//! # Trade Service
//!
//! Executes spot trades end to end.
//!
//! ```text
//! resolve pair + quote        (no lock, read only)
//!   -> lock user
//!   -> read balances -> settle -> commit     (spawned task, owns the lock)
//!        ^                           |
//!        +---- guarded debit lost ---+   (bounded retries)
//! ```
//!
//! The critical section runs on its own task, so a caller that stops
//! polling `execute_trade` cannot interrupt a commit halfway: the ledger
//! transaction either commits or rolls back, and the lock is released when
//! the task ends.

use crate::application::dto::TradeConfirmation;
use crate::application::error::{TradeError, TradeResult};
use crate::application::services::pair_resolution::{PairResolution, QuotedPair};
use crate::application::services::user_locks::UserLocks;
use crate::config::SettlementConfig;
use crate::domain::entities::{BalanceSnapshot, TradeRecord, TradeRequest};
use crate::domain::services::settlement::{SettlementOutcome, settle};
use crate::domain::value_objects::{Timestamp, TradeId};
use crate::infrastructure::persistence::traits::{
    LedgerStore, LedgerTransaction, PairResolver, PriceOracle, RepositoryResult, WalletReader,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Tuning for [`TradeService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeServiceConfig {
    /// Longest wait for a user's lock.
    pub lock_timeout: Duration,
    /// Re-settle attempts after a guarded debit conflict.
    pub max_commit_retries: u32,
    /// Pause before each retry.
    pub retry_backoff: Duration,
}

impl Default for TradeServiceConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_millis(5000),
            max_commit_retries: 3,
            retry_backoff: Duration::from_millis(10),
        }
    }
}

impl TradeServiceConfig {
    /// Sets the lock timeout.
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Sets the retry budget for conflicting commits.
    #[must_use]
    pub fn with_max_commit_retries(mut self, retries: u32) -> Self {
        self.max_commit_retries = retries;
        self
    }

    /// Sets the pause between retries.
    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

impl From<&SettlementConfig> for TradeServiceConfig {
    fn from(config: &SettlementConfig) -> Self {
        Self {
            lock_timeout: config.lock_timeout(),
            max_commit_retries: config.max_commit_retries,
            retry_backoff: config.retry_backoff(),
        }
    }
}

/// Executes trades against the ledger.
#[derive(Debug, Clone)]
pub struct TradeService {
    pairs: PairResolution,
    locks: Arc<UserLocks>,
    settler: Settler,
    lock_timeout: Duration,
}

/// The part of the service that runs inside the user's critical section.
#[derive(Debug, Clone)]
struct Settler {
    wallets: Arc<dyn WalletReader>,
    ledger: Arc<dyn LedgerStore>,
    max_commit_retries: u32,
    retry_backoff: Duration,
}

impl TradeService {
    /// Creates a trade service.
    #[must_use]
    pub fn new(
        oracle: Arc<dyn PriceOracle>,
        resolver: Arc<dyn PairResolver>,
        wallets: Arc<dyn WalletReader>,
        ledger: Arc<dyn LedgerStore>,
        config: TradeServiceConfig,
    ) -> Self {
        Self {
            pairs: PairResolution::new(oracle, resolver),
            locks: Arc::new(UserLocks::new()),
            settler: Settler {
                wallets,
                ledger,
                max_commit_retries: config.max_commit_retries,
                retry_backoff: config.retry_backoff,
            },
            lock_timeout: config.lock_timeout,
        }
    }

    /// Returns the per-user lock registry.
    #[must_use]
    pub fn locks(&self) -> &Arc<UserLocks> {
        &self.locks
    }

    /// Executes one trade.
    ///
    /// On success the trade is recorded and both wallet legs are applied;
    /// on any error nothing is.
    ///
    /// # Errors
    ///
    /// - `TradeError::UnknownPair` if the pair is not currently quoted
    /// - `TradeError::NoQuote` if the needed side of the book is empty
    /// - `TradeError::InsufficientBalance` if the debit wallet is short
    /// - `TradeError::DegeneratePair` / `TradeError::InvalidQuantity` for bad input
    /// - `TradeError::LockTimeout` if the user's wallets stayed busy
    /// - `TradeError::CommitFailed` if the ledger write failed or kept conflicting
    /// - `TradeError::MarketData` if a read-side collaborator failed
    pub async fn execute_trade(&self, request: TradeRequest) -> TradeResult<TradeConfirmation> {
        let span = tracing::info_span!(
            "execute_trade",
            user_id = %request.user_id,
            pair_id = %request.crypto_pair_id,
            trade_type = %request.trade_type,
            quantity = %request.quantity,
        );

        let result = self.run(request).instrument(span.clone()).await;

        let _entered = span.enter();
        match &result {
            Ok(confirmation) => tracing::info!(
                trade_id = %confirmation.trade_id,
                settlement_id = %confirmation.settlement_id,
                price = %confirmation.executed_price,
                total_amount = %confirmation.total_amount,
                "trade executed"
            ),
            Err(e) if e.is_user_facing() => tracing::info!(error = %e, "trade rejected"),
            Err(e) if matches!(e, TradeError::CommitFailed { .. }) => {
                tracing::error!(error = %e, "trade commit failed");
            }
            Err(e) => tracing::warn!(error = %e, "trade failed"),
        }
        result
    }

    async fn run(&self, request: TradeRequest) -> TradeResult<TradeConfirmation> {
        let market = self.pairs.resolve(request.crypto_pair_id).await?;
        tracing::debug!(pair = %market.pair, "pair resolved");

        let user_id = request.user_id;
        let guard = self.locks.acquire(user_id, self.lock_timeout).await?;
        let settler = self.settler.clone();
        let locks = Arc::clone(&self.locks);
        let task = tokio::spawn(
            async move {
                let result = settler.settle_and_commit(request, market).await;
                locks.release(user_id, guard);
                result
            }
            .in_current_span(),
        );

        task.await
            .map_err(|e| TradeError::commit_failed(format!("settlement task aborted: {e}")))?
    }
}

impl Settler {
    async fn settle_and_commit(
        &self,
        request: TradeRequest,
        market: QuotedPair,
    ) -> TradeResult<TradeConfirmation> {
        let mut retries = 0;
        loop {
            let rows = self
                .wallets
                .get_balances(request.user_id)
                .await
                .map_err(|e| TradeError::market_data(e.to_string()))?;
            let balances = BalanceSnapshot::from(rows);

            let outcome = settle(
                &request,
                &balances,
                &market.quote,
                &market.pair,
                Timestamp::now(),
            )?;

            match self.commit(&outcome).await {
                Ok(record) => {
                    let settlement_id = outcome.settlement_id();
                    let (_, balances) = outcome.into_parts();
                    return Ok(TradeConfirmation::from_settlement(
                        settlement_id,
                        record,
                        balances,
                    ));
                }
                Err(e) if e.is_retryable() && retries < self.max_commit_retries => {
                    retries += 1;
                    tracing::warn!(
                        error = %e,
                        settlement_id = %outcome.settlement_id(),
                        retry = retries,
                        "guarded debit conflicted, re-reading balances"
                    );
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(TradeError::commit_failed(format!(
                        "{e} after {retries} retries"
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Applies an outcome in one ledger transaction.
    async fn commit(&self, outcome: &SettlementOutcome) -> TradeResult<TradeRecord> {
        let user_id = outcome.user_id();
        let mut tx = self
            .ledger
            .begin()
            .await
            .map_err(|e| TradeError::commit_failed(e.to_string()))?;

        let trade_id = match apply(tx.as_mut(), outcome).await {
            Ok(id) => id,
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::error!(error = %rollback, "rollback failed");
                }
                return Err(TradeError::from_ledger(user_id, &e));
            }
        };

        tx.commit()
            .await
            .map_err(|e| TradeError::from_ledger(user_id, &e))?;
        Ok(outcome.trade().clone().into_record(trade_id))
    }
}

/// Writes the trade row and both balance legs.
async fn apply(
    tx: &mut dyn LedgerTransaction,
    outcome: &SettlementOutcome,
) -> RepositoryResult<TradeId> {
    let trade_id = tx.insert_trade(outcome.trade()).await?;
    for (symbol, amount) in outcome.signed_adjustments() {
        tx.adjust_balance(outcome.user_id(), symbol, amount).await?;
    }
    Ok(trade_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::{BestPrice, QuoteSymbols};
    use crate::domain::value_objects::{PairId, Price, Symbol, TradeType, UserId};
    use crate::infrastructure::persistence::in_memory::{
        FailurePoint, InMemoryLedger, InMemoryPairDirectory, InMemoryPriceOracle,
    };
    use rust_decimal::Decimal;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    async fn fixture(config: TradeServiceConfig) -> (TradeService, InMemoryLedger) {
        let oracle = InMemoryPriceOracle::new();
        let directory = InMemoryPairDirectory::new();
        let ledger = InMemoryLedger::new();

        let quotes = QuoteSymbols::new(["USDT"]).unwrap();
        directory.list_name(PairId::new(1), "BTCUSDT", &quotes).unwrap();
        oracle.publish(BestPrice::new(
            "BTCUSDT",
            Price::new(Decimal::new(100, 0)).ok(),
            Price::new(Decimal::new(101, 0)).ok(),
        ));
        ledger
            .set_balance(UserId::new(1), sym("USDT"), Decimal::new(1000, 0))
            .await;
        ledger
            .set_balance(UserId::new(1), sym("BTC"), Decimal::ZERO)
            .await;

        let service = TradeService::new(
            Arc::new(oracle),
            Arc::new(directory),
            Arc::new(ledger.clone()),
            Arc::new(ledger.clone()),
            config,
        );
        (service, ledger)
    }

    fn buy(qty: Decimal) -> TradeRequest {
        TradeRequest::new(UserId::new(1), PairId::new(1), TradeType::Buy, qty)
    }

    #[tokio::test]
    async fn conflict_is_retried_with_fresh_balances() {
        let (service, ledger) = fixture(TradeServiceConfig::default()).await;
        ledger.inject_conflicts(2);

        let confirmation = service.execute_trade(buy(Decimal::ONE)).await.unwrap();
        assert_eq!(confirmation.total_amount, Decimal::new(101, 0));
        assert_eq!(ledger.trade_count().await, 1);
        assert_eq!(
            ledger.balance(UserId::new(1), &sym("USDT")).await,
            Some(Decimal::new(899, 0))
        );
    }

    #[tokio::test]
    async fn exhausted_retries_fail_the_commit() {
        let config = TradeServiceConfig::default()
            .with_max_commit_retries(1)
            .with_retry_backoff(Duration::from_millis(1));
        let (service, ledger) = fixture(config).await;
        ledger.inject_conflicts(5);

        let err = service.execute_trade(buy(Decimal::ONE)).await.unwrap_err();
        assert!(matches!(err, TradeError::CommitFailed { .. }));
        assert_eq!(ledger.trade_count().await, 0);
    }

    #[tokio::test]
    async fn insert_failure_is_commit_failed() {
        let (service, ledger) = fixture(TradeServiceConfig::default()).await;
        ledger.inject_failure(FailurePoint::InsertTrade);

        let err = service.execute_trade(buy(Decimal::ONE)).await.unwrap_err();
        assert!(matches!(err, TradeError::CommitFailed { .. }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn lock_is_released_after_each_trade() {
        let config = TradeServiceConfig::default().with_lock_timeout(Duration::from_millis(50));
        let (service, _ledger) = fixture(config).await;

        service.execute_trade(buy(Decimal::ONE)).await.unwrap();
        service.execute_trade(buy(Decimal::ONE)).await.unwrap();
        assert!(service.locks().is_empty());
    }

    #[test]
    fn config_builders() {
        let config = TradeServiceConfig::default()
            .with_lock_timeout(Duration::from_secs(1))
            .with_max_commit_retries(7)
            .with_retry_backoff(Duration::from_millis(3));
        assert_eq!(config.lock_timeout, Duration::from_secs(1));
        assert_eq!(config.max_commit_retries, 7);
        assert_eq!(config.retry_backoff, Duration::from_millis(3));
    }
}
