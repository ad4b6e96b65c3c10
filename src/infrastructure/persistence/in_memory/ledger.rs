//! # In-Memory Ledger
//!
//! In-memory implementation of [`WalletReader`] and [`LedgerStore`].
//!
//! A transaction takes the ledger's write lock, works on a scratch copy of
//! the state and swaps it in on commit. Dropping or rolling back the
//! transaction discards the copy, so readers only ever see committed state.
//!
//! Failures can be injected at chosen points to exercise the commit path.

use crate::domain::entities::{BalanceSnapshot, PendingTrade, TradeRecord, WalletBalance};
use crate::domain::value_objects::{CheckedArithmetic, Symbol, TradeId, UserId};
use crate::infrastructure::persistence::traits::{
    LedgerStore, LedgerTransaction, RepositoryError, RepositoryResult, WalletReader,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

/// Point in a transaction at which an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Fail the trade insert.
    InsertTrade,
    /// Fail the n-th balance adjustment of the transaction (1-based).
    Adjustment(usize),
    /// Fail the commit itself.
    Commit,
}

#[derive(Debug, Default)]
struct FailurePlan {
    once: Option<FailurePoint>,
    conflicts: usize,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    names: HashMap<Symbol, String>,
    wallets: HashMap<UserId, BTreeMap<Symbol, Decimal>>,
    trades: Vec<TradeRecord>,
    last_trade_id: i64,
}

/// In-memory implementation of [`WalletReader`] and [`LedgerStore`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    failures: Arc<parking_lot::Mutex<FailurePlan>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a currency's display name.
    pub async fn register_symbol(&self, symbol: Symbol, display_name: impl Into<String>) {
        self.state.write().await.names.insert(symbol, display_name.into());
    }

    /// Opens (or overwrites) a wallet with the given balance.
    pub async fn set_balance(&self, user_id: UserId, symbol: Symbol, balance: Decimal) {
        self.state
            .write()
            .await
            .wallets
            .entry(user_id)
            .or_default()
            .insert(symbol, balance);
    }

    /// Returns the committed balance of one wallet, `None` if it does not exist.
    pub async fn balance(&self, user_id: UserId, symbol: &Symbol) -> Option<Decimal> {
        self.state
            .read()
            .await
            .wallets
            .get(&user_id)
            .and_then(|w| w.get(symbol).copied())
    }

    /// Returns the committed balances of a user.
    pub async fn snapshot(&self, user_id: UserId) -> BalanceSnapshot {
        self.state
            .read()
            .await
            .wallets
            .get(&user_id)
            .map(|w| w.iter().map(|(s, b)| (s.clone(), *b)).collect())
            .unwrap_or_default()
    }

    /// Returns every committed trade in insertion order.
    pub async fn trades(&self) -> Vec<TradeRecord> {
        self.state.read().await.trades.clone()
    }

    /// Returns the number of committed trades.
    pub async fn trade_count(&self) -> usize {
        self.state.read().await.trades.len()
    }

    /// Makes the next transaction fail once at `point`.
    pub fn inject_failure(&self, point: FailurePoint) {
        self.failures.lock().once = Some(point);
    }

    /// Makes the next `count` guarded debits report a conflict.
    pub fn inject_conflicts(&self, count: usize) {
        self.failures.lock().conflicts = count;
    }
}

#[async_trait]
impl WalletReader for InMemoryLedger {
    async fn get_balances(&self, user_id: UserId) -> RepositoryResult<Vec<WalletBalance>> {
        let state = self.state.read().await;
        let Some(wallets) = state.wallets.get(&user_id) else {
            return Ok(Vec::new());
        };
        Ok(wallets
            .iter()
            .map(|(symbol, balance)| {
                let name = state
                    .names
                    .get(symbol)
                    .cloned()
                    .unwrap_or_else(|| symbol.to_string());
                WalletBalance::new(symbol.clone(), name, *balance)
            })
            .collect())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn begin(&self) -> RepositoryResult<Box<dyn LedgerTransaction>> {
        let guard = Arc::clone(&self.state).write_owned().await;
        let scratch = (*guard).clone();
        let failure = self.failures.lock().once.take();
        Ok(Box::new(InMemoryLedgerTransaction {
            guard,
            scratch,
            failure,
            failures: Arc::clone(&self.failures),
            adjustments: 0,
        }))
    }
}

/// Transaction over an [`InMemoryLedger`].
struct InMemoryLedgerTransaction {
    guard: OwnedRwLockWriteGuard<LedgerState>,
    scratch: LedgerState,
    failure: Option<FailurePoint>,
    failures: Arc<parking_lot::Mutex<FailurePlan>>,
    adjustments: usize,
}

impl InMemoryLedgerTransaction {
    fn injected(&self, point: FailurePoint) -> RepositoryResult<()> {
        if self.failure == Some(point) {
            return Err(RepositoryError::internal(format!(
                "injected failure at {point:?}"
            )));
        }
        Ok(())
    }

    fn take_conflict(&self) -> bool {
        let mut plan = self.failures.lock();
        if plan.conflicts > 0 {
            plan.conflicts -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryLedgerTransaction {
    async fn insert_trade(&mut self, trade: &PendingTrade) -> RepositoryResult<TradeId> {
        self.injected(FailurePoint::InsertTrade)?;
        self.scratch.last_trade_id += 1;
        let trade_id = TradeId::new(self.scratch.last_trade_id);
        self.scratch.trades.push(trade.clone().into_record(trade_id));
        Ok(trade_id)
    }

    async fn adjust_balance(
        &mut self,
        user_id: UserId,
        symbol: &Symbol,
        signed_amount: Decimal,
    ) -> RepositoryResult<()> {
        self.adjustments += 1;
        self.injected(FailurePoint::Adjustment(self.adjustments))?;

        let wallet_id = format!("{user_id}/{symbol}");
        let current = self
            .scratch
            .wallets
            .get(&user_id)
            .and_then(|w| w.get(symbol).copied())
            .unwrap_or(Decimal::ZERO);
        let updated = current
            .safe_add(signed_amount)
            .map_err(|e| RepositoryError::internal(format!("{e} for {wallet_id}")))?;

        if signed_amount < Decimal::ZERO {
            if self.take_conflict() {
                return Err(RepositoryError::conflict(
                    "Wallet",
                    wallet_id,
                    "concurrent update",
                ));
            }
            if updated < Decimal::ZERO {
                return Err(RepositoryError::conflict(
                    "Wallet",
                    wallet_id,
                    "balance would go negative",
                ));
            }
        }

        self.scratch
            .wallets
            .entry(user_id)
            .or_default()
            .insert(symbol.clone(), updated);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        self.injected(FailurePoint::Commit)?;
        let Self {
            mut guard, scratch, ..
        } = *self;
        *guard = scratch;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{PairId, Price, Timestamp, TradeType};

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    fn pending(user: i64) -> PendingTrade {
        PendingTrade {
            user_id: UserId::new(user),
            crypto_pair_id: PairId::new(1),
            trade_type: TradeType::Buy,
            quantity: Decimal::ONE,
            executed_price: Price::new(Decimal::new(100, 0)).unwrap(),
            total_amount: Decimal::new(100, 0),
            notional: Decimal::new(100, 0),
            trade_time: Timestamp::now(),
        }
    }

    async fn seeded() -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        ledger.register_symbol(sym("USDT"), "Tether").await;
        ledger
            .set_balance(UserId::new(1), sym("USDT"), Decimal::new(500, 0))
            .await;
        ledger
            .set_balance(UserId::new(1), sym("BTC"), Decimal::ZERO)
            .await;
        ledger
    }

    #[tokio::test]
    async fn balances_are_ordered_and_named() {
        let ledger = seeded().await;
        let rows = ledger.get_balances(UserId::new(1)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, sym("BTC"));
        assert_eq!(rows[0].display_name, "BTC");
        assert_eq!(rows[1].display_name, "Tether");
        assert!(ledger.get_balances(UserId::new(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_writes_become_visible() {
        let ledger = seeded().await;
        let user = UserId::new(1);

        let mut tx = ledger.begin().await.unwrap();
        let id = tx.insert_trade(&pending(1)).await.unwrap();
        tx.adjust_balance(user, &sym("USDT"), Decimal::new(-100, 0))
            .await
            .unwrap();
        tx.adjust_balance(user, &sym("BTC"), Decimal::ONE).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(id, TradeId::new(1));
        assert_eq!(ledger.balance(user, &sym("USDT")).await, Some(Decimal::new(400, 0)));
        assert_eq!(ledger.balance(user, &sym("BTC")).await, Some(Decimal::ONE));
        assert_eq!(ledger.trade_count().await, 1);
    }

    #[tokio::test]
    async fn dropped_transaction_discards_writes() {
        let ledger = seeded().await;
        let user = UserId::new(1);
        let before = ledger.snapshot(user).await;

        {
            let mut tx = ledger.begin().await.unwrap();
            tx.insert_trade(&pending(1)).await.unwrap();
            tx.adjust_balance(user, &sym("USDT"), Decimal::new(-100, 0))
                .await
                .unwrap();
        }

        assert_eq!(ledger.snapshot(user).await, before);
        assert_eq!(ledger.trade_count().await, 0);
    }

    #[tokio::test]
    async fn rollback_discards_writes() {
        let ledger = seeded().await;
        let user = UserId::new(1);

        let mut tx = ledger.begin().await.unwrap();
        tx.adjust_balance(user, &sym("BTC"), Decimal::ONE).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(ledger.balance(user, &sym("BTC")).await, Some(Decimal::ZERO));
    }

    #[tokio::test]
    async fn guarded_debit_refuses_overdraft() {
        let ledger = seeded().await;
        let user = UserId::new(1);

        let mut tx = ledger.begin().await.unwrap();
        let err = tx
            .adjust_balance(user, &sym("USDT"), Decimal::new(-501, 0))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = tx
            .adjust_balance(user, &sym("ETH"), Decimal::new(-1, 0))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn credit_creates_missing_wallet() {
        let ledger = seeded().await;
        let user = UserId::new(1);

        let mut tx = ledger.begin().await.unwrap();
        tx.adjust_balance(user, &sym("ETH"), Decimal::new(3, 0))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(ledger.balance(user, &sym("ETH")).await, Some(Decimal::new(3, 0)));
    }

    #[tokio::test]
    async fn injected_adjustment_failure_fires_once() {
        let ledger = seeded().await;
        let user = UserId::new(1);
        ledger.inject_failure(FailurePoint::Adjustment(2));

        let mut tx = ledger.begin().await.unwrap();
        tx.adjust_balance(user, &sym("USDT"), Decimal::new(-1, 0))
            .await
            .unwrap();
        assert!(tx.adjust_balance(user, &sym("BTC"), Decimal::ONE).await.is_err());
        drop(tx);

        let mut tx = ledger.begin().await.unwrap();
        tx.adjust_balance(user, &sym("USDT"), Decimal::new(-1, 0))
            .await
            .unwrap();
        tx.adjust_balance(user, &sym("BTC"), Decimal::ONE).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(ledger.balance(user, &sym("USDT")).await, Some(Decimal::new(499, 0)));
    }

    #[tokio::test]
    async fn injected_commit_failure_leaves_state_untouched() {
        let ledger = seeded().await;
        let user = UserId::new(1);
        let before = ledger.snapshot(user).await;
        ledger.inject_failure(FailurePoint::Commit);

        let mut tx = ledger.begin().await.unwrap();
        tx.insert_trade(&pending(1)).await.unwrap();
        tx.adjust_balance(user, &sym("BTC"), Decimal::ONE).await.unwrap();
        assert!(tx.commit().await.is_err());

        assert_eq!(ledger.snapshot(user).await, before);
        assert_eq!(ledger.trade_count().await, 0);
    }

    #[tokio::test]
    async fn injected_conflicts_only_hit_debits() {
        let ledger = seeded().await;
        let user = UserId::new(1);
        ledger.inject_conflicts(1);

        let mut tx = ledger.begin().await.unwrap();
        tx.adjust_balance(user, &sym("BTC"), Decimal::ONE).await.unwrap();
        let err = tx
            .adjust_balance(user, &sym("USDT"), Decimal::new(-1, 0))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        tx.adjust_balance(user, &sym("USDT"), Decimal::new(-1, 0))
            .await
            .unwrap();
    }
}
