//! # PostgreSQL Ledger
//!
//! PostgreSQL implementation of [`WalletReader`] and [`LedgerStore`] using
//! sqlx.
//!
//! Each [`LedgerTransaction`] wraps one `sqlx::Transaction`. Debits are a
//! guarded `UPDATE ... WHERE balance + $delta >= 0`, so a stale read can
//! never overdraw a wallet even without the service-level lock. Credits
//! upsert, creating the wallet row on first use.

use crate::domain::entities::{PendingTrade, WalletBalance};
use crate::domain::value_objects::{Symbol, TradeId, UserId};
use crate::infrastructure::persistence::traits::{
    LedgerStore, LedgerTransaction, RepositoryError, RepositoryResult, WalletReader,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

/// PostgreSQL implementation of [`WalletReader`] and [`LedgerStore`].
///
/// # Examples
///
/// ```ignore
/// use spot_settlement::infrastructure::persistence::postgres::PostgresLedger;
///
/// let ledger = PostgresLedger::connect("postgres://...", 10).await?;
/// let balances = ledger.get_balances(UserId::new(1)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Creates a ledger over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Connection` if the database is unreachable.
    pub async fn connect(database_url: &str, max_connections: u32) -> RepositoryResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WalletReader for PostgresLedger {
    async fn get_balances(&self, user_id: UserId) -> RepositoryResult<Vec<WalletBalance>> {
        let rows: Vec<WalletRow> = sqlx::query_as(
            r#"
            SELECT s.symbol, s.name, uw.balance
            FROM symbols s
            INNER JOIN user_wallets uw ON s.id = uw.symbol_id AND uw.user_id = $1
            ORDER BY s.symbol
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        rows.into_iter().map(WalletRow::try_into_balance).collect()
    }
}

#[async_trait]
impl LedgerStore for PostgresLedger {
    async fn begin(&self) -> RepositoryResult<Box<dyn LedgerTransaction>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        Ok(Box::new(PostgresLedgerTransaction { tx }))
    }
}

/// Transaction over a [`PostgresLedger`].
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
struct PostgresLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PostgresLedgerTransaction {
    async fn insert_trade(&mut self, trade: &PendingTrade) -> RepositoryResult<TradeId> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO trades (
                user_id, crypto_pair_id, trade_type, quantity, price,
                total_amount, notional, trade_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(trade.user_id.get())
        .bind(trade.crypto_pair_id.get())
        .bind(trade.trade_type.as_str())
        .bind(trade.quantity)
        .bind(trade.executed_price.get())
        .bind(trade.total_amount)
        .bind(trade.notional)
        .bind(*trade.trade_time.as_datetime())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        Ok(TradeId::new(id))
    }

    async fn adjust_balance(
        &mut self,
        user_id: UserId,
        symbol: &Symbol,
        signed_amount: Decimal,
    ) -> RepositoryResult<()> {
        let wallet_id = format!("{user_id}/{symbol}");

        if signed_amount < Decimal::ZERO {
            let result = sqlx::query(
                r#"
                UPDATE user_wallets
                SET balance = balance + $3
                WHERE user_id = $1
                  AND symbol_id = (SELECT id FROM symbols WHERE symbol = $2)
                  AND balance + $3 >= 0
                "#,
            )
            .bind(user_id.get())
            .bind(symbol.as_str())
            .bind(signed_amount)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))?;

            if result.rows_affected() == 0 {
                return Err(RepositoryError::conflict(
                    "Wallet",
                    wallet_id,
                    "balance would go negative or wallet missing",
                ));
            }
            return Ok(());
        }

        let result = sqlx::query(
            r#"
            INSERT INTO user_wallets (user_id, symbol_id, balance)
            SELECT $1, s.id, $3 FROM symbols s WHERE s.symbol = $2
            ON CONFLICT (user_id, symbol_id)
            DO UPDATE SET balance = user_wallets.balance + EXCLUDED.balance
            "#,
        )
        .bind(user_id.get())
        .bind(symbol.as_str())
        .bind(signed_amount)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Symbol", symbol.as_str()));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RepositoryResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))
    }

    async fn rollback(self: Box<Self>) -> RepositoryResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| RepositoryError::query(e.to_string()))
    }
}

/// Row type for wallet queries.
#[derive(Debug, sqlx::FromRow)]
struct WalletRow {
    symbol: String,
    name: String,
    balance: Decimal,
}

impl WalletRow {
    /// Converts the row into a WalletBalance.
    fn try_into_balance(self) -> RepositoryResult<WalletBalance> {
        let symbol = Symbol::new(&self.symbol)
            .map_err(|e| RepositoryError::internal(format!("stored symbol {}: {e}", self.symbol)))?;
        Ok(WalletBalance::new(symbol, self.name, self.balance))
    }
}
