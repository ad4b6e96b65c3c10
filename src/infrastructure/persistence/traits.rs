//! # Repository Traits
//!
//! Port definitions for the settlement engine's external collaborators.
//!
//! Implementations can use different backends such as PostgreSQL or
//! in-memory storage.
//!
//! # Available Ports
//!
//! - [`PriceOracle`]: latest best bid/ask per pair
//! - [`PairResolver`]: pair listings by name
//! - [`WalletReader`]: a user's wallet balances
//! - [`LedgerStore`] / [`LedgerTransaction`]: atomic trade and balance writes
//!
//! # Examples
//!
//! ```ignore
//! use spot_settlement::infrastructure::persistence::traits::LedgerStore;
//!
//! async fn record(store: &impl LedgerStore, trade: &PendingTrade) -> RepositoryResult<TradeId> {
//!     let mut tx = store.begin().await?;
//!     let id = tx.insert_trade(trade).await?;
//!     tx.adjust_balance(trade.user_id, &usdt, -trade.total_amount).await?;
//!     tx.adjust_balance(trade.user_id, &btc, trade.quantity).await?;
//!     tx.commit().await?;
//!     Ok(id)
//! }
//! ```

use crate::domain::entities::{BestPrice, PendingTrade, TradingPair, WalletBalance};
use crate::domain::value_objects::{PairId, Symbol, TradeId, UserId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// A guarded update was refused because the row changed underneath it.
    #[error("Conflict: {entity_type} with id {id}: {reason}")]
    Conflict {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
        /// What the guard rejected.
        reason: String,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error.
    #[error("Query error: {0}")]
    Query(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict(
        entity_type: &'static str,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            entity_type,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a guarded-update conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Source of live market prices.
#[async_trait]
pub trait PriceOracle: Send + Sync + fmt::Debug {
    /// Returns the latest best bid/ask for every quoted pair.
    async fn latest_best_prices(&self) -> RepositoryResult<Vec<BestPrice>>;
}

/// Directory of listed trading pairs.
#[async_trait]
pub trait PairResolver: Send + Sync + fmt::Debug {
    /// Finds a listing by pair name, e.g. `BTCUSDT`.
    ///
    /// Returns `None` if the name is not listed.
    async fn find_by_name(&self, pair_name: &str) -> RepositoryResult<Option<TradingPair>>;

    /// Resolves a pair name to its id.
    ///
    /// Returns `None` if the name is not listed.
    async fn resolve_pair_id(&self, pair_name: &str) -> RepositoryResult<Option<PairId>> {
        Ok(self.find_by_name(pair_name).await?.map(|p| p.id()))
    }
}

/// Read access to wallet balances.
#[async_trait]
pub trait WalletReader: Send + Sync + fmt::Debug {
    /// Returns every wallet the user holds, ordered by symbol.
    async fn get_balances(&self, user_id: UserId) -> RepositoryResult<Vec<WalletBalance>>;
}

/// Transactional write access to the wallet ledger.
///
/// Everything written through one [`LedgerTransaction`] becomes visible
/// together on [`LedgerTransaction::commit`], or not at all.
#[async_trait]
pub trait LedgerStore: Send + Sync + fmt::Debug {
    /// Opens a new transaction.
    async fn begin(&self) -> RepositoryResult<Box<dyn LedgerTransaction>>;
}

/// A unit of work against the ledger.
///
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Inserts a trade row and returns the assigned id.
    async fn insert_trade(&mut self, trade: &PendingTrade) -> RepositoryResult<TradeId>;

    /// Adds `signed_amount` to the user's balance in `symbol`.
    ///
    /// Negative amounts are debits and are guarded: if the balance would go
    /// below zero the write is refused.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a debit would overdraw the
    /// wallet.
    async fn adjust_balance(
        &mut self,
        user_id: UserId,
        symbol: &Symbol,
        signed_amount: Decimal,
    ) -> RepositoryResult<()>;

    /// Makes all writes visible.
    async fn commit(self: Box<Self>) -> RepositoryResult<()>;

    /// Discards all writes.
    async fn rollback(self: Box<Self>) -> RepositoryResult<()>;
}
