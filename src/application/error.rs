//! # Application Errors
//!
//! The closed set of failures [`TradeService::execute_trade`] can report.
//!
//! # Error Hierarchy
//!
//! ```text
//! TradeError
//! ├── UnknownPair                - pair id not among quoted pairs
//! ├── NoQuote                    - needed side of the book is empty
//! ├── InsufficientBalance        - debit wallet cannot cover the trade (user facing)
//! ├── DegeneratePair             - base equals quote
//! ├── InvalidQuantity            - quantity not positive
//! ├── Arithmetic                 - amounts overflow or lose precision
//! ├── MarketData                 - oracle, resolver or wallet reader failed
//! ├── LockTimeout                - user's wallets stayed busy
//! ├── CommitFailed               - ledger write failed, nothing applied
//! └── ConcurrentUpdateConflict   - guarded debit lost a race (retried, never returned)
//! ```
//!
//! # Examples
//!
//! ```
//! use spot_settlement::application::error::TradeError;
//! use spot_settlement::domain::value_objects::Symbol;
//! use rust_decimal::Decimal;
//!
//! let err = TradeError::insufficient_balance(
//!     Symbol::new("USDT").unwrap(),
//!     Decimal::new(100, 0),
//!     Decimal::new(40, 0),
//! );
//! assert!(err.is_user_facing());
//! assert_eq!(err.public_message(), "Not enough balance for USDT");
//!
//! let err = TradeError::commit_failed("connection reset");
//! assert!(!err.is_user_facing());
//! assert_eq!(err.public_message(), "trade could not be executed");
//! ```
//!
//! [`TradeService::execute_trade`]: crate::application::services::TradeService::execute_trade

use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ArithmeticError, PairId, Symbol, UserId};
use crate::infrastructure::persistence::RepositoryError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Generic message shown to callers for every non user-facing failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "trade could not be executed";

/// Trade execution error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    /// The pair id does not resolve to any currently quoted pair.
    #[error("unknown pair: {pair_id}")]
    UnknownPair {
        /// Requested pair id.
        pair_id: PairId,
    },

    /// The resolved pair has no price on the required side.
    #[error("no quote available for {pair}")]
    NoQuote {
        /// Pair name.
        pair: String,
    },

    /// The debit wallet cannot cover the trade.
    #[error("Not enough balance for {symbol}: required {required}, available {available}")]
    InsufficientBalance {
        /// Symbol of the debit wallet.
        symbol: Symbol,
        /// Amount the trade would debit.
        required: Decimal,
        /// Balance held before the trade.
        available: Decimal,
    },

    /// Base and quote symbol are the same currency.
    #[error("degenerate pair: base and quote are both {symbol}")]
    DegeneratePair {
        /// The repeated symbol.
        symbol: Symbol,
    },

    /// Trade quantity is zero or negative.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Settlement math did not fit the decimal type.
    #[error("arithmetic error: {0}")]
    Arithmetic(ArithmeticError),

    /// A read-side collaborator failed.
    #[error("market data unavailable: {0}")]
    MarketData(String),

    /// The user's wallets could not be locked in time.
    #[error("timed out waiting for wallets of user {user_id}")]
    LockTimeout {
        /// User whose lock was contended.
        user_id: UserId,
    },

    /// The ledger write failed; no part of the trade was applied.
    #[error("commit failed: {reason}")]
    CommitFailed {
        /// Underlying failure.
        reason: String,
    },

    /// A guarded debit found the balance changed since it was read.
    #[error("concurrent update of wallets of user {user_id}")]
    ConcurrentUpdateConflict {
        /// User whose wallet changed.
        user_id: UserId,
    },
}

impl TradeError {
    /// Creates an insufficient balance error.
    #[must_use]
    pub fn insufficient_balance(symbol: Symbol, required: Decimal, available: Decimal) -> Self {
        Self::InsufficientBalance {
            symbol,
            required,
            available,
        }
    }

    /// Creates a market data error.
    #[must_use]
    pub fn market_data(message: impl Into<String>) -> Self {
        Self::MarketData(message.into())
    }

    /// Creates a commit failed error.
    #[must_use]
    pub fn commit_failed(reason: impl Into<String>) -> Self {
        Self::CommitFailed {
            reason: reason.into(),
        }
    }

    /// Maps a ledger write failure for `user_id`.
    ///
    /// Guard rejections become [`TradeError::ConcurrentUpdateConflict`];
    /// anything else is a [`TradeError::CommitFailed`].
    #[must_use]
    pub fn from_ledger(user_id: UserId, err: &RepositoryError) -> Self {
        if err.is_conflict() {
            Self::ConcurrentUpdateConflict { user_id }
        } else {
            Self::commit_failed(err.to_string())
        }
    }

    /// Returns true if the reason may be shown to the caller verbatim.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::InsufficientBalance { .. })
    }

    /// Returns true if the service may retry after re-reading balances.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentUpdateConflict { .. })
    }

    /// Returns true if this is an insufficient balance error.
    #[must_use]
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, Self::InsufficientBalance { .. })
    }

    /// Message safe to return to the caller.
    ///
    /// Names the short symbol for insufficient balance, generic otherwise.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InsufficientBalance { symbol, .. } => format!("Not enough balance for {symbol}"),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<DomainError> for TradeError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::DegeneratePair { symbol } => Self::DegeneratePair { symbol },
            DomainError::NoQuote { pair } => Self::NoQuote { pair },
            DomainError::InsufficientBalance {
                symbol,
                required,
                available,
            } => Self::InsufficientBalance {
                symbol,
                required,
                available,
            },
            DomainError::InvalidQuantity(msg) => Self::InvalidQuantity(msg),
            DomainError::InvalidListing(msg) => Self::MarketData(msg),
            DomainError::Arithmetic(e) => Self::Arithmetic(e),
        }
    }
}

/// Result type for trade operations.
pub type TradeResult<T> = Result<T, TradeError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn only_insufficient_balance_is_user_facing() {
        let short = TradeError::insufficient_balance(sym("BTC"), Decimal::ONE, Decimal::ZERO);
        assert!(short.is_user_facing());
        assert_eq!(short.public_message(), "Not enough balance for BTC");
        assert!(short.to_string().contains("required 1"));

        let others = [
            TradeError::UnknownPair {
                pair_id: PairId::new(9),
            },
            TradeError::NoQuote {
                pair: "BTCUSDT".to_string(),
            },
            TradeError::DegeneratePair { symbol: sym("USDT") },
            TradeError::InvalidQuantity("0".to_string()),
            TradeError::Arithmetic(ArithmeticError::Overflow),
            TradeError::market_data("feed down"),
            TradeError::LockTimeout {
                user_id: UserId::new(1),
            },
            TradeError::commit_failed("disk full"),
            TradeError::ConcurrentUpdateConflict {
                user_id: UserId::new(1),
            },
        ];
        for err in others {
            assert!(!err.is_user_facing(), "{err}");
            assert_eq!(err.public_message(), GENERIC_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn only_conflict_is_retryable() {
        assert!(
            TradeError::ConcurrentUpdateConflict {
                user_id: UserId::new(1)
            }
            .is_retryable()
        );
        assert!(!TradeError::commit_failed("x").is_retryable());
        assert!(!TradeError::market_data("x").is_retryable());
    }

    #[test]
    fn ledger_conflict_maps_to_concurrent_update() {
        let user = UserId::new(5);
        let conflict = RepositoryError::conflict("Wallet", "5/USDT", "balance would go negative");
        assert_eq!(
            TradeError::from_ledger(user, &conflict),
            TradeError::ConcurrentUpdateConflict { user_id: user }
        );

        let broken = RepositoryError::connection("reset by peer");
        let err = TradeError::from_ledger(user, &broken);
        assert!(matches!(err, TradeError::CommitFailed { ref reason } if reason.contains("reset")));
    }

    #[test]
    fn domain_errors_keep_their_kind() {
        let err: TradeError =
            DomainError::insufficient_balance(sym("USD"), Decimal::TEN, Decimal::ONE).into();
        assert_eq!(
            err,
            TradeError::insufficient_balance(sym("USD"), Decimal::TEN, Decimal::ONE)
        );

        let err: TradeError = DomainError::NoQuote {
            pair: "ETHUSD".to_string(),
        }
        .into();
        assert!(matches!(err, TradeError::NoQuote { .. }));

        let err: TradeError = DomainError::from(ArithmeticError::Overflow).into();
        assert_eq!(err, TradeError::Arithmetic(ArithmeticError::Overflow));
    }
}
