//! # Domain Errors
//!
//! Business rule violations raised by entities and the settlement engine.
//! These are terminal for the request: nothing has been written when one of
//! them is returned.

use crate::domain::value_objects::{ArithmeticError, Symbol};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error raised by domain logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Base and quote symbol of a pair are the same currency.
    #[error("degenerate pair: base and quote are both {symbol}")]
    DegeneratePair {
        /// The repeated symbol.
        symbol: Symbol,
    },

    /// The side of the book required by the trade has no price.
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

    /// Trade quantity is zero or negative.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A pair listing could not be decomposed into base and quote.
    #[error("invalid pair listing: {0}")]
    InvalidListing(String),

    /// Settlement math did not fit the decimal type.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl DomainError {
    /// Creates an insufficient balance error.
    #[must_use]
    pub fn insufficient_balance(symbol: Symbol, required: Decimal, available: Decimal) -> Self {
        Self::InsufficientBalance {
            symbol,
            required,
            available,
        }
    }

    /// Creates an invalid listing error.
    #[must_use]
    pub fn invalid_listing(message: impl Into<String>) -> Self {
        Self::InvalidListing(message.into())
    }

    /// Returns true if this is an insufficient balance error.
    #[must_use]
    pub fn is_insufficient_balance(&self) -> bool {
        matches!(self, Self::InsufficientBalance { .. })
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
