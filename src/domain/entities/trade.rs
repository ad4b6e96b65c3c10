//! # Trade
//!
//! Request and record types for spot trades.
//!
//! ```text
//! TradeRequest -> (settle) -> PendingTrade -> (commit) -> TradeRecord
//! ```
//!
//! A [`PendingTrade`] has every field of the final record except the id the
//! ledger assigns on insert. A [`TradeRecord`] is never mutated.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{PairId, Price, Timestamp, TradeId, TradeType, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's request to trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Requesting user.
    pub user_id: UserId,
    /// Pair to trade.
    pub crypto_pair_id: PairId,
    /// Buy or sell.
    pub trade_type: TradeType,
    /// Base-currency quantity.
    pub quantity: Decimal,
}

impl TradeRequest {
    /// Creates a trade request.
    #[must_use]
    pub fn new(user_id: UserId, crypto_pair_id: PairId, trade_type: TradeType, quantity: Decimal) -> Self {
        Self {
            user_id,
            crypto_pair_id,
            trade_type,
            quantity,
        }
    }

    /// Checks that the quantity is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuantity` for zero or negative quantities.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(DomainError::InvalidQuantity(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

/// A settled trade awaiting its ledger id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrade {
    /// Trading user.
    pub user_id: UserId,
    /// Traded pair.
    pub crypto_pair_id: PairId,
    /// Buy or sell.
    pub trade_type: TradeType,
    /// Base-currency quantity.
    pub quantity: Decimal,
    /// Price the trade executed at.
    pub executed_price: Price,
    /// Amount debited from the paying wallet.
    pub total_amount: Decimal,
    /// Quote-currency value of the trade (`executed_price * quantity`).
    pub notional: Decimal,
    /// Settlement time.
    pub trade_time: Timestamp,
}

impl PendingTrade {
    /// Attaches the ledger-assigned id.
    #[must_use]
    pub fn into_record(self, trade_id: TradeId) -> TradeRecord {
        TradeRecord {
            trade_id,
            user_id: self.user_id,
            crypto_pair_id: self.crypto_pair_id,
            trade_type: self.trade_type,
            quantity: self.quantity,
            executed_price: self.executed_price,
            total_amount: self.total_amount,
            notional: self.notional,
            trade_time: self.trade_time,
        }
    }
}

/// A persisted trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Ledger-assigned id.
    pub trade_id: TradeId,
    /// Trading user.
    pub user_id: UserId,
    /// Traded pair.
    pub crypto_pair_id: PairId,
    /// Buy or sell.
    pub trade_type: TradeType,
    /// Base-currency quantity.
    pub quantity: Decimal,
    /// Price the trade executed at.
    pub executed_price: Price,
    /// Amount debited from the paying wallet.
    pub total_amount: Decimal,
    /// Quote-currency value of the trade.
    pub notional: Decimal,
    /// Settlement time.
    pub trade_time: Timestamp,
}
