//! # Settlement Engine
//!
//! Pure computation of a spot trade's effect on a user's wallets.
//!
//! [`settle`] takes a request, the user's current balances, the pair's best
//! price and the resolved pair, and returns a [`SettlementOutcome`]
//! describing the trade record to insert and the two balance legs to apply.
//! It never touches storage or the clock; applying the outcome is the
//! ledger's job.
//!
//! # Leg Selection
//!
//! ```text
//! BUY : price = ask, debit quote by price * qty, credit base by qty
//! SELL: price = bid, debit base by qty,          credit quote by price * qty
//! ```
//!
//! # Examples
//!
//! ```
//! use spot_settlement::domain::entities::{BalanceSnapshot, BestPrice, TradeRequest, TradingPair};
//! use spot_settlement::domain::services::settlement::settle;
//! use spot_settlement::domain::value_objects::{PairId, Price, Symbol, Timestamp, TradeType, UserId};
//! use rust_decimal::Decimal;
//!
//! let usd = Symbol::new("USD").unwrap();
//! let btc = Symbol::new("BTC").unwrap();
//! let pair = TradingPair::new(PairId::new(1), btc.clone(), usd.clone()).unwrap();
//! let quote = BestPrice::new(
//!     "BTCUSD",
//!     Price::new(Decimal::new(29000, 0)).ok(),
//!     Price::new(Decimal::new(29050, 0)).ok(),
//! );
//! let mut balances = BalanceSnapshot::new();
//! balances.set(usd.clone(), Decimal::new(1000, 0));
//! balances.set(btc.clone(), Decimal::ZERO);
//!
//! let request = TradeRequest::new(UserId::new(1), PairId::new(1), TradeType::Buy, Decimal::new(1, 2));
//! let outcome = settle(&request, &balances, &quote, &pair, Timestamp::now()).unwrap();
//!
//! assert_eq!(outcome.balances().balance_of(&usd), Decimal::new(70950, 2));
//! assert_eq!(outcome.balances().balance_of(&btc), Decimal::new(1, 2));
//! ```

use crate::domain::entities::{BalanceSnapshot, BestPrice, PendingTrade, TradeRequest, TradingPair};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{
    CheckedArithmetic, SettlementId, Symbol, Timestamp, TradeType, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One side of a settlement: a symbol and the unsigned amount moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLeg {
    /// Wallet currency.
    pub symbol: Symbol,
    /// Unsigned amount.
    pub amount: Decimal,
}

/// Result of a successful settlement computation.
///
/// Holds the trade to record, the debit and credit legs, and the full
/// post-trade balance view for every symbol the user holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementOutcome {
    settlement_id: SettlementId,
    trade: PendingTrade,
    debit: BalanceLeg,
    credit: BalanceLeg,
    balances: BalanceSnapshot,
}

impl SettlementOutcome {
    /// Returns the correlation id of this settlement.
    #[inline]
    #[must_use]
    pub fn settlement_id(&self) -> SettlementId {
        self.settlement_id
    }

    /// Returns the trade to record.
    #[inline]
    #[must_use]
    pub fn trade(&self) -> &PendingTrade {
        &self.trade
    }

    /// Returns the user whose wallets move.
    #[inline]
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.trade.user_id
    }

    /// Returns the debit leg.
    #[inline]
    #[must_use]
    pub fn debit(&self) -> &BalanceLeg {
        &self.debit
    }

    /// Returns the credit leg.
    #[inline]
    #[must_use]
    pub fn credit(&self) -> &BalanceLeg {
        &self.credit
    }

    /// Returns the post-trade balances.
    #[inline]
    #[must_use]
    pub fn balances(&self) -> &BalanceSnapshot {
        &self.balances
    }

    /// Returns the signed wallet adjustments to apply, debit first.
    #[must_use]
    pub fn signed_adjustments(&self) -> [(&Symbol, Decimal); 2] {
        [
            (&self.debit.symbol, -self.debit.amount),
            (&self.credit.symbol, self.credit.amount),
        ]
    }

    /// Splits the outcome into its trade and post-trade balances.
    #[must_use]
    pub fn into_parts(self) -> (PendingTrade, BalanceSnapshot) {
        (self.trade, self.balances)
    }
}

/// Computes the settlement of `request` against `balances`.
///
/// `executed_at` becomes the trade time; callers capture it once.
///
/// # Errors
///
/// - `DomainError::DegeneratePair` if the pair's base equals its quote
/// - `DomainError::InvalidListing` if `pair` is not the requested pair
/// - `DomainError::InvalidQuantity` if the quantity is not positive
/// - `DomainError::NoQuote` if the needed side of the book has no price
/// - `DomainError::InsufficientBalance` if the debit wallet cannot cover the trade
/// - `DomainError::Arithmetic` if the amounts overflow or would be rounded
pub fn settle(
    request: &TradeRequest,
    balances: &BalanceSnapshot,
    quote: &BestPrice,
    pair: &TradingPair,
    executed_at: Timestamp,
) -> DomainResult<SettlementOutcome> {
    if pair.is_degenerate() {
        return Err(DomainError::DegeneratePair {
            symbol: pair.base().clone(),
        });
    }
    if pair.id() != request.crypto_pair_id {
        return Err(DomainError::invalid_listing(format!(
            "resolved pair {} does not match requested pair {}",
            pair.id(),
            request.crypto_pair_id
        )));
    }
    request.validate()?;

    let executed_price = Some(quote)
        .filter(|q| q.pair_name() == pair.name())
        .and_then(|q| q.price_for(request.trade_type))
        .ok_or_else(|| DomainError::NoQuote {
            pair: pair.name().to_string(),
        })?;

    let quantity = request.quantity;
    let notional = executed_price.get().safe_mul(quantity)?;
    if notional.is_zero() {
        return Err(DomainError::InvalidQuantity(format!(
            "{quantity} at {executed_price} has no quote value"
        )));
    }

    let (debit, credit) = match request.trade_type {
        TradeType::Buy => (
            BalanceLeg {
                symbol: pair.quote().clone(),
                amount: notional,
            },
            BalanceLeg {
                symbol: pair.base().clone(),
                amount: quantity,
            },
        ),
        TradeType::Sell => (
            BalanceLeg {
                symbol: pair.base().clone(),
                amount: quantity,
            },
            BalanceLeg {
                symbol: pair.quote().clone(),
                amount: notional,
            },
        ),
    };

    let available = balances.balance_of(&debit.symbol);
    if available < debit.amount {
        return Err(DomainError::insufficient_balance(
            debit.symbol,
            debit.amount,
            available,
        ));
    }

    // Both legs are computed before either is written to the copy.
    let debited = available.safe_sub(debit.amount)?;
    let credited = balances.balance_of(&credit.symbol).safe_add(credit.amount)?;
    let mut updated = balances.clone();
    updated.set(debit.symbol.clone(), debited);
    updated.set(credit.symbol.clone(), credited);

    let trade = PendingTrade {
        user_id: request.user_id,
        crypto_pair_id: request.crypto_pair_id,
        trade_type: request.trade_type,
        quantity,
        executed_price,
        total_amount: debit.amount,
        notional,
        trade_time: executed_at,
    };

    Ok(SettlementOutcome {
        settlement_id: SettlementId::new_v4(),
        trade,
        debit,
        credit,
        balances: updated,
    })
}
