//! # Best Price
//!
//! Top-of-book quote for one pair as published by the price oracle.

use crate::domain::value_objects::{Price, TradeType};
use serde::{Deserialize, Serialize};

/// Best bid and ask for a pair.
///
/// Either side may be missing when the market has no liquidity on it.
///
/// # Examples
///
/// ```
/// use spot_settlement::domain::entities::BestPrice;
/// use spot_settlement::domain::value_objects::{Price, TradeType};
/// use rust_decimal::Decimal;
///
/// let quote = BestPrice::new(
///     "BTCUSDT",
///     Price::new(Decimal::new(100, 0)).ok(),
///     Price::new(Decimal::new(101, 0)).ok(),
/// );
/// assert_eq!(quote.price_for(TradeType::Buy).map(|p| p.get()), Some(Decimal::new(101, 0)));
/// assert_eq!(quote.price_for(TradeType::Sell).map(|p| p.get()), Some(Decimal::new(100, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPrice {
    pair_name: String,
    bid_price: Option<Price>,
    ask_price: Option<Price>,
}

impl BestPrice {
    /// Creates a quote.
    #[must_use]
    pub fn new(pair_name: impl Into<String>, bid_price: Option<Price>, ask_price: Option<Price>) -> Self {
        Self {
            pair_name: pair_name.into(),
            bid_price,
            ask_price,
        }
    }

    /// Returns the pair name this quote is for.
    #[inline]
    #[must_use]
    pub fn pair_name(&self) -> &str {
        &self.pair_name
    }

    /// Returns the best bid.
    #[inline]
    #[must_use]
    pub fn bid_price(&self) -> Option<Price> {
        self.bid_price
    }

    /// Returns the best ask.
    #[inline]
    #[must_use]
    pub fn ask_price(&self) -> Option<Price> {
        self.ask_price
    }

    /// Returns the price a trade of the given type executes at: the ask for
    /// a buy, the bid for a sell.
    #[inline]
    #[must_use]
    pub fn price_for(&self, trade_type: TradeType) -> Option<Price> {
        match trade_type {
            TradeType::Buy => self.ask_price,
            TradeType::Sell => self.bid_price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn price(v: i64) -> Option<Price> {
        Price::new(Decimal::new(v, 0)).ok()
    }

    #[test]
    fn one_sided_book() {
        let quote = BestPrice::new("ETHUSDT", price(2000), None);
        assert!(quote.price_for(TradeType::Buy).is_none());
        assert_eq!(quote.price_for(TradeType::Sell), price(2000));
    }

    #[test]
    fn serde_roundtrip_preserves_missing_side() {
        let quote = BestPrice::new("ETHUSDT", None, price(2001));
        let json = serde_json::to_string(&quote).unwrap();
        let back: BestPrice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, quote);
    }
}
