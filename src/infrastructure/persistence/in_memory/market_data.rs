//! # In-Memory Market Data
//!
//! In-memory implementations of [`PriceOracle`] and [`PairResolver`] for
//! testing and the command line runner.
//!
//! Both are read far more often than written, so they sit behind a
//! `parking_lot::RwLock` and never hold it across an await point.

use crate::domain::entities::{BestPrice, QuoteSymbols, TradingPair};
use crate::domain::errors::DomainResult;
use crate::domain::value_objects::PairId;
use crate::infrastructure::persistence::traits::{
    PairResolver, PriceOracle, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory implementation of [`PriceOracle`].
///
/// Holds the latest best price per pair name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceOracle {
    quotes: Arc<RwLock<HashMap<String, BestPrice>>>,
    unavailable: Arc<AtomicBool>,
    fetches: Arc<AtomicUsize>,
}

impl InMemoryPriceOracle {
    /// Creates an oracle with no quotes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a quote, replacing any previous quote for the same pair.
    pub fn publish(&self, quote: BestPrice) {
        self.quotes.write().insert(quote.pair_name().to_string(), quote);
    }

    /// Removes the quote for `pair_name`.
    ///
    /// Returns true if a quote was removed.
    pub fn withdraw(&self, pair_name: &str) -> bool {
        self.quotes.write().remove(pair_name).is_some()
    }

    /// Makes every subsequent fetch fail, or succeed again.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns how many times quotes have been fetched.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Returns the number of quoted pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.read().len()
    }

    /// Returns true if no pair is quoted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PriceOracle for InMemoryPriceOracle {
    async fn latest_best_prices(&self) -> RepositoryResult<Vec<BestPrice>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::connection("price feed unavailable"));
        }
        let mut quotes: Vec<BestPrice> = self.quotes.read().values().cloned().collect();
        quotes.sort_by(|a, b| a.pair_name().cmp(b.pair_name()));
        Ok(quotes)
    }
}

/// In-memory implementation of [`PairResolver`].
///
/// Listings are keyed by pair name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPairDirectory {
    pairs: Arc<RwLock<HashMap<String, TradingPair>>>,
}

impl InMemoryPairDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists a pair under its name, replacing any previous listing.
    pub fn list(&self, pair: TradingPair) {
        self.pairs.write().insert(pair.name().to_string(), pair);
    }

    /// Lists a pair from its concatenated name.
    ///
    /// # Errors
    ///
    /// Returns the listing error if `name` cannot be split by
    /// `quote_symbols`.
    pub fn list_name(
        &self,
        id: PairId,
        name: &str,
        quote_symbols: &QuoteSymbols,
    ) -> DomainResult<TradingPair> {
        let pair = TradingPair::from_listing_name(id, name, quote_symbols)?;
        self.list(pair.clone());
        Ok(pair)
    }

    /// Removes the listing for `pair_name`.
    pub fn delist(&self, pair_name: &str) -> bool {
        self.pairs.write().remove(pair_name).is_some()
    }

    /// Returns the number of listed pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.read().len()
    }

    /// Returns true if nothing is listed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PairResolver for InMemoryPairDirectory {
    async fn find_by_name(&self, pair_name: &str) -> RepositoryResult<Option<TradingPair>> {
        Ok(self.pairs.read().get(pair_name).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Price, Symbol};
    use rust_decimal::Decimal;

    fn quote(name: &str, bid: i64, ask: i64) -> BestPrice {
        BestPrice::new(
            name,
            Price::new(Decimal::new(bid, 0)).ok(),
            Price::new(Decimal::new(ask, 0)).ok(),
        )
    }

    #[tokio::test]
    async fn publish_replaces_previous_quote() {
        let oracle = InMemoryPriceOracle::new();
        oracle.publish(quote("BTCUSDT", 100, 101));
        oracle.publish(quote("BTCUSDT", 200, 201));

        let quotes = oracle.latest_best_prices().await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].bid_price().unwrap().get(), Decimal::new(200, 0));
        assert_eq!(oracle.fetch_count(), 1);
    }

    #[tokio::test]
    async fn quotes_are_ordered_by_pair_name() {
        let oracle = InMemoryPriceOracle::new();
        oracle.publish(quote("ETHUSDT", 1, 2));
        oracle.publish(quote("BTCUSDT", 1, 2));

        let names: Vec<String> = oracle
            .latest_best_prices()
            .await
            .unwrap()
            .iter()
            .map(|q| q.pair_name().to_string())
            .collect();
        assert_eq!(names, vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[tokio::test]
    async fn unavailable_feed_errors() {
        let oracle = InMemoryPriceOracle::new();
        oracle.set_unavailable(true);
        assert!(oracle.latest_best_prices().await.is_err());
        oracle.set_unavailable(false);
        assert!(oracle.latest_best_prices().await.is_ok());
    }

    #[tokio::test]
    async fn withdraw_removes_quote() {
        let oracle = InMemoryPriceOracle::new();
        oracle.publish(quote("BTCUSDT", 1, 2));
        assert!(oracle.withdraw("BTCUSDT"));
        assert!(!oracle.withdraw("BTCUSDT"));
        assert!(oracle.is_empty());
    }

    #[tokio::test]
    async fn directory_resolves_listed_names() {
        let directory = InMemoryPairDirectory::new();
        let quotes = QuoteSymbols::new(["USDT", "USD"]).unwrap();
        directory.list_name(PairId::new(1), "BTCUSDT", &quotes).unwrap();
        directory.list_name(PairId::new(2), "ETHUSD", &quotes).unwrap();

        let btc = directory.find_by_name("BTCUSDT").await.unwrap().unwrap();
        assert_eq!(btc.quote(), &Symbol::new("USDT").unwrap());
        assert_eq!(
            directory.resolve_pair_id("ETHUSD").await.unwrap(),
            Some(PairId::new(2))
        );
        assert_eq!(directory.resolve_pair_id("SOLUSD").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delist_removes_listing() {
        let directory = InMemoryPairDirectory::new();
        let pair = TradingPair::new(
            PairId::new(1),
            Symbol::new("BTC").unwrap(),
            Symbol::new("USD").unwrap(),
        )
        .unwrap();
        directory.list(pair);
        assert_eq!(directory.len(), 1);
        assert!(directory.delist("BTCUSD"));
        assert!(directory.find_by_name("BTCUSD").await.unwrap().is_none());
    }
}
