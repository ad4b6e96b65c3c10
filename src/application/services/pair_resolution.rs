//! # Pair Resolution
//!
//! Turns a requested pair id into the listed pair and its current quote.
//!
//! The id to pair mapping is built from the pairs the oracle currently
//! quotes: every quoted name is looked up in the directory. A pair that is
//! listed but not quoted therefore resolves exactly like an unknown id.
//! An id that two quoted names resolve to is ambiguous and left out.

use crate::application::error::{TradeError, TradeResult};
use crate::domain::entities::{BestPrice, TradingPair};
use crate::domain::value_objects::PairId;
use crate::infrastructure::persistence::traits::{PairResolver, PriceOracle};
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A listed pair together with its latest quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedPair {
    /// Listing with explicit base and quote.
    pub pair: TradingPair,
    /// Latest best bid/ask.
    pub quote: BestPrice,
}

/// Resolves pair ids against live market data. Read only.
#[derive(Debug, Clone)]
pub struct PairResolution {
    oracle: Arc<dyn PriceOracle>,
    resolver: Arc<dyn PairResolver>,
}

impl PairResolution {
    /// Creates a resolution service.
    #[must_use]
    pub fn new(oracle: Arc<dyn PriceOracle>, resolver: Arc<dyn PairResolver>) -> Self {
        Self { oracle, resolver }
    }

    /// Returns every currently quoted and listed pair keyed by id.
    ///
    /// Ids claimed by more than one quoted name are logged and omitted.
    ///
    /// # Errors
    ///
    /// Returns `TradeError::MarketData` if the oracle or the directory fails.
    pub async fn quoted_pairs(&self) -> TradeResult<HashMap<PairId, QuotedPair>> {
        self.collect().await.map(|(pairs, _)| pairs)
    }

    /// Resolves one pair id.
    ///
    /// # Errors
    ///
    /// Returns `TradeError::UnknownPair` if the id is not among the quoted
    /// pairs, and `TradeError::MarketData` if a collaborator fails or the id
    /// is claimed by more than one quoted name.
    pub async fn resolve(&self, pair_id: PairId) -> TradeResult<QuotedPair> {
        let (mut pairs, ambiguous) = self.collect().await?;
        if ambiguous.contains(&pair_id) {
            return Err(TradeError::market_data(format!(
                "pair {pair_id} is quoted under more than one name"
            )));
        }
        pairs
            .remove(&pair_id)
            .ok_or(TradeError::UnknownPair { pair_id })
    }

    async fn collect(&self) -> TradeResult<(HashMap<PairId, QuotedPair>, HashSet<PairId>)> {
        let quotes = self
            .oracle
            .latest_best_prices()
            .await
            .map_err(|e| TradeError::market_data(e.to_string()))?;

        let lookups = join_all(
            quotes
                .iter()
                .map(|q| self.resolver.find_by_name(q.pair_name())),
        )
        .await;

        let mut pairs = HashMap::with_capacity(quotes.len());
        let mut ambiguous = HashSet::new();
        for (quote, lookup) in quotes.into_iter().zip(lookups) {
            let Some(pair) = lookup.map_err(|e| TradeError::market_data(e.to_string()))? else {
                tracing::debug!(pair = quote.pair_name(), "quoted pair is not listed, skipping");
                continue;
            };
            let id = pair.id();
            if ambiguous.contains(&id) {
                continue;
            }
            if let Some(earlier) = pairs.insert(id, QuotedPair { pair, quote }) {
                tracing::warn!(
                    pair_id = %id,
                    first = earlier.quote.pair_name(),
                    second = pairs.get(&id).map(|p| p.quote.pair_name()).unwrap_or_default(),
                    "two quoted names resolve to the same pair, ignoring both"
                );
                pairs.remove(&id);
                ambiguous.insert(id);
            }
        }
        Ok((pairs, ambiguous))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::QuoteSymbols;
    use crate::domain::value_objects::Price;
    use crate::infrastructure::persistence::in_memory::{InMemoryPairDirectory, InMemoryPriceOracle};
    use rust_decimal::Decimal;

    fn quote(name: &str) -> BestPrice {
        BestPrice::new(
            name,
            Price::new(Decimal::new(100, 0)).ok(),
            Price::new(Decimal::new(101, 0)).ok(),
        )
    }

    fn setup() -> (InMemoryPriceOracle, InMemoryPairDirectory, PairResolution) {
        let oracle = InMemoryPriceOracle::new();
        let directory = InMemoryPairDirectory::new();
        let resolution = PairResolution::new(Arc::new(oracle.clone()), Arc::new(directory.clone()));
        (oracle, directory, resolution)
    }

    #[tokio::test]
    async fn resolves_quoted_listed_pair() {
        let (oracle, directory, resolution) = setup();
        let quotes = QuoteSymbols::new(["USDT"]).unwrap();
        directory.list_name(PairId::new(1), "BTCUSDT", &quotes).unwrap();
        oracle.publish(quote("BTCUSDT"));

        let resolved = resolution.resolve(PairId::new(1)).await.unwrap();
        assert_eq!(resolved.pair.base().as_str(), "BTC");
        assert_eq!(resolved.quote.pair_name(), "BTCUSDT");
    }

    #[tokio::test]
    async fn listed_but_unquoted_pair_is_unknown() {
        let (_oracle, directory, resolution) = setup();
        let quotes = QuoteSymbols::new(["USDT"]).unwrap();
        directory.list_name(PairId::new(2), "ETHUSDT", &quotes).unwrap();

        let err = resolution.resolve(PairId::new(2)).await.unwrap_err();
        assert_eq!(
            err,
            TradeError::UnknownPair {
                pair_id: PairId::new(2)
            }
        );
    }

    #[tokio::test]
    async fn unlisted_quotes_are_skipped() {
        let (oracle, directory, resolution) = setup();
        let quotes = QuoteSymbols::new(["USDT"]).unwrap();
        directory.list_name(PairId::new(1), "BTCUSDT", &quotes).unwrap();
        oracle.publish(quote("BTCUSDT"));
        oracle.publish(quote("DOGEUSDT"));

        let pairs = resolution.quoted_pairs().await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains_key(&PairId::new(1)));
    }

    #[tokio::test]
    async fn id_claimed_by_two_quotes_is_ambiguous() {
        let (oracle, directory, resolution) = setup();
        let quotes = QuoteSymbols::new(["USDT"]).unwrap();
        directory.list_name(PairId::new(1), "BTCUSDT", &quotes).unwrap();
        directory.list_name(PairId::new(1), "XBTUSDT", &quotes).unwrap();
        directory.list_name(PairId::new(2), "ETHUSDT", &quotes).unwrap();
        oracle.publish(quote("BTCUSDT"));
        oracle.publish(quote("XBTUSDT"));
        oracle.publish(quote("ETHUSDT"));

        let pairs = resolution.quoted_pairs().await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(pairs.contains_key(&PairId::new(2)));

        let err = resolution.resolve(PairId::new(1)).await.unwrap_err();
        assert!(matches!(err, TradeError::MarketData(_)), "unexpected error: {err}");
        assert!(resolution.resolve(PairId::new(2)).await.is_ok());
    }

    #[tokio::test]
    async fn oracle_failure_is_market_data_error() {
        let (oracle, _directory, resolution) = setup();
        oracle.set_unavailable(true);
        let err = resolution.resolve(PairId::new(1)).await.unwrap_err();
        assert!(matches!(err, TradeError::MarketData(_)));
    }
}
