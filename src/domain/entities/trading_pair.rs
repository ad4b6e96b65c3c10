//! # Trading Pair
//!
//! A listed spot market, carrying its base and quote symbols as separate
//! fields. Pairs are decomposed once, when they are listed; nothing at trade
//! time slices a pair name.
//!
//! # Examples
//!
//! ```
//! use spot_settlement::domain::entities::{QuoteSymbols, TradingPair};
//! use spot_settlement::domain::value_objects::{PairId, Symbol};
//!
//! let quotes = QuoteSymbols::new(["USDT", "USD"]).unwrap();
//! let pair = TradingPair::from_listing_name(PairId::new(1), "ETHUSDT", &quotes).unwrap();
//! assert_eq!(pair.base().as_str(), "ETH");
//! assert_eq!(pair.quote().as_str(), "USDT");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{PairId, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The set of currencies that may appear as the quote side of a listing.
///
/// Listing names such as `BTCUSDT` are split by the longest configured quote
/// symbol that is a proper suffix of the name, so `USD` and `USDT` can be
/// listed side by side without a fixed-length assumption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSymbols(Vec<Symbol>);

impl QuoteSymbols {
    /// Creates a quote symbol set, longest first.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidListing` if the set is empty or any entry
    /// is not a valid symbol.
    pub fn new<I, S>(symbols: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = symbols
            .into_iter()
            .map(|s| Symbol::new(s.as_ref()).map_err(|e| DomainError::invalid_listing(e.to_string())))
            .collect::<DomainResult<Vec<_>>>()?;
        if parsed.is_empty() {
            return Err(DomainError::invalid_listing(
                "at least one quote symbol is required",
            ));
        }
        parsed.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        parsed.dedup();
        Ok(Self(parsed))
    }

    /// Returns the configured symbols, longest first.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Returns the longest configured quote symbol that `name` ends with,
    /// leaving a non-empty base.
    #[must_use]
    pub fn match_suffix(&self, name: &str) -> Option<&Symbol> {
        self.0
            .iter()
            .find(|q| name.len() > q.len() && name.ends_with(q.as_str()))
    }
}

/// A tradable spot pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    id: PairId,
    name: String,
    base: Symbol,
    quote: Symbol,
}

impl TradingPair {
    /// Lists a pair from explicit base and quote symbols.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DegeneratePair` if base and quote are equal.
    pub fn new(id: PairId, base: Symbol, quote: Symbol) -> DomainResult<Self> {
        if base == quote {
            return Err(DomainError::DegeneratePair { symbol: base });
        }
        let name = format!("{base}{quote}");
        Ok(Self {
            id,
            name,
            base,
            quote,
        })
    }

    /// Lists a pair from its concatenated name using the configured quote
    /// symbols.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidListing` if no configured quote symbol
    /// matches, or the remaining base is not a valid symbol, and
    /// `DomainError::DegeneratePair` if base equals quote.
    pub fn from_listing_name(
        id: PairId,
        name: &str,
        quote_symbols: &QuoteSymbols,
    ) -> DomainResult<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let quote = quote_symbols.match_suffix(&upper).cloned().ok_or_else(|| {
            DomainError::invalid_listing(format!("{name} does not end with a known quote symbol"))
        })?;
        let base_part = upper
            .strip_suffix(quote.as_str())
            .ok_or_else(|| DomainError::invalid_listing(name.to_string()))?;
        let base = Symbol::new(base_part)
            .map_err(|e| DomainError::invalid_listing(format!("{name}: {e}")))?;
        Self::new(id, base, quote)
    }

    /// Rebuilds a pair from stored parts without validation.
    ///
    /// Used by storage adapters; the settlement engine re-checks the
    /// degenerate case itself.
    #[must_use]
    pub fn from_parts(id: PairId, name: String, base: Symbol, quote: Symbol) -> Self {
        Self {
            id,
            name,
            base,
            quote,
        }
    }

    /// Returns the pair id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> PairId {
        self.id
    }

    /// Returns the pair name, e.g. `BTCUSDT`.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the base symbol.
    #[inline]
    #[must_use]
    pub fn base(&self) -> &Symbol {
        &self.base
    }

    /// Returns the quote symbol.
    #[inline]
    #[must_use]
    pub fn quote(&self) -> &Symbol {
        &self.quote
    }

    /// Returns true if base and quote are the same currency.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.base == self.quote
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.base, self.quote)
    }
}
