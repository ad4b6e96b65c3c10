//! # Wallet Balances
//!
//! [`WalletBalance`] is one row as read from the ledger;
//! [`BalanceSnapshot`] is the transient per-trade view of all of a user's
//! wallets that the settlement engine works on.

use crate::domain::value_objects::Symbol;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user's balance in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    /// Currency symbol.
    pub symbol: Symbol,
    /// Human readable currency name, e.g. `Bitcoin`.
    pub display_name: String,
    /// Current balance.
    pub balance: Decimal,
}

impl WalletBalance {
    /// Creates a wallet balance row.
    #[must_use]
    pub fn new(symbol: Symbol, display_name: impl Into<String>, balance: Decimal) -> Self {
        Self {
            symbol,
            display_name: display_name.into(),
            balance,
        }
    }
}

/// Balances of one user keyed by symbol, ordered by symbol.
///
/// A symbol the user holds no wallet for reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSnapshot(BTreeMap<Symbol, Decimal>);

impl BalanceSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the balance for `symbol`, zero if absent.
    #[must_use]
    pub fn balance_of(&self, symbol: &Symbol) -> Decimal {
        self.0.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Returns true if the user holds a wallet for `symbol`.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.0.contains_key(symbol)
    }

    /// Sets the balance for `symbol`.
    pub fn set(&mut self, symbol: Symbol, balance: Decimal) {
        self.0.insert(symbol, balance);
    }

    /// Iterates over `(symbol, balance)` pairs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Decimal)> {
        self.0.iter()
    }

    /// Returns the number of wallets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the user holds no wallets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if no balance is negative.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.0.values().all(|b| *b >= Decimal::ZERO)
    }

    /// Consumes the snapshot, returning the inner map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<Symbol, Decimal> {
        self.0
    }
}

impl From<Vec<WalletBalance>> for BalanceSnapshot {
    fn from(rows: Vec<WalletBalance>) -> Self {
        rows.into_iter().map(|w| (w.symbol, w.balance)).collect()
    }
}

impl FromIterator<(Symbol, Decimal)> for BalanceSnapshot {
    fn from_iter<T: IntoIterator<Item = (Symbol, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s).unwrap()
    }

    #[test]
    fn missing_symbol_reads_as_zero() {
        let snapshot = BalanceSnapshot::new();
        assert_eq!(snapshot.balance_of(&sym("BTC")), Decimal::ZERO);
        assert!(!snapshot.contains(&sym("BTC")));
    }

    #[test]
    fn from_rows_keeps_every_symbol_in_order() {
        let snapshot = BalanceSnapshot::from(vec![
            WalletBalance::new(sym("USDT"), "Tether", Decimal::new(1000, 0)),
            WalletBalance::new(sym("BTC"), "Bitcoin", Decimal::ZERO),
            WalletBalance::new(sym("ETH"), "Ethereum", Decimal::new(5, 1)),
        ]);
        let symbols: Vec<&str> = snapshot.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "USDT"]);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn non_negative_check() {
        let mut snapshot = BalanceSnapshot::new();
        snapshot.set(sym("USDT"), Decimal::ZERO);
        assert!(snapshot.is_non_negative());
        snapshot.set(sym("BTC"), Decimal::new(-1, 8));
        assert!(!snapshot.is_non_negative());
    }
}
