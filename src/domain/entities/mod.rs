//! # Domain Entities
//!
//! - [`TradingPair`] / [`QuoteSymbols`]: listed markets with explicit base and quote
//! - [`BestPrice`]: top-of-book quote
//! - [`WalletBalance`] / [`BalanceSnapshot`]: wallet state
//! - [`TradeRequest`], [`PendingTrade`], [`TradeRecord`]: trade lifecycle

pub mod best_price;
pub mod trade;
pub mod trading_pair;
pub mod wallet;

pub use best_price::BestPrice;
pub use trade::{PendingTrade, TradeRecord, TradeRequest};
pub use trading_pair::{QuoteSymbols, TradingPair};
pub use wallet::{BalanceSnapshot, WalletBalance};
