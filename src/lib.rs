//! # Spot Settlement
//!
//! Executes spot trades between a user's base and quote wallets against the
//! live best bid/ask, applying both wallet legs and the trade record as one
//! atomic ledger commit.
//!
//! # Architecture
//!
//! ```text
//! domain/          value objects, entities, the pure settlement engine
//! application/     TradeService, pair resolution, per-user locks, errors
//! infrastructure/  ports and their in-memory / PostgreSQL adapters
//! config           layered settings
//! telemetry        tracing subscriber
//! ```
//!
//! # Examples
//!
//! ```
//! use spot_settlement::application::{TradeService, TradeServiceConfig};
//! use spot_settlement::domain::entities::{BestPrice, QuoteSymbols, TradeRequest};
//! use spot_settlement::domain::value_objects::{PairId, Price, Symbol, TradeType, UserId};
//! use spot_settlement::infrastructure::persistence::in_memory::{
//!     InMemoryLedger, InMemoryPairDirectory, InMemoryPriceOracle,
//! };
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let oracle = InMemoryPriceOracle::new();
//! let directory = InMemoryPairDirectory::new();
//! let ledger = InMemoryLedger::new();
//!
//! let quotes = QuoteSymbols::new(["USD"]).unwrap();
//! directory.list_name(PairId::new(1), "BTCUSD", &quotes).unwrap();
//! oracle.publish(BestPrice::new(
//!     "BTCUSD",
//!     Price::new(Decimal::new(29000, 0)).ok(),
//!     Price::new(Decimal::new(29050, 0)).ok(),
//! ));
//! let usd = Symbol::new("USD").unwrap();
//! ledger.set_balance(UserId::new(1), usd.clone(), Decimal::new(1000, 0)).await;
//!
//! let service = TradeService::new(
//!     Arc::new(oracle),
//!     Arc::new(directory),
//!     Arc::new(ledger.clone()),
//!     Arc::new(ledger.clone()),
//!     TradeServiceConfig::default(),
//! );
//!
//! let request = TradeRequest::new(UserId::new(1), PairId::new(1), TradeType::Buy, Decimal::new(1, 2));
//! let confirmation = service.execute_trade(request).await.unwrap();
//! assert_eq!(confirmation.updated_balances[&usd], Decimal::new(70950, 2));
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod telemetry;
