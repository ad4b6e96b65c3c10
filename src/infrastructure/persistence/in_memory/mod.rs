//! # In-Memory Adapters
//!
//! In-memory implementations for testing without database dependencies.
//!
//! ## Available Adapters
//!
//! - [`InMemoryPriceOracle`]: latest best prices
//! - [`InMemoryPairDirectory`]: pair listings
//! - [`InMemoryLedger`]: wallets and trades, with failure injection
//!
//! ## Thread Safety
//!
//! Market data sits behind `parking_lot` locks; the ledger uses a tokio
//! `RwLock` because transactions hold it across await points.

pub mod ledger;
pub mod market_data;

pub use ledger::{FailurePoint, InMemoryLedger};
pub use market_data::{InMemoryPairDirectory, InMemoryPriceOracle};
