//! # Persistence Layer
//!
//! Ports for the settlement engine's collaborators and their adapters.
//!
//! ## Ports
//!
//! - [`PriceOracle`]: latest best bid/ask per pair
//! - [`PairResolver`]: pair listings
//! - [`WalletReader`]: wallet balances
//! - [`LedgerStore`] / [`LedgerTransaction`]: atomic trade and balance writes
//!
//! ## Implementations
//!
//! - `in_memory`: in-memory implementations for testing
//! - `postgres`: PostgreSQL implementations

pub mod in_memory;
pub mod postgres;
pub mod traits;

pub use traits::{
    LedgerStore, LedgerTransaction, PairResolver, PriceOracle, RepositoryError, RepositoryResult,
    WalletReader,
};
