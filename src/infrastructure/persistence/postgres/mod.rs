//! # PostgreSQL Adapters
//!
//! sqlx-backed implementations of the ledger and pair directory ports.
//! The schema lives in `migrations/0001_spot_settlement.sql`.

pub mod ledger;
pub mod pair_directory;

pub use ledger::PostgresLedger;
pub use pair_directory::PostgresPairDirectory;
