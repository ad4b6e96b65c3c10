//! # Infrastructure Layer
//!
//! Ports for market data and the wallet ledger, with in-memory and
//! PostgreSQL adapters.

pub mod persistence;
