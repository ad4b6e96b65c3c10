//! # Application Layer
//!
//! Use case orchestration: resolves market data, serializes per-user
//! settlement and drives the ledger commit.

pub mod dto;
pub mod error;
pub mod services;

pub use dto::TradeConfirmation;
pub use error::{TradeError, TradeResult};
pub use services::{TradeService, TradeServiceConfig};
