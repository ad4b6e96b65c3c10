//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! - [`TradeService`]: end to end trade execution
//! - [`PairResolution`]: pair id to listing and live quote
//! - [`UserLocks`]: per-user critical sections

pub mod pair_resolution;
pub mod trade_service;
pub mod user_locks;

pub use pair_resolution::{PairResolution, QuotedPair};
pub use trade_service::{TradeService, TradeServiceConfig};
pub use user_locks::{UserLockGuard, UserLocks};
