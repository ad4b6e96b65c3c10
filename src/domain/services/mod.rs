//! # Domain Services
//!
//! Domain services encapsulating business logic that doesn't naturally
//! belong to a single entity.
//!
//! ## Services
//!
//! - [`settlement::settle`]: spot trade settlement computation

pub mod settlement;

pub use settlement::{BalanceLeg, SettlementOutcome, settle};
