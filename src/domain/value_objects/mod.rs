//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`UserId`], [`PairId`], [`TradeId`]: ledger keys
//! - [`SettlementId`]: per-attempt correlation id
//!
//! ## Market Types
//!
//! - [`Symbol`]: validated currency ticker
//! - [`Price`]: strictly positive decimal price
//! - [`TradeType`]: Buy or Sell
//!
//! ## Arithmetic
//!
//! - [`ArithmeticError`] / [`CheckedArithmetic`]: overflow-safe decimal math

pub mod arithmetic;
pub mod enums;
pub mod ids;
pub mod price;
pub mod symbol;
pub mod timestamp;

pub use arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
pub use enums::{ParseEnumError, TradeType};
pub use ids::{PairId, SettlementId, TradeId, UserId};
pub use price::{InvalidPriceError, Price};
pub use symbol::{InvalidSymbolError, Symbol};
pub use timestamp::Timestamp;
