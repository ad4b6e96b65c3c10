//! # Domain Enums
//!
//! - [`TradeType`] - Buy or Sell direction of a spot trade
//! - [`ParseEnumError`] - Error returned when parsing an enum from text
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Direction of a spot trade, seen from the requesting user.
///
/// A buyer acquires the base currency and pays the ask; a seller disposes of
/// the base currency and receives the bid.
///
/// # Examples
///
/// ```
/// use spot_settlement::domain::value_objects::enums::TradeType;
///
/// assert_eq!(TradeType::Buy.to_string(), "BUY");
/// assert_eq!("sell".parse::<TradeType>().unwrap(), TradeType::Sell);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum TradeType {
    /// Acquire base currency, pay quote currency.
    Buy = 0,
    /// Dispose of base currency, receive quote currency.
    Sell = 1,
}

impl TradeType {
    /// Returns true if this is a buy.
    #[inline]
    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Buy)
    }

    /// Returns true if this is a sell.
    #[inline]
    #[must_use]
    pub const fn is_sell(self) -> bool {
        matches!(self, Self::Sell)
    }

    /// Returns the wire representation (`BUY` / `SELL`).
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(ParseEnumError::InvalidValue("TradeType", s.to_string())),
        }
    }
}

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    /// The value is not a valid variant of the named enum.
    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
}
