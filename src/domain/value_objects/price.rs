//! # Price Value Object
//!
//! Quote-currency price of one unit of base currency. Always strictly
//! positive; a side of the book with no price is modelled as `Option<Price>`
//! rather than as zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned when constructing a non-positive price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("price must be positive, got {0}")]
pub struct InvalidPriceError(pub Decimal);

/// A strictly positive decimal price.
///
/// # Examples
///
/// ```
/// use spot_settlement::domain::value_objects::Price;
/// use rust_decimal::Decimal;
///
/// let ask = Price::new(Decimal::new(29050, 0)).unwrap();
/// assert_eq!(ask.get(), Decimal::new(29050, 0));
/// assert!(Price::new(Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Creates a price.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPriceError`] if `value` is zero or negative.
    pub fn new(value: Decimal) -> Result<Self, InvalidPriceError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(InvalidPriceError(value))
        }
    }

    /// Returns the decimal value.
    #[inline]
    #[must_use]
    pub fn get(self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = InvalidPriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}
