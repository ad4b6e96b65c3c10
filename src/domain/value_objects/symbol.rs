//! # Currency Symbol
//!
//! Validated ticker of a wallet currency (e.g. `BTC`, `USDT`).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum accepted symbol length.
pub const MAX_SYMBOL_LEN: usize = 16;

/// Error returned for malformed symbols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSymbolError {
    /// The symbol is empty.
    #[error("symbol must not be empty")]
    Empty,

    /// The symbol exceeds [`MAX_SYMBOL_LEN`].
    #[error("symbol too long: {0}")]
    TooLong(String),

    /// The symbol contains characters other than ASCII letters and digits.
    #[error("symbol contains invalid characters: {0}")]
    InvalidCharacters(String),
}

/// A currency ticker, normalised to uppercase ASCII alphanumerics.
///
/// # Examples
///
/// ```
/// use spot_settlement::domain::value_objects::Symbol;
///
/// let btc = Symbol::new("btc").unwrap();
/// assert_eq!(btc.as_str(), "BTC");
/// assert!(Symbol::new("BTC/USD").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol, uppercasing the input.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSymbolError`] if the input is empty, too long, or
    /// contains anything but ASCII letters and digits.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InvalidSymbolError> {
        let raw = value.as_ref().trim();
        if raw.is_empty() {
            return Err(InvalidSymbolError::Empty);
        }
        if raw.len() > MAX_SYMBOL_LEN {
            return Err(InvalidSymbolError::TooLong(raw.to_string()));
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidSymbolError::InvalidCharacters(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    /// Returns the symbol text.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the length in characters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = InvalidSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = InvalidSymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
