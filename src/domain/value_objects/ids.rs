//! # Identifiers
//!
//! Newtype identifiers so user, pair and trade ids cannot be mixed up.
//! Numeric ids mirror the ledger's `BIGINT` keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw identifier.
            #[inline]
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw identifier.
            #[inline]
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a wallet owner.
    UserId
);

numeric_id!(
    /// Identifier of a listed trading pair.
    PairId
);

numeric_id!(
    /// Identifier assigned by the ledger when a trade row is inserted.
    TradeId
);

/// Correlation id of one settlement attempt.
///
/// Never persisted; it ties together the log lines of a single
/// read-settle-commit pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementId(Uuid);

impl SettlementId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SettlementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_display_raw_value() {
        assert_eq!(UserId::new(42).to_string(), "42");
        assert_eq!(PairId::from(7).get(), 7);
    }

    #[test]
    fn numeric_ids_serialize_transparently() {
        let json = serde_json::to_string(&TradeId::new(99)).unwrap();
        assert_eq!(json, "99");
    }

    #[test]
    fn settlement_ids_are_unique() {
        assert_ne!(SettlementId::new_v4(), SettlementId::new_v4());
    }
}
