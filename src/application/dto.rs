//! # Data Transfer Objects
//!
//! Externally visible shape of a settled trade.

use crate::domain::entities::{BalanceSnapshot, TradeRecord};
use crate::domain::value_objects::{PairId, SettlementId, Symbol, Timestamp, TradeId, TradeType, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confirmation returned for an executed trade.
///
/// `updated_balances` covers every wallet the user holds after the trade,
/// not only the two that moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeConfirmation {
    /// Ledger-assigned trade id.
    pub trade_id: TradeId,
    /// Correlation id of the settlement.
    pub settlement_id: SettlementId,
    /// Trading user.
    pub user_id: UserId,
    /// Traded pair.
    pub crypto_pair_id: PairId,
    /// Buy or sell.
    pub trade_type: TradeType,
    /// Price the trade executed at.
    pub executed_price: Decimal,
    /// Base-currency quantity.
    pub quantity: Decimal,
    /// Amount debited from the paying wallet.
    pub total_amount: Decimal,
    /// Quote-currency value of the trade.
    pub notional: Decimal,
    /// Post-trade balances by symbol.
    pub updated_balances: BTreeMap<Symbol, Decimal>,
    /// Settlement time.
    pub trade_time: Timestamp,
}

impl TradeConfirmation {
    /// Builds the confirmation from the committed record and the post-trade
    /// balances.
    #[must_use]
    pub fn from_settlement(
        settlement_id: SettlementId,
        record: TradeRecord,
        balances: BalanceSnapshot,
    ) -> Self {
        Self {
            trade_id: record.trade_id,
            settlement_id,
            user_id: record.user_id,
            crypto_pair_id: record.crypto_pair_id,
            trade_type: record.trade_type,
            executed_price: record.executed_price.get(),
            quantity: record.quantity,
            total_amount: record.total_amount,
            notional: record.notional,
            updated_balances: balances.into_inner(),
            trade_time: record.trade_time,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Price;

    #[test]
    fn confirmation_serializes_camel_case_with_all_balances() {
        let record = TradeRecord {
            trade_id: TradeId::new(42),
            user_id: UserId::new(1),
            crypto_pair_id: PairId::new(3),
            trade_type: TradeType::Buy,
            quantity: Decimal::new(1, 2),
            executed_price: Price::new(Decimal::new(29050, 0)).unwrap(),
            total_amount: Decimal::new(29050, 2),
            notional: Decimal::new(29050, 2),
            trade_time: Timestamp::from_millis(1_700_000_000_000).unwrap(),
        };
        let balances: BalanceSnapshot = [
            (Symbol::new("USD").unwrap(), Decimal::new(70950, 2)),
            (Symbol::new("BTC").unwrap(), Decimal::new(1, 2)),
            (Symbol::new("ETH").unwrap(), Decimal::new(2, 0)),
        ]
        .into_iter()
        .collect();

        let confirmation =
            TradeConfirmation::from_settlement(SettlementId::new_v4(), record, balances);
        let json = serde_json::to_value(&confirmation).unwrap();

        assert_eq!(json["tradeId"], 42);
        assert_eq!(json["cryptoPairId"], 3);
        assert_eq!(json["tradeType"], "BUY");
        assert_eq!(json["updatedBalances"]["USD"], "709.50");
        assert_eq!(json["updatedBalances"].as_object().unwrap().len(), 3);
    }
}
