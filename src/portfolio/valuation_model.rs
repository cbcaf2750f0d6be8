use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::{decimal_serde, decimal_serde_option};

/// An amount in the position's own currency paired with its EUR equivalent.
/// The EUR figure always uses the single request-scoped USD->EUR rate, so
/// historical amounts are deliberately valued at today's rate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonetaryValue {
    #[serde(with = "decimal_serde")]
    pub local: Decimal,
    #[serde(with = "decimal_serde")]
    pub base: Decimal,
}

impl MonetaryValue {
    pub fn new(local: Decimal, fx_rate: Decimal) -> Self {
        MonetaryValue {
            local,
            base: local * fx_rate,
        }
    }

    pub fn zero() -> Self {
        MonetaryValue {
            local: Decimal::ZERO,
            base: Decimal::ZERO,
        }
    }
}

/// Derived per-symbol aggregate of one envelope's orders. Only symbols with
/// a strictly positive net quantity survive into the output.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub symbol: String,
    pub long_name: String,
    pub short_name: String,
    pub currency: String,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    /// Net cost divided by net quantity; includes sells, not a FIFO basis.
    #[serde(with = "decimal_serde")]
    pub avg_price: Decimal,
    /// Live price, or avg_price when the quote lookup failed (zero gain).
    #[serde(with = "decimal_serde")]
    pub current_price: Decimal,
    pub cost_basis: MonetaryValue,
    pub market_value: MonetaryValue,
    pub diff_value: MonetaryValue,
    /// None when cost basis is zero (e.g. a fully gifted position).
    #[serde(with = "decimal_serde_option")]
    pub diff_percent: Option<Decimal>,
    #[serde(with = "decimal_serde")]
    pub fx_rate: Decimal,
}

/// Valuation roll-up for one envelope. All amounts are EUR.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeValuation {
    pub account_type_id: String,
    pub name: String,
    #[serde(with = "decimal_serde")]
    pub cash: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_value: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_invested: Decimal,
    #[serde(with = "decimal_serde")]
    pub diff_value: Decimal,
    /// Zero when nothing is invested and no cash is held.
    #[serde(with = "decimal_serde")]
    pub diff_percent: Decimal,
    pub positions: Vec<PositionValuation>,
}

/// Valuation roll-up for one account (EUR)
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountValuation {
    pub id: String,
    pub name: String,
    #[serde(with = "decimal_serde")]
    pub total_value: Decimal,
    pub envelopes: Vec<EnvelopeValuation>,
}

/// The full valuation tree plus the portfolio-wide total (EUR)
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValuation {
    #[serde(with = "decimal_serde")]
    pub total_value: Decimal,
    pub accounts: Vec<AccountValuation>,
}
