use chrono::NaiveDateTime;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::orders_errors::{OrderError, Result};
use crate::constants::{BASE_CURRENCY, USD_CURRENCY};
use crate::utils::decimal_serde::decimal_serde;

/// Buy/sell marker of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }

    /// Import rows historically treated anything that is not "sell" as a buy.
    pub fn from_lenient(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("sell") {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        }
    }
}

impl FromStr for OrderSide {
    type Err = OrderError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(OrderError::InvalidData(format!(
                "Unknown order side '{}'",
                other
            ))),
        }
    }
}

/// Immutable record of one trade. Quantity and price are always positive;
/// the side carries the sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub account_id: String,
    pub account_type_id: String,
    pub symbol: String,
    pub side: OrderSide,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub price: Decimal,
    pub currency: String,
    pub order_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Input model for creating a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub account_id: String,
    pub account_type_id: String,
    pub symbol: String,
    pub side: String,
    #[serde(with = "decimal_serde")]
    pub quantity: Decimal,
    #[serde(with = "decimal_serde")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDateTime>,
}

impl NewOrder {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(OrderError::InvalidData(
                "Order account id cannot be empty".to_string(),
            ));
        }
        if self.account_type_id.trim().is_empty() {
            return Err(OrderError::InvalidData(
                "Order account type id cannot be empty".to_string(),
            ));
        }
        if self.symbol.trim().is_empty() {
            return Err(OrderError::InvalidData(
                "Order symbol cannot be empty".to_string(),
            ));
        }
        self.side.parse::<OrderSide>()?;
        if self.quantity <= Decimal::ZERO {
            return Err(OrderError::InvalidData(
                "Order quantity must be positive".to_string(),
            ));
        }
        if self.price <= Decimal::ZERO {
            return Err(OrderError::InvalidData(
                "Order price must be positive".to_string(),
            ));
        }
        if let Some(currency) = &self.currency {
            if currency != BASE_CURRENCY && currency != USD_CURRENCY {
                return Err(OrderError::InvalidData(format!(
                    "Unsupported currency '{}'",
                    currency
                )));
            }
        }
        Ok(())
    }

    /// Symbols are stored trimmed and uppercase so grouping is
    /// case-insensitive.
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    /// Currency of the order; when absent it is inferred from the symbol the
    /// way the legacy importer did (a "USD" infix means a dollar listing).
    pub fn resolved_currency(&self) -> String {
        match &self.currency {
            Some(currency) => currency.clone(),
            None => detect_currency(&self.symbol),
        }
    }
}

pub fn detect_currency(symbol: &str) -> String {
    if symbol.to_uppercase().contains(USD_CURRENCY) {
        USD_CURRENCY.to_string()
    } else {
        BASE_CURRENCY.to_string()
    }
}

/// Input model for a full-replace order update
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: String,
    #[serde(flatten)]
    pub order: NewOrder,
}

impl OrderUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(OrderError::InvalidData(
                "Order id is required for updates".to_string(),
            ));
        }
        self.order.validate()
    }
}

/// One order joined with its account and type names (flat listing shape)
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order: Order,
    pub account_name: String,
    pub account_type: String,
}

/// Presentation shape for the flat order list: the order plus its account
/// context and EUR-converted price/total fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub account_name: String,
    pub account_type: String,
    #[serde(with = "decimal_serde")]
    pub price_eur: Decimal,
    #[serde(with = "decimal_serde")]
    pub total: Decimal,
    #[serde(with = "decimal_serde")]
    pub total_eur: Decimal,
}

/// Database model for orders
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OrderDB {
    pub id: String,
    pub account_id: String,
    pub account_type_id: String,
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub price: f64,
    pub currency: String,
    pub order_date: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
}

impl From<OrderDB> for Order {
    fn from(db: OrderDB) -> Self {
        Self {
            id: db.id,
            account_id: db.account_id,
            account_type_id: db.account_type_id,
            symbol: db.symbol,
            side: OrderSide::from_lenient(&db.side),
            quantity: Decimal::from_f64_retain(db.quantity).unwrap_or_default(),
            price: Decimal::from_f64_retain(db.price).unwrap_or_default(),
            currency: db.currency,
            order_date: db.order_date,
            created_at: db.created_at,
        }
    }
}

impl OrderDB {
    /// Builds the insertable row for a validated NewOrder.
    pub(crate) fn from_new(new_order: &NewOrder, id: String, side: OrderSide) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            account_id: new_order.account_id.clone(),
            account_type_id: new_order.account_type_id.clone(),
            symbol: new_order.normalized_symbol(),
            side: side.as_str().to_string(),
            quantity: new_order.quantity.to_f64().unwrap_or_default(),
            price: new_order.price.to_f64().unwrap_or_default(),
            currency: new_order.resolved_currency(),
            order_date: new_order.order_date.unwrap_or(now),
            created_at: now,
        }
    }
}
