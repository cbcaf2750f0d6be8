use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::orders_model::{NewOrder, Order, OrderSide};
use crate::utils::time_utils::parse_flexible_date;

/// One raw row from an order import. Numeric fields arrive as whatever the
/// upstream spreadsheet produced (numbers, "1,5", "12 €"), so they are kept
/// loose here and cleaned during conversion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderImportRow {
    #[serde(alias = "account_id")]
    pub account_id: String,
    #[serde(alias = "account_type_id")]
    pub account_type_id: String,
    pub symbol: String,
    #[serde(default, alias = "type")]
    pub side: Option<String>,
    pub quantity: serde_json::Value,
    pub price: serde_json::Value,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Per-row import failure report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderImportError {
    pub row: usize,
    pub symbol: String,
    pub message: String,
}

/// Outcome of an order import: rows that failed validation are reported
/// individually, rows that passed were inserted in one transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderImportResult {
    pub imported: Vec<Order>,
    pub errors: Vec<OrderImportError>,
}

/// Cleans a loose numeric cell: decimal commas become points, currency
/// symbols and thousand separators are dropped.
pub(crate) fn parse_flexible_decimal(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().and_then(Decimal::from_f64_retain),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .replace(',', ".")
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

impl OrderImportRow {
    /// Converts the raw row into a creatable order, reporting the first
    /// problem found. Side defaults to buy unless the cell says sell.
    pub(crate) fn into_new_order(self, row: usize) -> Result<NewOrder, OrderImportError> {
        let make_error = |message: String| OrderImportError {
            row,
            symbol: self.symbol.trim().to_uppercase(),
            message,
        };

        if self.symbol.trim().is_empty() {
            return Err(make_error("Missing symbol".to_string()));
        }

        let quantity = parse_flexible_decimal(&self.quantity)
            .filter(|q| *q > Decimal::ZERO)
            .ok_or_else(|| make_error("Invalid quantity".to_string()))?;

        let price = parse_flexible_decimal(&self.price)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| make_error("Invalid price".to_string()))?;

        let side = OrderSide::from_lenient(self.side.as_deref().unwrap_or("buy"));

        let order_date = self
            .date
            .as_deref()
            .and_then(parse_flexible_date)
            .and_then(|d| d.and_hms_opt(0, 0, 0));

        Ok(NewOrder {
            account_id: self.account_id,
            account_type_id: self.account_type_id,
            symbol: self.symbol,
            side: side.as_str().to_string(),
            quantity,
            price,
            currency: self.currency,
            order_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(quantity: serde_json::Value, price: serde_json::Value) -> OrderImportRow {
        OrderImportRow {
            account_id: "acc-1".to_string(),
            account_type_id: "pea".to_string(),
            symbol: " aapl ".to_string(),
            side: Some("Sell".to_string()),
            quantity,
            price,
            date: Some("01/03/2024".to_string()),
            currency: None,
        }
    }

    #[test]
    fn cleans_decimal_commas_and_noise() {
        assert_eq!(
            parse_flexible_decimal(&json!("1,5")),
            Some(dec!(1.5))
        );
        assert_eq!(
            parse_flexible_decimal(&json!("12.30 €")),
            Some(dec!(12.30))
        );
        assert_eq!(parse_flexible_decimal(&json!(2.5)), Some(dec!(2.5)));
        assert_eq!(parse_flexible_decimal(&json!("n/a")), None);
    }

    #[test]
    fn converts_a_valid_row() {
        let new_order = row(json!("1,5"), json!(100.0)).into_new_order(1).unwrap();
        assert_eq!(new_order.quantity, dec!(1.5));
        assert_eq!(new_order.side, "sell");
        assert_eq!(new_order.normalized_symbol(), "AAPL");
        assert_eq!(
            new_order.order_date.unwrap().date(),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn reports_invalid_quantity() {
        let err = row(json!("abc"), json!(100.0)).into_new_order(3).unwrap_err();
        assert_eq!(err.row, 3);
        assert_eq!(err.symbol, "AAPL");
        assert!(err.message.contains("quantity"));
    }

    #[test]
    fn non_sell_side_defaults_to_buy() {
        let mut raw = row(json!(1), json!(2));
        raw.side = Some("achat".to_string());
        let new_order = raw.into_new_order(0).unwrap();
        assert_eq!(new_order.side, "buy");
    }
}
