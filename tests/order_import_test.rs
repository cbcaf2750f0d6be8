use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use patrimoine_core::accounts::{AccountRepository, NewAccount};
use patrimoine_core::market_data::{
    MarketDataError, MarketDataServiceTrait, QuoteSummary, SymbolQuote,
};
use patrimoine_core::orders::{OrderImportRow, OrderRepository, OrderService, OrderServiceTrait};

mod common;

/// Market data stub: no quotes, fixed FX rate. The importer never touches
/// quotes; the listing uses the rate.
struct OfflineMarketData;

#[async_trait]
impl MarketDataServiceTrait for OfflineMarketData {
    async fn get_quote(&self, symbol: &str) -> Result<SymbolQuote, MarketDataError> {
        Err(MarketDataError::NotFound(symbol.to_string()))
    }

    async fn get_quotes(&self, _symbols: &[String]) -> HashMap<String, SymbolQuote> {
        HashMap::new()
    }

    async fn get_usd_to_eur_rate(&self) -> Decimal {
        dec!(0.90)
    }

    async fn search_ticker(&self, _query: &str) -> Result<Vec<QuoteSummary>, MarketDataError> {
        Ok(vec![])
    }
}

fn import_row(account_id: &str, symbol: &str, quantity: serde_json::Value) -> OrderImportRow {
    serde_json::from_value(json!({
        "account_id": account_id,
        "account_type_id": "cto",
        "symbol": symbol,
        "type": "buy",
        "quantity": quantity,
        "price": "101,5",
        "date": "15/01/2024",
        "currency": "USD",
    }))
    .unwrap()
}

#[test]
fn import_is_row_tolerant_and_annotates_eur_fields() {
    let (pool, _dir) = common::setup_pool();
    let account_repository = AccountRepository::new(pool.clone());
    let service = OrderService::new(
        Arc::new(OrderRepository::new(pool)),
        Arc::new(OfflineMarketData),
    );

    let created = account_repository
        .create(NewAccount {
            name: "Interactive".to_string(),
            account_type_ids: vec!["cto".to_string()],
        })
        .unwrap();

    let rows = vec![
        import_row(&created.account.id, "msft", json!(2)),
        import_row(&created.account.id, "BROKEN", json!("not-a-number")),
    ];

    let result = service.import_orders(rows).unwrap();
    assert_eq!(result.imported.len(), 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].symbol, "BROKEN");

    let views = tokio_test::block_on(
        service.get_orders_for_envelope(&created.account.id, "cto"),
    )
    .unwrap();
    assert_eq!(views.len(), 1);

    let view = &views[0];
    assert_eq!(view.order.symbol, "MSFT");
    assert_eq!(view.order.quantity, dec!(2));
    assert_eq!(view.order.price, dec!(101.5));
    // USD order converted with the request-scoped rate, 2-decimal display
    assert_eq!(view.total, dec!(203.00));
    assert_eq!(view.price_eur, dec!(91.35));
    assert_eq!(view.total_eur, dec!(182.70));
}
