use async_trait::async_trait;
use rust_decimal::Decimal;

use super::super::market_data_errors::MarketDataError;
use super::super::market_data_model::{QuoteSummary, SymbolQuote};

/// External market-data source. One call per distinct symbol per request;
/// callers own batching, timeouts and fallback substitution.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn get_latest_quote(&self, symbol: &str) -> Result<SymbolQuote, MarketDataError>;
    async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError>;
    async fn search_ticker(&self, query: &str) -> Result<Vec<QuoteSummary>, MarketDataError>;
}
