use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::market_data_errors::Result;
use super::market_data_model::{QuoteSummary, SymbolQuote};

/// Trait defining the contract for market data service operations.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Fetches one live quote; fails per-symbol, never retries.
    async fn get_quote(&self, symbol: &str) -> Result<SymbolQuote>;

    /// Fetches quotes for a set of symbols concurrently. Symbols whose
    /// lookup fails or times out are simply absent from the map; callers
    /// substitute their own fallback.
    async fn get_quotes(&self, symbols: &[String]) -> HashMap<String, SymbolQuote>;

    /// Current USD->EUR rate. Never fails: any lookup problem yields the
    /// documented fallback constant.
    async fn get_usd_to_eur_rate(&self) -> Decimal;

    async fn search_ticker(&self, query: &str) -> Result<Vec<QuoteSummary>>;
}
