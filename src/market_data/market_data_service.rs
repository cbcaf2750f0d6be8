use async_trait::async_trait;
use futures::future::join_all;
use log::warn;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::market_data_errors::Result;
use super::market_data_model::{QuoteSummary, SymbolQuote};
use super::market_data_traits::MarketDataServiceTrait;
use super::providers::MarketDataProvider;
use crate::constants::{
    BASE_CURRENCY, QUOTE_FETCH_TIMEOUT_SECS, USD_CURRENCY, USD_EUR_FALLBACK_RATE,
};

/// Quote gateway: batches per-symbol lookups, bounds each one with a
/// timeout, and shields callers from FX failures.
pub struct MarketDataService {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketDataService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    fn fetch_timeout() -> Duration {
        Duration::from_secs(QUOTE_FETCH_TIMEOUT_SECS)
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    async fn get_quote(&self, symbol: &str) -> Result<SymbolQuote> {
        self.provider.get_latest_quote(symbol).await
    }

    async fn get_quotes(&self, symbols: &[String]) -> HashMap<String, SymbolQuote> {
        let unique: HashSet<&String> = symbols.iter().collect();

        let fetches = unique.into_iter().map(|symbol| async move {
            match timeout(
                Self::fetch_timeout(),
                self.provider.get_latest_quote(symbol),
            )
            .await
            {
                Ok(Ok(quote)) => Some((symbol.clone(), quote)),
                Ok(Err(err)) => {
                    warn!("Quote lookup failed for {}: {}", symbol, err);
                    None
                }
                Err(_) => {
                    warn!("Quote lookup timed out for {}", symbol);
                    None
                }
            }
        });

        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn get_usd_to_eur_rate(&self) -> Decimal {
        match timeout(
            Self::fetch_timeout(),
            self.provider.get_exchange_rate(USD_CURRENCY, BASE_CURRENCY),
        )
        .await
        {
            Ok(Ok(rate)) if rate > Decimal::ZERO => rate,
            Ok(Ok(rate)) => {
                warn!(
                    "Unusable USD->EUR rate {}. Using fallback {}",
                    rate, USD_EUR_FALLBACK_RATE
                );
                USD_EUR_FALLBACK_RATE
            }
            Ok(Err(err)) => {
                warn!(
                    "USD->EUR lookup failed: {}. Using fallback {}",
                    err, USD_EUR_FALLBACK_RATE
                );
                USD_EUR_FALLBACK_RATE
            }
            Err(_) => {
                warn!(
                    "USD->EUR lookup timed out. Using fallback {}",
                    USD_EUR_FALLBACK_RATE
                );
                USD_EUR_FALLBACK_RATE
            }
        }
    }

    async fn search_ticker(&self, query: &str) -> Result<Vec<QuoteSummary>> {
        self.provider.search_ticker(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::market_data_errors::MarketDataError;
    use rust_decimal_macros::dec;

    /// Provider stub that knows a fixed set of symbols and has no FX data.
    #[derive(Default)]
    struct FlakyProvider {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for FlakyProvider {
        async fn get_latest_quote(
            &self,
            symbol: &str,
        ) -> std::result::Result<SymbolQuote, MarketDataError> {
            self.calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if symbol == "AAPL" {
                Ok(SymbolQuote {
                    symbol: symbol.to_string(),
                    long_name: Some("Apple Inc.".to_string()),
                    short_name: Some("Apple".to_string()),
                    price: dec!(180),
                })
            } else {
                Err(MarketDataError::NotFound(symbol.to_string()))
            }
        }

        async fn get_exchange_rate(
            &self,
            _from: &str,
            _to: &str,
        ) -> std::result::Result<Decimal, MarketDataError> {
            Err(MarketDataError::ProviderError("unreachable".to_string()))
        }

        async fn search_ticker(
            &self,
            _query: &str,
        ) -> std::result::Result<Vec<QuoteSummary>, MarketDataError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn failed_symbols_are_absent_from_the_batch() {
        let service = MarketDataService::new(Arc::new(FlakyProvider::default()));
        let quotes = service
            .get_quotes(&["AAPL".to_string(), "MISSING".to_string()])
            .await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes.get("AAPL").unwrap().price, dec!(180));
        assert!(!quotes.contains_key("MISSING"));
    }

    #[tokio::test]
    async fn fx_failure_yields_fallback_rate() {
        let service = MarketDataService::new(Arc::new(FlakyProvider::default()));
        assert_eq!(service.get_usd_to_eur_rate().await, dec!(0.93));
    }

    #[tokio::test]
    async fn duplicate_symbols_are_fetched_once() {
        let provider = Arc::new(FlakyProvider::default());
        let service = MarketDataService::new(provider.clone());
        let quotes = service
            .get_quotes(&["AAPL".to_string(), "AAPL".to_string()])
            .await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(provider.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
