use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use yahoo::YQuoteItem;
use yahoo_finance_api as yahoo;

use super::super::market_data_errors::MarketDataError;
use super::super::market_data_model::{QuoteSummary, SymbolQuote};
use super::market_data_provider::MarketDataProvider;

impl From<&YQuoteItem> for QuoteSummary {
    fn from(item: &YQuoteItem) -> Self {
        QuoteSummary {
            symbol: item.symbol.clone(),
            short_name: item.short_name.clone(),
            long_name: item.long_name.clone(),
            exchange: item.exchange.clone(),
            quote_type: item.quote_type.clone(),
        }
    }
}

pub struct YahooProvider {
    provider: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let provider = yahoo::YahooConnector::new().map_err(MarketDataError::from)?;
        Ok(YahooProvider { provider })
    }

    /// Display names come from the search endpoint; a miss there is not a
    /// reason to fail the quote.
    async fn lookup_names(&self, symbol: &str) -> (Option<String>, Option<String>) {
        match self.provider.search_ticker(symbol).await {
            Ok(result) => {
                let item = result
                    .quotes
                    .iter()
                    .find(|q| q.symbol.eq_ignore_ascii_case(symbol));
                (
                    item.map(|i| i.long_name.clone()).filter(|n| !n.is_empty()),
                    item.map(|i| i.short_name.clone()).filter(|n| !n.is_empty()),
                )
            }
            Err(err) => {
                debug!("No name data for {}: {}", symbol, err);
                (None, None)
            }
        }
    }

    async fn fetch_latest_close(&self, symbol: &str) -> Result<Decimal, MarketDataError> {
        let response = self.provider.get_latest_quotes(symbol, "1d").await?;
        let latest = response.last_quote()?;
        Decimal::from_f64_retain(latest.close).ok_or_else(|| {
            MarketDataError::InvalidData(format!("Unusable close price for {}", symbol))
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn get_latest_quote(&self, symbol: &str) -> Result<SymbolQuote, MarketDataError> {
        let price = self.fetch_latest_close(symbol).await?;
        let (long_name, short_name) = self.lookup_names(symbol).await;

        Ok(SymbolQuote {
            symbol: symbol.to_string(),
            long_name,
            short_name,
            price,
        })
    }

    async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<Decimal, MarketDataError> {
        if from == to {
            return Ok(Decimal::ONE);
        }
        let fx_symbol = format!("{}{}=X", from, to);
        let rate = self.fetch_latest_close(&fx_symbol).await?;
        if rate <= Decimal::ZERO {
            return Err(MarketDataError::InvalidData(format!(
                "Non-positive rate for {}",
                fx_symbol
            )));
        }
        Ok(rate)
    }

    async fn search_ticker(&self, query: &str) -> Result<Vec<QuoteSummary>, MarketDataError> {
        let result = self.provider.search_ticker(query).await?;
        Ok(result.quotes.iter().map(QuoteSummary::from).collect())
    }
}
