use async_trait::async_trait;
use log::info;
use serde::Deserialize;
use std::time::Duration;

use super::tickers_errors::{Result, TickerError};
use super::tickers_model::NewTicker;
use super::tickers_traits::TickerCatalogProvider;

const DEFAULT_CATALOG_URL: &str =
    "https://api.massive.com/v3/reference/tickers?market=stocks&active=false&order=asc&sort=ticker&limit=1000";

/// The upstream quota is 5 requests per minute.
const PAGE_DELAY: Duration = Duration::from_secs(12);

#[derive(Debug, Deserialize)]
struct CatalogPage {
    #[serde(default)]
    results: Vec<CatalogEntry>,
    #[serde(default)]
    next_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    market: Option<String>,
}

impl From<CatalogEntry> for NewTicker {
    fn from(entry: CatalogEntry) -> Self {
        NewTicker {
            symbol: entry.symbol,
            description: entry.name.or(entry.description),
            exchange: entry.exchange,
            market: entry.market,
        }
    }
}

/// Paginated reference-catalog client. Follows `next_url` links until the
/// catalog is exhausted, pausing between pages to stay inside the quota.
pub struct ReferenceCatalogProvider {
    client: reqwest::Client,
    start_url: String,
    api_key: String,
}

impl ReferenceCatalogProvider {
    pub fn new(start_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            start_url: start_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads the API key from `MASSIVE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("MASSIVE_API_KEY")
            .map_err(|_| TickerError::MissingConfig("MASSIVE_API_KEY".to_string()))?;
        Ok(Self::new(DEFAULT_CATALOG_URL, api_key))
    }
}

#[async_trait]
impl TickerCatalogProvider for ReferenceCatalogProvider {
    async fn fetch_all(&self) -> Result<Vec<NewTicker>> {
        let mut all_tickers: Vec<NewTicker> = Vec::new();
        let mut next_url = Some(self.start_url.clone());

        while let Some(url) = next_url.take() {
            let page: CatalogPage = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if !page.results.is_empty() {
                all_tickers.extend(page.results.into_iter().map(NewTicker::from));
                info!("{} tickers fetched so far", all_tickers.len());
            }

            // next_url is absolute, provided by the API itself
            next_url = page.next_url;
            if next_url.is_some() {
                tokio::time::sleep(PAGE_DELAY).await;
            }
        }

        Ok(all_tickers)
    }
}
