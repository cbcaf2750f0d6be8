use async_trait::async_trait;

use super::tickers_errors::Result;
use super::tickers_model::{NewTicker, Ticker};

/// External catalog of listed symbols (paginated reference API).
#[async_trait]
pub trait TickerCatalogProvider: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<NewTicker>>;
}

/// Trait defining the contract for ticker repository operations.
pub trait TickerRepositoryTrait: Send + Sync {
    fn upsert_catalog(&self, new_tickers: Vec<NewTicker>) -> Result<usize>;
    fn list(&self) -> Result<Vec<Ticker>>;
    fn search(&self, query: &str) -> Result<Vec<Ticker>>;
}

/// Trait defining the contract for ticker service operations.
#[async_trait]
pub trait TickerServiceTrait: Send + Sync {
    async fn refresh_tickers(&self) -> Result<usize>;
    fn list_tickers(&self) -> Result<Vec<Ticker>>;
    fn search_tickers(&self, query: &str) -> Result<Vec<Ticker>>;
}
