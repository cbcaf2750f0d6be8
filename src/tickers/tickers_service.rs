use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use super::tickers_errors::Result;
use super::tickers_model::Ticker;
use super::tickers_traits::{TickerCatalogProvider, TickerRepositoryTrait, TickerServiceTrait};

/// Service for the ticker reference catalog
pub struct TickerService {
    repository: Arc<dyn TickerRepositoryTrait>,
    catalog: Arc<dyn TickerCatalogProvider>,
}

impl TickerService {
    pub fn new(
        repository: Arc<dyn TickerRepositoryTrait>,
        catalog: Arc<dyn TickerCatalogProvider>,
    ) -> Self {
        Self {
            repository,
            catalog,
        }
    }
}

#[async_trait]
impl TickerServiceTrait for TickerService {
    /// Pulls the whole external catalog and upserts it. Meant for a monthly
    /// schedule or a manual refresh.
    async fn refresh_tickers(&self) -> Result<usize> {
        let catalog = self.catalog.fetch_all().await?;
        let count = self.repository.upsert_catalog(catalog)?;
        info!("Ticker catalog refreshed: {} symbols", count);
        Ok(count)
    }

    fn list_tickers(&self) -> Result<Vec<Ticker>> {
        self.repository.list()
    }

    fn search_tickers(&self, query: &str) -> Result<Vec<Ticker>> {
        self.repository.search(query)
    }
}
