use log::warn;
use std::sync::Arc;

use crate::accounts::{AccountRepository, AccountService};
use crate::db::{self, DbPool};
use crate::errors::Result;
use crate::market_data::{MarketDataService, YahooProvider};
use crate::orders::{OrderRepository, OrderService};
use crate::portfolio::{HistoryRepository, HistoryService, ValuationService};
use crate::tickers::{ReferenceCatalogProvider, TickerRepository, TickerService};

/// The wired service graph over one connection pool. Built once at process
/// start; dropping it closes the pool. No service reaches for ambient
/// globals — everything flows through this struct.
pub struct ServiceContext {
    pub pool: Arc<DbPool>,
    pub account_service: Arc<AccountService>,
    pub order_service: Arc<OrderService>,
    pub market_data_service: Arc<MarketDataService>,
    pub valuation_service: Arc<ValuationService>,
    pub history_service: Arc<HistoryService>,
    /// Absent when no catalog API key is configured.
    pub ticker_service: Option<Arc<TickerService>>,
}

impl ServiceContext {
    /// Opens (and migrates) the database under `app_data_dir`, then wires
    /// every service with its dependencies.
    pub fn new(app_data_dir: &str) -> Result<Self> {
        let db_path = db::init(app_data_dir)?;
        let pool = db::create_pool(&db_path)?;
        db::run_migrations(&pool)?;

        Self::with_pool(pool)
    }

    /// Wires the service graph over an existing pool (tests use this with a
    /// temporary database).
    pub fn with_pool(pool: Arc<DbPool>) -> Result<Self> {
        let account_repository = Arc::new(AccountRepository::new(pool.clone()));
        let order_repository = Arc::new(OrderRepository::new(pool.clone()));
        let history_repository = Arc::new(HistoryRepository::new(pool.clone()));
        let ticker_repository = Arc::new(TickerRepository::new(pool.clone()));

        let market_data_service = Arc::new(MarketDataService::new(Arc::new(
            YahooProvider::new().map_err(crate::errors::Error::MarketData)?,
        )));

        let account_service = Arc::new(AccountService::new(account_repository.clone()));
        let order_service = Arc::new(OrderService::new(
            order_repository,
            market_data_service.clone(),
        ));
        let valuation_service = Arc::new(ValuationService::new(
            account_repository,
            market_data_service.clone(),
        ));
        let history_service = Arc::new(HistoryService::new(
            valuation_service.clone(),
            history_repository,
        ));

        let ticker_service = match ReferenceCatalogProvider::from_env() {
            Ok(catalog) => Some(Arc::new(TickerService::new(
                ticker_repository,
                Arc::new(catalog),
            ))),
            Err(err) => {
                warn!("Ticker catalog refresh disabled: {}", err);
                None
            }
        };

        Ok(Self {
            pool,
            account_service,
            order_service,
            market_data_service,
            valuation_service,
            history_service,
            ticker_service,
        })
    }
}
