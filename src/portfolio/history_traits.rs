use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::history_model::{HistoryImportResult, HistoryPoint};
use super::portfolio_errors::Result;

/// Trait defining the contract for history repository operations.
pub trait HistoryRepositoryTrait: Send + Sync {
    fn upsert(&self, date: NaiveDate, total_value: Decimal) -> Result<HistoryPoint>;
    fn upsert_many(&self, points: &[HistoryPoint]) -> Result<usize>;
    fn list(&self) -> Result<Vec<HistoryPoint>>;
}

/// Trait defining the contract for history service operations.
#[async_trait]
pub trait HistoryServiceTrait: Send + Sync {
    async fn record_portfolio_value(&self) -> Result<HistoryPoint>;
    fn get_history(&self) -> Result<Vec<HistoryPoint>>;
    fn import_history_csv(&self, csv_text: &str) -> Result<HistoryImportResult>;
}
