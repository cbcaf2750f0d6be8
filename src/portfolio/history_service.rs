use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::history_model::{HistoryImportResult, HistoryPoint};
use super::history_traits::{HistoryRepositoryTrait, HistoryServiceTrait};
use super::portfolio_errors::{PortfolioError, Result};
use super::valuation_service::ValuationServiceTrait;
use crate::constants::PORTFOLIO_SAMPLE_TIME;
use crate::utils::time_utils::parse_flexible_date;

/// Samples the total portfolio value into the history time series, on a
/// daily schedule or on demand.
pub struct HistoryService {
    valuation_service: Arc<dyn ValuationServiceTrait>,
    repository: Arc<dyn HistoryRepositoryTrait>,
}

impl HistoryService {
    pub fn new(
        valuation_service: Arc<dyn ValuationServiceTrait>,
        repository: Arc<dyn HistoryRepositoryTrait>,
    ) -> Self {
        Self {
            valuation_service,
            repository,
        }
    }

    /// Spawns the daily sampler loop. A failed run is logged and the loop
    /// keeps going; the next scheduled run retries naturally.
    pub fn start_daily_sampler(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(next_sample_delay()).await;
                match service.record_portfolio_value().await {
                    Ok(point) => info!(
                        "Recorded portfolio value {} for {}",
                        point.total_value, point.date
                    ),
                    Err(err) => error!("Scheduled portfolio sampling failed: {}", err),
                }
            }
        })
    }

    fn parse_csv_rows(csv_text: &str) -> Result<(Vec<HistoryPoint>, usize)> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(csv_text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| PortfolioError::ImportError(format!("Unreadable CSV: {}", e)))?
            .clone();
        let date_idx = headers.iter().position(|h| h.eq_ignore_ascii_case("date"));
        let value_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("total_value"));
        let (date_idx, value_idx) = match (date_idx, value_idx) {
            (Some(d), Some(v)) => (d, v),
            _ => {
                return Err(PortfolioError::ImportError(
                    "CSV must have 'date' and 'total_value' columns".to_string(),
                ))
            }
        };

        // In-batch duplicate dates keep the last value; BTreeMap also gives
        // back a date-sorted batch.
        let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        let mut skipped = 0usize;

        for record in reader.records() {
            let record =
                record.map_err(|e| PortfolioError::ImportError(format!("Bad CSV row: {}", e)))?;

            let date = record.get(date_idx).and_then(parse_flexible_date);
            let value = record
                .get(value_idx)
                .map(|v| v.replace(',', "."))
                .and_then(|v| Decimal::from_str(v.trim()).ok());

            match (date, value) {
                (Some(date), Some(value)) => {
                    by_date.insert(date, value);
                }
                _ => skipped += 1,
            }
        }

        let points = by_date
            .into_iter()
            .map(|(date, total_value)| HistoryPoint { date, total_value })
            .collect();

        Ok((points, skipped))
    }
}

#[async_trait]
impl HistoryServiceTrait for HistoryService {
    /// Computes the portfolio total and upserts it under today's date.
    /// Running twice on the same date overwrites the earlier value.
    async fn record_portfolio_value(&self) -> Result<HistoryPoint> {
        let valuation = self.valuation_service.get_portfolio_valuation(None).await?;
        let today = Local::now().date_naive();
        self.repository.upsert(today, valuation.total_value)
    }

    fn get_history(&self) -> Result<Vec<HistoryPoint>> {
        self.repository.list()
    }

    /// Imports a (date, total_value) CSV. Rows that fail to parse are
    /// counted and skipped; surviving rows are upserted transactionally
    /// with last-write-wins per date.
    fn import_history_csv(&self, csv_text: &str) -> Result<HistoryImportResult> {
        let (points, skipped) = Self::parse_csv_rows(csv_text)?;

        if points.is_empty() {
            return Err(PortfolioError::ImportError(
                "No valid rows to import".to_string(),
            ));
        }
        if skipped > 0 {
            warn!("History import skipped {} unparsable row(s)", skipped);
        }

        let imported = self.repository.upsert_many(&points)?;
        Ok(HistoryImportResult { imported, skipped })
    }
}

/// Time left until the next scheduled sample (23:59 local by default).
fn next_sample_delay() -> Duration {
    let (hour, minute) = PORTFOLIO_SAMPLE_TIME;
    let now = Local::now().naive_local();
    let today_run = now.date().and_hms_opt(hour, minute, 0).unwrap();
    let next_run = if now < today_run {
        today_run
    } else {
        today_run + chrono::Duration::days(1)
    };
    (next_run - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn csv_rows_dedupe_by_date_last_wins() {
        let csv_text = "date,total_value\n2024-01-01,100\n2024-01-02,110,5\n2024-01-01,105\n";
        let (points, skipped) = HistoryService::parse_csv_rows(csv_text).unwrap();

        assert_eq!(skipped, 0);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].total_value, dec!(105));
    }

    #[test]
    fn unparsable_rows_are_counted_not_fatal() {
        let csv_text = "date,total_value\nnot-a-date,100\n01/03/2024,\"1234,5\"\n";
        let (points, skipped) = HistoryService::parse_csv_rows(csv_text).unwrap();

        assert_eq!(skipped, 1);
        assert_eq!(points.len(), 1);
        assert_eq!(
            points[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(points[0].total_value, dec!(1234.5));
    }

    #[test]
    fn missing_columns_fail_the_import() {
        let err = HistoryService::parse_csv_rows("foo,bar\n1,2\n").unwrap_err();
        assert!(matches!(err, PortfolioError::ImportError(_)));
    }

    #[test]
    fn sampler_delay_is_under_a_day() {
        let delay = next_sample_delay();
        assert!(delay <= Duration::from_secs(24 * 60 * 60));
    }
}
