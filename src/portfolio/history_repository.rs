use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::history_model::{HistoryPoint, HistoryPointDB};
use super::history_traits::HistoryRepositoryTrait;
use super::portfolio_errors::{PortfolioError, Result};
use crate::db::{get_connection, DbPool};
use crate::schema::portfolio_history;

/// Repository for the portfolio-value time series
pub struct HistoryRepository {
    pool: Arc<DbPool>,
}

impl HistoryRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Inserts or replaces the value for one date. A single upsert
    /// statement; the date uniqueness constraint is the backstop against
    /// concurrent samplers.
    pub fn upsert(&self, date: NaiveDate, total_value: Decimal) -> Result<HistoryPoint> {
        let point = HistoryPoint { date, total_value };
        let row = HistoryPointDB::from(&point);

        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        diesel::insert_into(portfolio_history::table)
            .values(&row)
            .on_conflict(portfolio_history::date)
            .do_update()
            .set(portfolio_history::total_value.eq(row.total_value))
            .execute(&mut conn)?;

        Ok(point)
    }

    /// Upserts a batch of points in one transaction
    pub fn upsert_many(&self, points: &[HistoryPoint]) -> Result<usize> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        conn.transaction(|conn| {
            for point in points {
                let row = HistoryPointDB::from(point);
                diesel::insert_into(portfolio_history::table)
                    .values(&row)
                    .on_conflict(portfolio_history::date)
                    .do_update()
                    .set(portfolio_history::total_value.eq(row.total_value))
                    .execute(conn)?;
            }
            Ok::<_, PortfolioError>(())
        })?;

        Ok(points.len())
    }

    /// The full series, oldest first
    pub fn list(&self) -> Result<Vec<HistoryPoint>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        portfolio_history::table
            .order(portfolio_history::date.asc())
            .load::<HistoryPointDB>(&mut conn)
            .map(|rows| rows.into_iter().map(HistoryPoint::from).collect())
            .map_err(PortfolioError::from)
    }
}

impl HistoryRepositoryTrait for HistoryRepository {
    fn upsert(&self, date: NaiveDate, total_value: Decimal) -> Result<HistoryPoint> {
        HistoryRepository::upsert(self, date, total_value)
    }

    fn upsert_many(&self, points: &[HistoryPoint]) -> Result<usize> {
        HistoryRepository::upsert_many(self, points)
    }

    fn list(&self) -> Result<Vec<HistoryPoint>> {
        HistoryRepository::list(self)
    }
}
