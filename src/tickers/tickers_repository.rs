use diesel::prelude::*;
use std::sync::Arc;

use crate::db::{get_connection, DbPool};
use crate::schema::tickers;

use super::tickers_errors::{Result, TickerError};
use super::tickers_model::{NewTicker, Ticker, TickerDB};
use super::tickers_traits::TickerRepositoryTrait;

/// Repository for the ticker reference catalog
pub struct TickerRepository {
    pool: Arc<DbPool>,
}

impl TickerRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Refreshes the catalog in one transaction: existing symbols are
    /// updated in place, new ones inserted.
    pub fn upsert_catalog(&self, new_tickers: Vec<NewTicker>) -> Result<usize> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TickerError::DatabaseError(e.to_string()))?;

        let rows: Vec<TickerDB> = new_tickers.into_iter().map(TickerDB::from).collect();
        let count = rows.len();

        conn.transaction(|conn| {
            for row in &rows {
                diesel::insert_into(tickers::table)
                    .values(row)
                    .on_conflict(tickers::symbol)
                    .do_update()
                    .set((
                        tickers::description.eq(&row.description),
                        tickers::exchange.eq(&row.exchange),
                        tickers::market.eq(&row.market),
                        tickers::updated_at.eq(row.updated_at),
                    ))
                    .execute(conn)?;
            }
            Ok::<_, TickerError>(())
        })?;

        Ok(count)
    }

    /// The whole catalog, ordered by symbol
    pub fn list(&self) -> Result<Vec<Ticker>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TickerError::DatabaseError(e.to_string()))?;

        tickers::table
            .order(tickers::symbol.asc())
            .load::<TickerDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Ticker::from).collect())
            .map_err(TickerError::from)
    }

    /// Symbol/description substring search
    pub fn search(&self, query: &str) -> Result<Vec<Ticker>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TickerError::DatabaseError(e.to_string()))?;

        let pattern = format!("%{}%", query.trim());
        tickers::table
            .filter(
                tickers::symbol
                    .like(&pattern)
                    .nullable()
                    .or(tickers::description.like(&pattern)),
            )
            .order(tickers::symbol.asc())
            .load::<TickerDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Ticker::from).collect())
            .map_err(TickerError::from)
    }
}

impl TickerRepositoryTrait for TickerRepository {
    fn upsert_catalog(&self, new_tickers: Vec<NewTicker>) -> Result<usize> {
        TickerRepository::upsert_catalog(self, new_tickers)
    }

    fn list(&self) -> Result<Vec<Ticker>> {
        TickerRepository::list(self)
    }

    fn search(&self, query: &str) -> Result<Vec<Ticker>> {
        TickerRepository::search(self, query)
    }
}
