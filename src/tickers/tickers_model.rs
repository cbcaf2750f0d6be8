use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference data about one listed symbol. Informational only; the
/// valuation engine never reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub id: String,
    pub symbol: String,
    pub description: Option<String>,
    pub exchange: Option<String>,
    pub market: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Input model for a catalog refresh row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicker {
    pub symbol: String,
    pub description: Option<String>,
    pub exchange: Option<String>,
    pub market: Option<String>,
}

/// Database model for tickers
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::tickers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TickerDB {
    pub id: String,
    pub symbol: String,
    pub description: Option<String>,
    pub exchange: Option<String>,
    pub market: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl From<TickerDB> for Ticker {
    fn from(db: TickerDB) -> Self {
        Self {
            id: db.id,
            symbol: db.symbol,
            description: db.description,
            exchange: db.exchange,
            market: db.market,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewTicker> for TickerDB {
    fn from(new_ticker: NewTicker) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: new_ticker.symbol.trim().to_uppercase(),
            description: new_ticker.description,
            exchange: new_ticker.exchange,
            market: new_ticker.market,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
