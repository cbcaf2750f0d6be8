use chrono::NaiveDate;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::decimal_serde;

/// One sampled point of the portfolio-value time series. A calendar date
/// carries exactly one value; re-sampling a date overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub date: NaiveDate,
    #[serde(with = "decimal_serde")]
    pub total_value: Decimal,
}

/// Outcome of a history CSV import
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryImportResult {
    pub imported: usize,
    pub skipped: usize,
}

/// Database model for portfolio history points
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolio_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HistoryPointDB {
    pub date: NaiveDate,
    pub total_value: f64,
}

impl From<HistoryPointDB> for HistoryPoint {
    fn from(db: HistoryPointDB) -> Self {
        Self {
            date: db.date,
            total_value: Decimal::from_f64_retain(db.total_value).unwrap_or_default(),
        }
    }
}

impl From<&HistoryPoint> for HistoryPointDB {
    fn from(point: &HistoryPoint) -> Self {
        Self {
            date: point.date,
            total_value: point.total_value.to_f64().unwrap_or_default(),
        }
    }
}
