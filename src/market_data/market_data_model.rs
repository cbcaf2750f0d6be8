use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::decimal_serde::decimal_serde;

/// Live quote for one symbol: last traded price plus display names when the
/// provider knows them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolQuote {
    pub symbol: String,
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    #[serde(with = "decimal_serde")]
    pub price: Decimal,
}

impl SymbolQuote {
    /// Preferred display name, falling back to the symbol itself.
    pub fn display_name(&self) -> &str {
        self.long_name
            .as_deref()
            .or(self.short_name.as_deref())
            .unwrap_or(&self.symbol)
    }
}

/// One hit from a ticker search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub symbol: String,
    pub short_name: String,
    pub long_name: String,
    pub exchange: String,
    pub quote_type: String,
}
