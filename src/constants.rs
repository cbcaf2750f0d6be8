use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Currency used for every roll-up total (envelope, account, portfolio).
pub const BASE_CURRENCY: &str = "EUR";

/// The only foreign currency the ledger accepts.
pub const USD_CURRENCY: &str = "USD";

/// Rate substituted when the live USD->EUR lookup fails.
pub const USD_EUR_FALLBACK_RATE: Decimal = dec!(0.93);

/// Upper bound for a single quote or FX lookup. A slow symbol falls back
/// instead of delaying the whole batch indefinitely.
pub const QUOTE_FETCH_TIMEOUT_SECS: u64 = 10;

/// Local time of day at which the daily portfolio sampler fires.
pub const PORTFOLIO_SAMPLE_TIME: (u32, u32) = (23, 59); // 11:59 PM

/// Decimal precision for valuation calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display amounts (EUR-converted order fields)
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;
