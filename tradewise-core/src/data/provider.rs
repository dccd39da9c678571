//! MarketDataSource trait and structured error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{AccountBalance, Interval, PriceSeries, SeriesError};

/// Errors from market data collaborators.
///
/// The decision engine turns every one of these into a HOLD recommendation;
/// none of them cross `evaluate` as an error.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("current price unavailable for {symbol}")]
    PriceUnavailable { symbol: String },

    #[error("no {interval} klines available for {symbol}")]
    NoKlines { symbol: String, interval: Interval },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("simulated clock at step {tick} cannot advance {steps} steps past step {horizon}")]
    ClockExhausted { tick: u64, steps: u64, horizon: u64 },

    #[error("balance unavailable: {0}")]
    BalanceUnavailable(String),

    #[error("invalid price series: {0}")]
    Series(#[from] SeriesError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Supplier of prices, candles and balances.
///
/// Implementations own their own timeouts and retries.
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    fn get_current_price(&self, symbol: &str) -> Result<f64, MarketDataError>;

    /// The most recent `limit` klines, oldest first.
    fn get_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<PriceSeries, MarketDataError>;

    fn get_balance(&self) -> Result<AccountBalance, MarketDataError>;
}
