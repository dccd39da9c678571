//! Market snapshot — everything one evaluation needs, fetched up front.
//!
//! All collaborator I/O happens here, before the engine runs. The primary
//! (first) timeframe, the current price and the balance are required; a
//! secondary timeframe that fails to load is evaluated as empty.

use tracing::warn;

use crate::config::MarketConfig;
use crate::data::{MarketDataError, MarketDataSource};
use crate::domain::{AccountBalance, PriceSeries};

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub current_price: f64,
    pub balance: AccountBalance,
    /// One series per configured timeframe, in configuration order.
    pub series: Vec<PriceSeries>,
}

pub fn fetch_snapshot(
    source: &dyn MarketDataSource,
    market: &MarketConfig,
) -> Result<MarketSnapshot, MarketDataError> {
    let symbol = market.symbol.as_str();
    let current_price = source.get_current_price(symbol)?;
    let balance = source.get_balance()?;

    let mut series = Vec::with_capacity(market.timeframes.len());
    for (i, tf) in market.timeframes.iter().enumerate() {
        match source.get_klines(symbol, tf.interval, tf.limit) {
            Ok(s) if i == 0 && s.is_empty() => {
                return Err(MarketDataError::NoKlines {
                    symbol: symbol.to_string(),
                    interval: tf.interval,
                })
            }
            Ok(s) => series.push(s),
            Err(e) if i == 0 => return Err(e),
            Err(e) => {
                warn!(source = source.name(), interval = %tf.interval, error = %e, "secondary timeframe unavailable");
                series.push(PriceSeries::empty(symbol, tf.interval));
            }
        }
    }

    Ok(MarketSnapshot {
        symbol: symbol.to_string(),
        current_price,
        balance,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatedConfig;
    use crate::data::SimulatedMarketDataSource;
    use crate::domain::Interval;

    #[test]
    fn default_market_fetches_two_timeframes() {
        let sim = SimulatedMarketDataSource::new("BTCUSDT", SimulatedConfig::default());
        let snapshot = fetch_snapshot(&sim, &MarketConfig::default()).unwrap();
        assert_eq!(snapshot.series.len(), 2);
        assert_eq!(snapshot.series[0].interval(), Interval::OneHour);
        assert_eq!(snapshot.series[0].len(), 100);
        assert_eq!(snapshot.series[1].len(), 50);
        assert_eq!(snapshot.balance, AccountBalance::new(0.001, 1000.0));
    }

    #[test]
    fn unknown_symbol_fails_fetch() {
        let sim = SimulatedMarketDataSource::new("ETHUSDT", SimulatedConfig::default());
        assert!(fetch_snapshot(&sim, &MarketConfig::default()).is_err());
    }
}
