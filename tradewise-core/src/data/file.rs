//! File-backed market data — klines stored as JSON arrays on disk.
//!
//! Layout: `<dir>/<SYMBOL>_<interval>.json`, each file an array of klines
//! with epoch-millisecond timestamps, oldest first. The current price is the
//! last close of the shortest interval that has a file. Balances come from
//! configuration since there is no account behind a directory.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::FileSourceConfig;
use crate::domain::{AccountBalance, Interval, Kline, PriceSeries};

use super::provider::{MarketDataError, MarketDataSource};

#[derive(Debug, Clone)]
pub struct FileMarketDataSource {
    dir: PathBuf,
    balance: AccountBalance,
}

impl FileMarketDataSource {
    pub fn new(dir: impl Into<PathBuf>, balance: AccountBalance) -> Self {
        Self {
            dir: dir.into(),
            balance,
        }
    }

    pub fn from_config(config: &FileSourceConfig) -> Self {
        Self::new(
            config.dir.clone(),
            AccountBalance::new(config.base_balance, config.quote_balance),
        )
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.dir.join(format!("{symbol}_{interval}.json"))
    }

    /// Write klines in the layout this source reads.
    pub fn write_klines(
        &self,
        symbol: &str,
        interval: Interval,
        klines: &[Kline],
    ) -> Result<PathBuf, MarketDataError> {
        let path = self.path_for(symbol, interval);
        let json = serde_json::to_string_pretty(klines).map_err(|e| MarketDataError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|source| MarketDataError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    fn read_klines(&self, path: &Path) -> Result<Vec<Kline>, MarketDataError> {
        let content = std::fs::read_to_string(path).map_err(|source| MarketDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| MarketDataError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

impl MarketDataSource for FileMarketDataSource {
    fn name(&self) -> &str {
        "file"
    }

    fn get_current_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        for interval in Interval::ALL {
            let path = self.path_for(symbol, interval);
            if !path.exists() {
                continue;
            }
            if let Some(k) = self.read_klines(&path)?.last() {
                debug!(path = %path.display(), close = k.close, "price from latest close");
                return Ok(k.close);
            }
        }
        Err(MarketDataError::PriceUnavailable {
            symbol: symbol.to_string(),
        })
    }

    fn get_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<PriceSeries, MarketDataError> {
        let path = self.path_for(symbol, interval);
        if !path.exists() {
            return Err(MarketDataError::NoKlines {
                symbol: symbol.to_string(),
                interval,
            });
        }
        let mut klines = self.read_klines(&path)?;
        let start = klines.len().saturating_sub(limit);
        klines.drain(..start);
        Ok(PriceSeries::new(symbol, interval, klines)?)
    }

    fn get_balance(&self) -> Result<AccountBalance, MarketDataError> {
        Ok(self.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_klines;

    #[test]
    fn reads_tail_of_written_klines() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileMarketDataSource::new(dir.path(), AccountBalance::new(0.0, 500.0));
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        source
            .write_klines("BTCUSDT", Interval::OneHour, &make_klines(&closes))
            .unwrap();

        let series = source.get_klines("BTCUSDT", Interval::OneHour, 5).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.closes(), vec![115.0, 116.0, 117.0, 118.0, 119.0]);
        assert_eq!(source.get_current_price("BTCUSDT").unwrap(), 119.0);
        assert_eq!(source.get_balance().unwrap().quote_asset_qty, 500.0);
    }

    #[test]
    fn missing_file_is_no_klines() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileMarketDataSource::new(dir.path(), AccountBalance::default());
        assert!(matches!(
            source.get_klines("BTCUSDT", Interval::FourHours, 50),
            Err(MarketDataError::NoKlines { .. })
        ));
        assert!(matches!(
            source.get_current_price("BTCUSDT"),
            Err(MarketDataError::PriceUnavailable { .. })
        ));
    }

    #[test]
    fn unordered_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileMarketDataSource::new(dir.path(), AccountBalance::default());
        let mut klines = make_klines(&[1.0, 2.0, 3.0]);
        klines.swap(0, 2);
        source
            .write_klines("BTCUSDT", Interval::OneHour, &klines)
            .unwrap();
        assert!(matches!(
            source.get_klines("BTCUSDT", Interval::OneHour, 10),
            Err(MarketDataError::Series(_))
        ));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileMarketDataSource::new(dir.path(), AccountBalance::default());
        std::fs::write(source.path_for("BTCUSDT", Interval::OneHour), "not json").unwrap();
        assert!(matches!(
            source.get_klines("BTCUSDT", Interval::OneHour, 10),
            Err(MarketDataError::Parse { .. })
        ));
    }
}
