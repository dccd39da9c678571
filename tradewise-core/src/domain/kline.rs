//! Kline — one OHLCV candle, and PriceSeries — an ordered run of them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One OHLCV candle. Timestamps serialize as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Kline {
    /// Basic OHLC sanity check: high bounds the body from above, low from below.
    pub fn is_sane(&self) -> bool {
        let fields = [self.open, self.high, self.low, self.close, self.volume];
        if fields.iter().any(|v| !v.is_finite()) {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.volume >= 0.0
    }
}

/// Candle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            Interval::OneMinute => Duration::minutes(1),
            Interval::FiveMinutes => Duration::minutes(5),
            Interval::FifteenMinutes => Duration::minutes(15),
            Interval::OneHour => Duration::hours(1),
            Interval::FourHours => Duration::hours(4),
            Interval::OneDay => Duration::days(1),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| SeriesError::UnknownInterval(s.to_string()))
    }
}

/// Errors raised while assembling a price series.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("timestamps must be strictly increasing: kline {index} at {timestamp} does not follow {previous}")]
    NotIncreasing {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("kline {index} has inconsistent OHLCV values")]
    InsaneKline { index: usize },

    #[error("unknown interval '{0}'")]
    UnknownInterval(String),
}

/// Ordered klines for one symbol and interval, oldest first.
///
/// Construction enforces strictly increasing timestamps, so every consumer
/// can rely on `klines()[len - 1]` being the most recent candle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    interval: Interval,
    klines: Vec<Kline>,
}

impl PriceSeries {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        klines: Vec<Kline>,
    ) -> Result<Self, SeriesError> {
        for (index, kline) in klines.iter().enumerate() {
            if !kline.is_sane() {
                return Err(SeriesError::InsaneKline { index });
            }
            if index > 0 {
                let previous = klines[index - 1].timestamp;
                if kline.timestamp <= previous {
                    return Err(SeriesError::NotIncreasing {
                        index,
                        timestamp: kline.timestamp,
                        previous,
                    });
                }
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            interval,
            klines,
        })
    }

    pub fn empty(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            klines: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn klines(&self) -> &[Kline] {
        &self.klines
    }

    pub fn len(&self) -> usize {
        self.klines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.klines.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.klines.iter().map(|k| k.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.klines.last().map(|k| k.close)
    }

    /// The most recent `n` klines (all of them if the series is shorter).
    pub fn tail(&self, n: usize) -> &[Kline] {
        let start = self.klines.len().saturating_sub(n);
        &self.klines[start..]
    }
}
