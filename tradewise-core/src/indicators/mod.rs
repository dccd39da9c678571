//! Indicator engine — pure functions over closes and klines.
//!
//! Every function here substitutes a neutral value on insufficient data
//! instead of failing: RSI 50, averages 0, support/resistance 0. The
//! resulting signal is naturally HOLD-biased because few conditions hold.

pub mod rsi;
pub mod sma;
pub mod support_resistance;

pub use rsi::{rsi, NEUTRAL_RSI};
pub use sma::{moving_averages, sma, MovingAverages};
pub use support_resistance::{support_resistance, SupportResistance};

use serde::{Deserialize, Serialize};

use crate::domain::Kline;

/// Indicator snapshot for one timeframe, computed fresh per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Indicators {
    pub rsi: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub support: f64,
    pub resistance: f64,
}

impl Indicators {
    pub fn compute(klines: &[Kline], rsi_period: usize) -> Self {
        let closes: Vec<f64> = klines.iter().map(|k| k.close).collect();
        let mas = moving_averages(&closes);
        let sr = support_resistance(klines);
        Self {
            rsi: rsi(&closes, rsi_period),
            sma20: mas.sma20,
            sma50: mas.sma50,
            sma200: mas.sma200,
            support: sr.support,
            resistance: sr.resistance,
        }
    }

    /// Neutral snapshot used when there is no data at all.
    pub fn neutral() -> Self {
        Self {
            rsi: NEUTRAL_RSI,
            ..Self::default()
        }
    }
}

/// Create klines from close prices for testing.
///
/// open = prev close (or close for the first kline), high = max(open, close) + 1,
/// low = min(open, close) - 1, hourly timestamps.
#[cfg(test)]
pub fn make_klines(closes: &[f64]) -> Vec<Kline> {
    use chrono::{Duration, TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Kline {
                timestamp: start + Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() < eps,
        "expected {expected}, got {actual} (eps={eps})"
    );
}
