//! Simple moving averages over the trailing window.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
}

/// Mean of the last `min(period, len)` closes; 0 for empty input.
pub fn sma(closes: &[f64], period: usize) -> f64 {
    let n = period.min(closes.len());
    if n == 0 {
        return 0.0;
    }
    closes[closes.len() - n..].iter().sum::<f64>() / n as f64
}

pub fn moving_averages(closes: &[f64]) -> MovingAverages {
    MovingAverages {
        sma20: sma(closes, 20),
        sma50: sma(closes, 50),
        sma200: sma(closes, 200),
    }
}
