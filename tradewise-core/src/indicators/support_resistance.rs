//! Support/resistance bands from recent extremes.
//!
//! support = mean of the 3 lowest lows, resistance = mean of the 3 highest
//! highs. The window is whatever slice the caller passes.

use serde::{Deserialize, Serialize};

use crate::domain::Kline;

const EXTREMES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

pub fn support_resistance(klines: &[Kline]) -> SupportResistance {
    if klines.is_empty() {
        return SupportResistance::default();
    }

    let mut lows: Vec<f64> = klines.iter().map(|k| k.low).collect();
    let mut highs: Vec<f64> = klines.iter().map(|k| k.high).collect();
    lows.sort_by(f64::total_cmp);
    highs.sort_by(|a, b| b.total_cmp(a));

    let n = EXTREMES.min(klines.len());
    SupportResistance {
        support: lows[..n].iter().sum::<f64>() / n as f64,
        resistance: highs[..n].iter().sum::<f64>() / n as f64,
    }
}
