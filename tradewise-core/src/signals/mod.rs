//! Signals — per-timeframe technical analysis and multi-timeframe fusion.
//!
//! Signals are portfolio-agnostic: they see price history and the current
//! price, never balances or entry prices. Position-aware decisions belong to
//! the risk manager.

pub mod evaluator;
pub mod fusion;

pub use evaluator::{SignalEvaluator, TieBreakPolicy};
pub use fusion::{CombinedSignal, TimeframeFusion};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::Interval;
use crate::indicators::Indicators;

/// Directional signal. `Hold` is the neutral default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
    /// Reduce rather than close. Treated as a sell for agreement purposes.
    SellPartial,
}

impl Signal {
    pub fn is_buy(&self) -> bool {
        matches!(self, Signal::Buy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, Signal::Sell | Signal::SellPartial)
    }

    /// True when both signals point the same way.
    pub fn agrees_with(&self, other: &Signal) -> bool {
        match (self, other) {
            (Signal::Hold, Signal::Hold) => true,
            (Signal::Buy, Signal::Buy) => true,
            (a, b) => a.is_sell() && b.is_sell(),
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
            Signal::SellPartial => "SELL_PARTIAL",
        };
        f.write_str(s)
    }
}

/// Result of evaluating one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub interval: Interval,
    pub signal: Signal,
    pub confidence: f64,
    pub indicators: Indicators,
    pub price_vs_sma20: f64,
    pub price_vs_sma50: f64,
    /// Buy conditions met, out of four.
    pub buy_score: u8,
    /// Sell conditions met, out of four.
    pub sell_score: u8,
}

impl TimeframeAnalysis {
    /// HOLD with zero confidence, used when the timeframe has no klines.
    pub fn no_data(interval: Interval) -> Self {
        Self {
            interval,
            signal: Signal::Hold,
            confidence: 0.0,
            indicators: Indicators::neutral(),
            price_vs_sma20: 0.0,
            price_vs_sma50: 0.0,
            buy_score: 0,
            sell_score: 0,
        }
    }

    /// Compact one-line form, e.g. `1h BUY@0.80 (rsi 24.1)`.
    pub fn summary(&self) -> String {
        format!(
            "{} {}@{:.2} (rsi {:.1})",
            self.interval, self.signal, self.confidence, self.indicators.rsi
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sell_partial_agrees_with_sell() {
        assert!(Signal::SellPartial.agrees_with(&Signal::Sell));
        assert!(Signal::Sell.agrees_with(&Signal::SellPartial));
        assert!(!Signal::Buy.agrees_with(&Signal::Sell));
        assert!(!Signal::Hold.agrees_with(&Signal::Buy));
    }

    #[test]
    fn default_is_hold() {
        assert_eq!(Signal::default(), Signal::Hold);
    }

    #[test]
    fn summary_is_compact() {
        let a = TimeframeAnalysis::no_data(Interval::FourHours);
        assert_eq!(a.summary(), "4h HOLD@0.00 (rsi 50.0)");
    }
}
