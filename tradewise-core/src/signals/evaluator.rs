//! Single-timeframe signal evaluation.
//!
//! Four buy conditions and four sell conditions are scored independently.
//! A side needs `min_score` hits (default 3) to fire, with confidence
//! `min(0.9, 0.5 + 0.1 × score)`. When both sides fire, the configured
//! `TieBreakPolicy` decides.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SignalConfig;
use crate::domain::{Interval, Kline, PriceSeries};
use crate::indicators::Indicators;

use super::{Signal, TimeframeAnalysis};

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_CONDITION: f64 = 0.1;
const MAX_SIGNAL_CONFIDENCE: f64 = 0.9;

/// Resolution when buy and sell scores both reach the threshold.
///
/// The buy and sell condition sets are not complementary (price near support
/// and below resistance can both hold), so the overlap needs an explicit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TieBreakPolicy {
    #[default]
    BuyFirst,
    SellFirst,
    /// Conflicting evidence yields no signal.
    Hold,
}

#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    config: SignalConfig,
}

impl SignalEvaluator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn evaluate(&self, series: &PriceSeries, current_price: f64) -> TimeframeAnalysis {
        self.evaluate_klines(series.interval(), series.klines(), current_price)
    }

    pub fn evaluate_klines(
        &self,
        interval: Interval,
        klines: &[Kline],
        current_price: f64,
    ) -> TimeframeAnalysis {
        if klines.is_empty() {
            return TimeframeAnalysis::no_data(interval);
        }

        let indicators = Indicators::compute(klines, self.config.rsi_period);
        let price_vs_sma20 = percent_from(current_price, indicators.sma20);
        let price_vs_sma50 = percent_from(current_price, indicators.sma50);

        let c = &self.config;
        let buy_conditions = [
            indicators.rsi < c.rsi_oversold,
            current_price < indicators.sma20,
            current_price > indicators.support * (1.0 - c.support_band),
            price_vs_sma50 < -c.trend_threshold_pct,
        ];
        let sell_conditions = [
            indicators.rsi > c.rsi_overbought,
            current_price > indicators.sma20,
            current_price < indicators.resistance * (1.0 + c.resistance_band),
            price_vs_sma50 > c.trend_threshold_pct,
        ];
        let buy_score = buy_conditions.iter().filter(|&&hit| hit).count() as u8;
        let sell_score = sell_conditions.iter().filter(|&&hit| hit).count() as u8;

        let (signal, confidence) = self.decide(buy_score, sell_score);
        debug!(
            %interval,
            rsi = indicators.rsi,
            buy_score,
            sell_score,
            %signal,
            confidence,
            "timeframe evaluated"
        );

        TimeframeAnalysis {
            interval,
            signal,
            confidence,
            indicators,
            price_vs_sma20,
            price_vs_sma50,
            buy_score,
            sell_score,
        }
    }

    fn decide(&self, buy_score: u8, sell_score: u8) -> (Signal, f64) {
        let buy = buy_score >= self.config.min_score;
        let sell = sell_score >= self.config.min_score;
        match (buy, sell) {
            (true, false) => (Signal::Buy, score_confidence(buy_score)),
            (false, true) => (Signal::Sell, score_confidence(sell_score)),
            (true, true) => match self.config.tie_break {
                TieBreakPolicy::BuyFirst => (Signal::Buy, score_confidence(buy_score)),
                TieBreakPolicy::SellFirst => (Signal::Sell, score_confidence(sell_score)),
                TieBreakPolicy::Hold => (Signal::Hold, BASE_CONFIDENCE),
            },
            (false, false) => (Signal::Hold, BASE_CONFIDENCE),
        }
    }
}

impl Default for SignalEvaluator {
    fn default() -> Self {
        Self::new(SignalConfig::default())
    }
}

fn score_confidence(score: u8) -> f64 {
    (BASE_CONFIDENCE + CONFIDENCE_PER_CONDITION * score as f64).min(MAX_SIGNAL_CONFIDENCE)
}

/// Percent distance of `price` from `reference`; 0 when there is no reference.
fn percent_from(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (price - reference) / reference * 100.0
}
