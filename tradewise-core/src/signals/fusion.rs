//! Multi-timeframe fusion.
//!
//! When every timeframe points the same way and the mean confidence clears
//! `agreement_threshold`, the consensus gets `agreement_bonus` (capped at
//! `max_confidence`). Otherwise the most confident timeframe is taken as-is;
//! on equal confidence the later entry (the longer interval, by convention)
//! wins.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FusionConfig;
use crate::domain::Interval;

use super::{Signal, TimeframeAnalysis};

/// Consensus over one or more timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedSignal {
    pub signal: Signal,
    pub confidence: f64,
    pub timeframe_agreement: bool,
    /// Timeframe whose analysis was taken when there was no agreement.
    pub source: Option<Interval>,
}

impl CombinedSignal {
    pub fn hold() -> Self {
        Self {
            signal: Signal::Hold,
            confidence: 0.0,
            timeframe_agreement: false,
            source: None,
        }
    }

    pub fn new(signal: Signal, confidence: f64) -> Self {
        Self {
            signal,
            confidence,
            timeframe_agreement: false,
            source: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimeframeFusion {
    config: FusionConfig,
}

impl TimeframeFusion {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Fuse analyses ordered shortest interval first.
    ///
    /// The agreement bonus needs at least two timeframes; a single analysis
    /// passes through unchanged.
    pub fn combine(&self, analyses: &[TimeframeAnalysis]) -> CombinedSignal {
        let Some(first) = analyses.first() else {
            return CombinedSignal::hold();
        };

        if analyses.len() >= 2 && analyses.iter().all(|a| a.signal.agrees_with(&first.signal)) {
            let mean =
                analyses.iter().map(|a| a.confidence).sum::<f64>() / analyses.len() as f64;
            if mean > self.config.agreement_threshold {
                let confidence = (mean + self.config.agreement_bonus).min(self.config.max_confidence);
                debug!(signal = %first.signal, mean, confidence, "timeframes agree");
                return CombinedSignal {
                    signal: first.signal,
                    confidence,
                    timeframe_agreement: true,
                    source: None,
                };
            }
        }

        let best = analyses
            .iter()
            .fold(first, |best, a| if a.confidence >= best.confidence { a } else { best });
        debug!(
            signal = %best.signal,
            confidence = best.confidence,
            interval = %best.interval,
            "no agreement, taking most confident timeframe"
        );
        CombinedSignal {
            signal: best.signal,
            confidence: best.confidence,
            timeframe_agreement: false,
            source: Some(best.interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, Indicators};

    fn analysis(interval: Interval, signal: Signal, confidence: f64) -> TimeframeAnalysis {
        TimeframeAnalysis {
            interval,
            signal,
            confidence,
            indicators: Indicators::neutral(),
            price_vs_sma20: 0.0,
            price_vs_sma50: 0.0,
            buy_score: 0,
            sell_score: 0,
        }
    }

    fn fusion() -> TimeframeFusion {
        TimeframeFusion::default()
    }

    #[test]
    fn agreement_boosts_confidence() {
        let combined = fusion().combine(&[
            analysis(Interval::OneHour, Signal::Buy, 0.75),
            analysis(Interval::FourHours, Signal::Buy, 0.75),
        ]);
        assert_eq!(combined.signal, Signal::Buy);
        assert_approx(combined.confidence, 0.85, 1e-12);
        assert!(combined.timeframe_agreement);
    }

    #[test]
    fn boost_is_capped() {
        let combined = fusion().combine(&[
            analysis(Interval::OneHour, Signal::Sell, 0.9),
            analysis(Interval::FourHours, Signal::Sell, 0.9),
        ]);
        assert_approx(combined.confidence, 0.95, 1e-12);
        assert!(combined.timeframe_agreement);
    }

    #[test]
    fn disagreement_takes_higher_confidence() {
        let combined = fusion().combine(&[
            analysis(Interval::OneHour, Signal::Buy, 0.8),
            analysis(Interval::FourHours, Signal::Sell, 0.6),
        ]);
        assert_eq!(combined.signal, Signal::Buy);
        assert_approx(combined.confidence, 0.8, 1e-12);
        assert!(!combined.timeframe_agreement);
        assert_eq!(combined.source, Some(Interval::OneHour));
    }

    #[test]
    fn weak_agreement_falls_back_without_bonus() {
        let combined = fusion().combine(&[
            analysis(Interval::OneHour, Signal::Hold, 0.5),
            analysis(Interval::FourHours, Signal::Hold, 0.5),
        ]);
        assert_eq!(combined.signal, Signal::Hold);
        assert_eq!(combined.confidence, 0.5);
        assert!(!combined.timeframe_agreement);
    }

    #[test]
    fn mean_exactly_at_threshold_gets_no_bonus() {
        let combined = fusion().combine(&[
            analysis(Interval::OneHour, Signal::Buy, 0.7),
            analysis(Interval::FourHours, Signal::Buy, 0.7),
        ]);
        assert!(!combined.timeframe_agreement);
        assert_approx(combined.confidence, 0.7, 1e-12);
    }

    #[test]
    fn equal_confidence_prefers_longer_timeframe() {
        let combined = fusion().combine(&[
            analysis(Interval::OneHour, Signal::Buy, 0.8),
            analysis(Interval::FourHours, Signal::Sell, 0.8),
        ]);
        assert_eq!(combined.signal, Signal::Sell);
        assert_eq!(combined.source, Some(Interval::FourHours));
    }

    #[test]
    fn sell_partial_counts_as_sell_agreement() {
        let combined = fusion().combine(&[
            analysis(Interval::OneHour, Signal::Sell, 0.8),
            analysis(Interval::FourHours, Signal::SellPartial, 0.8),
        ]);
        assert!(combined.timeframe_agreement);
        assert_eq!(combined.signal, Signal::Sell);
    }

    #[test]
    fn three_timeframes_need_unanimity() {
        let split = fusion().combine(&[
            analysis(Interval::FifteenMinutes, Signal::Buy, 0.9),
            analysis(Interval::OneHour, Signal::Buy, 0.9),
            analysis(Interval::FourHours, Signal::Hold, 0.5),
        ]);
        assert!(!split.timeframe_agreement);
        assert_eq!(split.signal, Signal::Buy);
        assert_eq!(split.source, Some(Interval::OneHour));

        let unanimous = fusion().combine(&[
            analysis(Interval::FifteenMinutes, Signal::Buy, 0.8),
            analysis(Interval::OneHour, Signal::Buy, 0.8),
            analysis(Interval::FourHours, Signal::Buy, 0.8),
        ]);
        assert!(unanimous.timeframe_agreement);
        assert_approx(unanimous.confidence, 0.9, 1e-12);
    }

    #[test]
    fn single_timeframe_passes_through() {
        let combined = fusion().combine(&[analysis(Interval::OneHour, Signal::Buy, 0.8)]);
        assert_eq!(combined.signal, Signal::Buy);
        assert_approx(combined.confidence, 0.8, 1e-12);
        assert!(!combined.timeframe_agreement);
    }

    #[test]
    fn no_timeframes_is_hold() {
        assert_eq!(fusion().combine(&[]), CombinedSignal::hold());
    }
}
