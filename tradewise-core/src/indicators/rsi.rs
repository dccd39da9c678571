//! Relative Strength Index (RSI).
//!
//! Simple (non-exponential) averages of gains and losses over the last
//! `period` close-to-close deltas.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: fewer than period + 1 closes → 50; avg_loss == 0 → 100.

/// Value returned when there is not enough history.
pub const NEUTRAL_RSI: f64 = 50.0;

pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let window = &closes[closes.len() - period - 1..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn insufficient_data_is_neutral() {
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&closes, 14), 50.0);
        assert_eq!(rsi(&[], 14), 50.0);
    }

    #[test]
    fn all_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_approx(rsi(&closes, 14), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn all_losses_is_0() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert_approx(rsi(&closes, 14), 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn flat_series_is_100() {
        // no losses at all, so the division guard applies
        assert_eq!(rsi(&[100.0; 20], 14), 100.0);
    }

    #[test]
    fn equal_gains_and_losses_is_50() {
        // alternating +1 / -1 over an even period
        let closes: Vec<f64> = (0..15)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        assert_approx(rsi(&closes, 14), 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn only_last_period_deltas_count() {
        // a crash early in the series is outside the 3-delta window
        let closes = [200.0, 100.0, 101.0, 102.0, 103.0];
        assert_approx(rsi(&closes, 3), 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn hand_computed_value() {
        // deltas: +2, -1, +1 → avg_gain 1.0, avg_loss 1/3, rs 3, rsi 75
        let closes = [10.0, 12.0, 11.0, 12.0];
        assert_approx(rsi(&closes, 3), 75.0, DEFAULT_EPSILON);
    }
}
