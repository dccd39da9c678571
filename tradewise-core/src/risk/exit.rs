//! Exit chain — first matching rule wins.
//!
//! With no entry price on record only a technical SELL can trigger a (half)
//! exit. With an entry price the order is: full take-profit, take-profit,
//! minimal profit, stop-loss, strong sell signal. Stop-loss ignores the
//! technical signal entirely.

use serde::{Deserialize, Serialize};

use crate::config::RiskConfig;
use crate::domain::Trigger;
use crate::signals::CombinedSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitRule {
    /// SELL signal while the entry price is unknown.
    TechnicalExit,
    FullTakeProfit,
    TakeProfit,
    MinimalProfit,
    StopLoss,
    StrongSellSignal,
}

impl ExitRule {
    /// Fraction of the held base balance to sell.
    pub fn fraction(&self) -> f64 {
        match self {
            ExitRule::FullTakeProfit | ExitRule::StopLoss => 1.0,
            ExitRule::TakeProfit | ExitRule::TechnicalExit | ExitRule::StrongSellSignal => 0.5,
            ExitRule::MinimalProfit => 0.25,
        }
    }

    /// Price-based rules do not depend on the signal.
    pub fn is_price_rule(&self) -> bool {
        !matches!(self, ExitRule::TechnicalExit | ExitRule::StrongSellSignal)
    }

    /// Price rules are certain; technical rules inherit the signal's confidence.
    pub fn confidence(&self, signal: &CombinedSignal) -> f64 {
        if self.is_price_rule() {
            1.0
        } else {
            signal.confidence
        }
    }

    pub fn trigger(&self) -> Trigger {
        match self {
            ExitRule::TechnicalExit => Trigger::TechnicalExit,
            ExitRule::FullTakeProfit => Trigger::FullTakeProfit,
            ExitRule::TakeProfit => Trigger::TakeProfit,
            ExitRule::MinimalProfit => Trigger::MinimalProfit,
            ExitRule::StopLoss => Trigger::StopLoss,
            ExitRule::StrongSellSignal => Trigger::StrongSellSignal,
        }
    }
}

/// A sized sell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SellDecision {
    pub rule: ExitRule,
    pub quantity_base: f64,
    pub quantity_quote: f64,
    pub profit_percent: Option<f64>,
    pub confidence: f64,
}

impl SellDecision {
    pub fn fraction(&self) -> f64 {
        self.rule.fraction()
    }
}

pub(crate) fn first_matching_rule(
    config: &RiskConfig,
    signal: &CombinedSignal,
    profit_percent: Option<f64>,
) -> Option<ExitRule> {
    let technical_sell = signal.signal.is_sell() && signal.confidence >= config.action_threshold;

    let Some(profit) = profit_percent else {
        return technical_sell.then_some(ExitRule::TechnicalExit);
    };

    if profit >= config.full_take_profit_percent {
        Some(ExitRule::FullTakeProfit)
    } else if profit >= config.take_profit_percent {
        Some(ExitRule::TakeProfit)
    } else if profit >= config.min_profit_to_sell {
        Some(ExitRule::MinimalProfit)
    } else if profit <= -config.stop_loss_percent {
        Some(ExitRule::StopLoss)
    } else if technical_sell && signal.confidence > config.strong_sell_confidence {
        Some(ExitRule::StrongSellSignal)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Signal;

    fn rule(signal: Signal, confidence: f64, profit: Option<f64>) -> Option<ExitRule> {
        first_matching_rule(
            &RiskConfig::default(),
            &CombinedSignal::new(signal, confidence),
            profit,
        )
    }

    #[test]
    fn no_entry_needs_sell_signal() {
        assert_eq!(rule(Signal::Sell, 0.8, None), Some(ExitRule::TechnicalExit));
        assert_eq!(rule(Signal::Hold, 0.5, None), None);
        assert_eq!(rule(Signal::Buy, 0.9, None), None);
    }

    #[test]
    fn profit_tiers_in_order() {
        assert_eq!(rule(Signal::Hold, 0.5, Some(11.0)), Some(ExitRule::FullTakeProfit));
        assert_eq!(rule(Signal::Hold, 0.5, Some(10.0)), Some(ExitRule::FullTakeProfit));
        assert_eq!(rule(Signal::Hold, 0.5, Some(6.0)), Some(ExitRule::TakeProfit));
        assert_eq!(rule(Signal::Hold, 0.5, Some(3.5)), Some(ExitRule::MinimalProfit));
        assert_eq!(rule(Signal::Hold, 0.5, Some(2.9)), None);
    }

    #[test]
    fn stop_loss_ignores_signal() {
        for signal in [Signal::Buy, Signal::Sell, Signal::Hold, Signal::SellPartial] {
            assert_eq!(rule(signal, 0.9, Some(-3.0)), Some(ExitRule::StopLoss));
        }
        assert_eq!(rule(Signal::Buy, 0.9, Some(-2.0)), Some(ExitRule::StopLoss));
    }

    #[test]
    fn strong_sell_needs_more_than_point_seven() {
        assert_eq!(rule(Signal::Sell, 0.8, Some(0.5)), Some(ExitRule::StrongSellSignal));
        assert_eq!(rule(Signal::Sell, 0.7, Some(0.5)), None);
    }

    #[test]
    fn fractions() {
        assert_eq!(ExitRule::FullTakeProfit.fraction(), 1.0);
        assert_eq!(ExitRule::StopLoss.fraction(), 1.0);
        assert_eq!(ExitRule::TakeProfit.fraction(), 0.5);
        assert_eq!(ExitRule::MinimalProfit.fraction(), 0.25);
        assert_eq!(ExitRule::TechnicalExit.fraction(), 0.5);
    }

    #[test]
    fn price_rules_are_certain() {
        let signal = CombinedSignal::new(Signal::Sell, 0.8);
        assert_eq!(ExitRule::StopLoss.confidence(&signal), 1.0);
        assert_eq!(ExitRule::StrongSellSignal.confidence(&signal), 0.8);
    }
}
