//! Recommendation — the engine's only output artifact.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        };
        f.write_str(s)
    }
}

/// Which rule produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    TechnicalBuy,
    /// SELL signal while no entry price is known.
    TechnicalExit,
    FullTakeProfit,
    TakeProfit,
    MinimalProfit,
    StopLoss,
    StrongSellSignal,
    NoAction,
    DataUnavailable,
}

impl Trigger {
    pub fn describe(&self) -> &'static str {
        match self {
            Trigger::TechnicalBuy => "technical buy signal",
            Trigger::TechnicalExit => "technical sell signal, no entry price on record",
            Trigger::FullTakeProfit => "full take-profit",
            Trigger::TakeProfit => "take-profit",
            Trigger::MinimalProfit => "minimal profit-taking",
            Trigger::StopLoss => "stop-loss",
            Trigger::StrongSellSignal => "strong sell signal",
            Trigger::NoAction => "no actionable condition",
            Trigger::DataUnavailable => "market data unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub quantity_base: f64,
    pub quantity_quote: f64,
    pub confidence: f64,
    pub reason: String,
    pub profit_percent: Option<f64>,
    pub trigger: Trigger,
}

impl Recommendation {
    pub fn hold(reason: impl Into<String>, confidence: f64, trigger: Trigger) -> Self {
        Self {
            action: Action::Hold,
            quantity_base: 0.0,
            quantity_quote: 0.0,
            confidence,
            reason: reason.into(),
            profit_percent: None,
            trigger,
        }
    }

    /// HOLD carrying an explanation of why market data could not be used.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::hold(reason, 0.0, Trigger::DataUnavailable)
    }

    pub fn is_actionable(&self) -> bool {
        self.action != Action::Hold && self.quantity_base > 0.0
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (confidence {:.2})", self.action, self.confidence)?;
        if self.action != Action::Hold {
            write!(
                f,
                " qty {:.6} (~{:.2} quote)",
                self.quantity_base, self.quantity_quote
            )?;
        }
        if let Some(p) = self.profit_percent {
            write!(f, " profit {p:+.2}%")?;
        }
        write!(f, ": {}", self.reason)
    }
}
