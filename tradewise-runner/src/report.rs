//! Cycle report — what the session saw, decided and did.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradewise_core::engine::PortfolioStatus;
use tradewise_core::execution::FillConfirmation;
use tradewise_core::signals::{CombinedSignal, TimeframeAnalysis};
use tradewise_core::Recommendation;

/// What the session did with the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionTaken {
    AnalysisOnly,
    /// HOLD, zero quantity, or below the action threshold.
    NothingToDo,
    NoExecutor,
    Executed(FillConfirmation),
    Failed(String),
}

impl fmt::Display for ActionTaken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionTaken::AnalysisOnly => f.write_str("none (analysis only)"),
            ActionTaken::NothingToDo => f.write_str("none"),
            ActionTaken::NoExecutor => f.write_str("none (source cannot execute orders)"),
            ActionTaken::Executed(fill) => write!(
                f,
                "{} {:.8} @ {:.2} ({:?})",
                fill.action, fill.quantity, fill.price, fill.status
            ),
            ActionTaken::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub portfolio: Option<PortfolioStatus>,
    pub analyses: Vec<TimeframeAnalysis>,
    pub combined: CombinedSignal,
    pub recommendation: Recommendation,
    pub action_taken: ActionTaken,
}

impl CycleReport {
    pub fn executed(&self) -> Option<&FillConfirmation> {
        match &self.action_taken {
            ActionTaken::Executed(fill) => Some(fill),
            _ => None,
        }
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== {} cycle {} @ {} ===",
            self.symbol,
            self.cycle,
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        match &self.portfolio {
            Some(p) => writeln!(f, "{p}")?,
            None => writeln!(f, "Portfolio unavailable")?,
        }
        writeln!(f, "Market")?;
        for a in &self.analyses {
            writeln!(
                f,
                "  {:<4} rsi {:>5.1}  {:+6.2}% vs sma20  {:+6.2}% vs sma50  {}@{:.2}",
                a.interval.as_str(),
                a.indicators.rsi,
                a.price_vs_sma20,
                a.price_vs_sma50,
                a.signal,
                a.confidence
            )?;
        }
        writeln!(
            f,
            "  combined {}@{:.2}{}",
            self.combined.signal,
            self.combined.confidence,
            if self.combined.timeframe_agreement {
                " (timeframes agree)"
            } else {
                ""
            }
        )?;
        writeln!(f, "Recommendation: {}", self.recommendation)?;
        write!(f, "Action taken:   {}", self.action_taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradewise_core::domain::{AccountBalance, Action, Position, Trigger};
    use tradewise_core::execution::FillStatus;

    fn report(action_taken: ActionTaken) -> CycleReport {
        CycleReport {
            cycle: 3,
            timestamp: Utc::now(),
            symbol: "BTCUSDT".into(),
            portfolio: Some(PortfolioStatus::new(
                "BTCUSDT",
                AccountBalance::new(0.001, 1000.0),
                45_000.0,
                &Position::flat(),
            )),
            analyses: Vec::new(),
            combined: CombinedSignal::hold(),
            recommendation: Recommendation::hold("quiet", 0.5, Trigger::NoAction),
            action_taken,
        }
    }

    #[test]
    fn text_report_has_every_section() {
        let text = report(ActionTaken::AnalysisOnly).to_string();
        assert!(text.contains("BTCUSDT cycle 3"));
        assert!(text.contains("total value: 1045.00"));
        assert!(text.contains("Recommendation: HOLD"));
        assert!(text.contains("analysis only"));
    }

    #[test]
    fn executed_fill_is_exposed() {
        let fill = FillConfirmation {
            action: Action::Buy,
            price: 45_000.0,
            quantity: 0.002,
            status: FillStatus::Filled,
        };
        let r = report(ActionTaken::Executed(fill));
        assert_eq!(r.executed(), Some(&fill));
        assert!(r.to_string().contains("BUY 0.00200000 @ 45000.00"));
    }

    #[test]
    fn report_serializes_to_json() {
        let json = serde_json::to_value(report(ActionTaken::Failed("boom".into()))).unwrap();
        assert_eq!(json["action_taken"]["type"], "FAILED");
        assert_eq!(json["recommendation"]["action"], "HOLD");
    }
}
