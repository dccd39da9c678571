//! Decision engine — one call from market data to a `Recommendation`.
//!
//! Pipeline per evaluation:
//! 1. Evaluate each timeframe (`SignalEvaluator`)
//! 2. Fuse the analyses (`TimeframeFusion`)
//! 3. Run the exit chain (`RiskManager::should_sell`); only if nothing
//!    applies, consider a buy (`RiskManager::should_buy`)
//! 4. Assemble the recommendation and its reason
//!
//! The engine is synchronous and holds no mutable state. The position is
//! passed in by the caller on every call. Missing data never surfaces as an
//! error: it becomes a HOLD whose reason explains the gap.

pub mod report;
pub mod snapshot;

pub use report::{PortfolioStatus, StrategySummary};
pub use snapshot::{fetch_snapshot, MarketSnapshot};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{ConfigError, EngineConfig};
use crate::data::MarketDataSource;
use crate::domain::{AccountBalance, Action, Position, PriceSeries, Recommendation, Trigger};
use crate::risk::{BuyDecision, RiskManager, SellDecision};
use crate::signals::{CombinedSignal, SignalEvaluator, TimeframeAnalysis, TimeframeFusion};

/// Recommendation plus everything that led to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub recommendation: Recommendation,
    pub analyses: Vec<TimeframeAnalysis>,
    pub combined: CombinedSignal,
    pub current_price: Option<f64>,
    pub balance: Option<AccountBalance>,
}

impl Decision {
    /// HOLD explaining why the market could not be evaluated.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(%reason, "holding: market data unavailable");
        Self {
            recommendation: Recommendation::unavailable(reason),
            analyses: Vec::new(),
            combined: CombinedSignal::hold(),
            current_price: None,
            balance: None,
        }
    }

    fn with_market(mut self, current_price: Option<f64>, balance: AccountBalance) -> Self {
        self.current_price = current_price;
        self.balance = Some(balance);
        self
    }
}

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: EngineConfig,
    evaluator: SignalEvaluator,
    fusion: TimeframeFusion,
    risk: RiskManager,
}

impl DecisionEngine {
    /// Validate the configuration and build the pipeline.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            evaluator: SignalEvaluator::new(config.signal.clone()),
            fusion: TimeframeFusion::new(config.fusion.clone()),
            risk: RiskManager::new(config.risk.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn risk(&self) -> &RiskManager {
        &self.risk
    }

    /// Evaluate `series` (shortest interval first) against the current state.
    pub fn evaluate(
        &self,
        series: &[PriceSeries],
        current_price: Option<f64>,
        balance: &AccountBalance,
        position: &Position,
    ) -> Recommendation {
        self.evaluate_detailed(series, current_price, balance, position)
            .recommendation
    }

    pub fn evaluate_detailed(
        &self,
        series: &[PriceSeries],
        current_price: Option<f64>,
        balance: &AccountBalance,
        position: &Position,
    ) -> Decision {
        let price = match current_price {
            Some(p) if p.is_finite() && p > 0.0 => p,
            Some(p) => {
                return Decision::unavailable(format!("current price {p} is not usable"))
                    .with_market(current_price, *balance)
            }
            None => {
                return Decision::unavailable("current price unavailable")
                    .with_market(None, *balance)
            }
        };

        let Some(primary) = series.first() else {
            return Decision::unavailable("no price history supplied").with_market(Some(price), *balance);
        };
        if primary.is_empty() {
            return Decision::unavailable(format!(
                "no {} klines for {}",
                primary.interval(),
                primary.symbol()
            ))
            .with_market(Some(price), *balance);
        }

        let analyses: Vec<TimeframeAnalysis> = series
            .iter()
            .map(|s| self.evaluator.evaluate(s, price))
            .collect();
        let combined = self.fusion.combine(&analyses);

        let recommendation = self.decide(&analyses, &combined, price, balance, position);
        info!(
            symbol = primary.symbol(),
            action = %recommendation.action,
            confidence = recommendation.confidence,
            quantity = recommendation.quantity_base,
            trigger = ?recommendation.trigger,
            "evaluation complete"
        );

        Decision {
            recommendation,
            analyses,
            combined,
            current_price: Some(price),
            balance: Some(*balance),
        }
    }

    /// Fetch everything the configured market needs from `source`, then
    /// evaluate. Fetch failures become a HOLD.
    pub fn evaluate_from_source(&self, source: &dyn MarketDataSource, position: &Position) -> Decision {
        match fetch_snapshot(source, &self.config.market) {
            Ok(snapshot) => self.evaluate_snapshot(&snapshot, position),
            Err(e) => Decision::unavailable(e.to_string()),
        }
    }

    pub fn evaluate_snapshot(&self, snapshot: &MarketSnapshot, position: &Position) -> Decision {
        self.evaluate_detailed(
            &snapshot.series,
            Some(snapshot.current_price),
            &snapshot.balance,
            position,
        )
    }

    fn decide(
        &self,
        analyses: &[TimeframeAnalysis],
        combined: &CombinedSignal,
        price: f64,
        balance: &AccountBalance,
        position: &Position,
    ) -> Recommendation {
        let context = signal_context(analyses, combined);

        if let Some(sell) =
            self.risk
                .should_sell(combined, balance, price, position.entry_price)
        {
            sell_recommendation(&sell, &context)
        } else if let Some(buy) = self.risk.should_buy(combined, balance, price) {
            buy_recommendation(&buy, &context, position.profit_percent(price))
        } else {
            let mut hold = Recommendation::hold(
                format!("no actionable condition; {context}"),
                combined.confidence,
                Trigger::NoAction,
            );
            hold.profit_percent = position.profit_percent(price);
            hold
        }
    }
}

fn signal_context(analyses: &[TimeframeAnalysis], combined: &CombinedSignal) -> String {
    let frames: Vec<String> = analyses.iter().map(TimeframeAnalysis::summary).collect();
    let agreement = if combined.timeframe_agreement {
        ", timeframes agree"
    } else {
        ""
    };
    format!(
        "combined {}@{:.2} [{}{}]",
        combined.signal,
        combined.confidence,
        frames.join(", "),
        agreement
    )
}

fn sell_recommendation(sell: &SellDecision, context: &str) -> Recommendation {
    let trigger = sell.rule.trigger();
    let profit = sell
        .profit_percent
        .map(|p| format!(" at {p:+.2}%"))
        .unwrap_or_default();
    Recommendation {
        action: Action::Sell,
        quantity_base: sell.quantity_base,
        quantity_quote: sell.quantity_quote,
        confidence: sell.confidence,
        reason: format!(
            "{}{}: selling {:.0}% of holdings; {}",
            trigger.describe(),
            profit,
            sell.fraction() * 100.0,
            context
        ),
        profit_percent: sell.profit_percent,
        trigger,
    }
}

fn buy_recommendation(buy: &BuyDecision, context: &str, profit_percent: Option<f64>) -> Recommendation {
    Recommendation {
        action: Action::Buy,
        quantity_base: buy.quantity_base,
        quantity_quote: buy.quantity_quote,
        confidence: buy.confidence,
        reason: format!(
            "{}: buying {:.8} for {:.2} quote; {}",
            Trigger::TechnicalBuy.describe(),
            buy.quantity_base,
            buy.quantity_quote,
            context
        ),
        profit_percent,
        trigger: Trigger::TechnicalBuy,
    }
}
