//! Trading session — one engine, one tracker, one asset.
//!
//! A cycle fetches a market snapshot, reconciles the tracker with the fresh
//! balance, evaluates, and in auto-execute mode sends actionable
//! recommendations to the executor. Confirmed fills go back into the tracker.
//! Cycles for one session must not overlap; `run_cycle` takes `&mut self`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use tradewise_core::config::{ConfigError, EngineConfig};
use tradewise_core::data::{MarketDataError, MarketDataSource};
use tradewise_core::engine::{fetch_snapshot, Decision, PortfolioStatus};
use tradewise_core::execution::OrderExecutor;
use tradewise_core::position::{PositionError, PositionTracker};
use tradewise_core::{DecisionEngine, Position, Recommendation};

use crate::report::{ActionTaken, CycleReport};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("position error: {0}")]
    Position(#[from] PositionError),
    #[error("market data error: {0}")]
    Market(#[from] MarketDataError),
    #[error("paper trading needs a simulated market, configured source is '{0}'")]
    NotSimulated(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionMode {
    /// Evaluate and report, never trade.
    AnalysisOnly,
    /// Execute recommendations that clear the action threshold.
    AutoExecute,
}

#[derive(Debug, Clone)]
pub struct TradingSession {
    engine: DecisionEngine,
    tracker: PositionTracker,
    mode: SessionMode,
    cycles: u64,
}

impl TradingSession {
    pub fn new(config: EngineConfig, mode: SessionMode) -> Result<Self, SessionError> {
        Ok(Self {
            engine: DecisionEngine::new(config)?,
            tracker: PositionTracker::new(),
            mode,
            cycles: 0,
        })
    }

    /// Resume with a previously recorded position.
    pub fn with_position(mut self, position: Position) -> Self {
        self.tracker = PositionTracker::from_position(position);
        self
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn position(&self) -> Position {
        self.tracker.position()
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn run_cycle(
        &mut self,
        source: &dyn MarketDataSource,
        executor: Option<&dyn OrderExecutor>,
    ) -> Result<CycleReport, SessionError> {
        self.cycles += 1;
        let symbol = self.engine.config().market.symbol.clone();

        let decision = match fetch_snapshot(source, &self.engine.config().market) {
            Ok(snapshot) => {
                self.tracker.reconcile(&snapshot.balance);
                self.engine
                    .evaluate_snapshot(&snapshot, &self.tracker.position())
            }
            Err(e) => Decision::unavailable(e.to_string()),
        };

        let portfolio = match (decision.current_price, decision.balance) {
            (Some(price), Some(balance)) => Some(PortfolioStatus::new(
                symbol.clone(),
                balance,
                price,
                &self.tracker.position(),
            )),
            _ => None,
        };

        let action_taken = self.act(&decision.recommendation, executor)?;
        info!(
            cycle = self.cycles,
            mode = ?self.mode,
            action = %decision.recommendation.action,
            taken = %action_taken,
            "cycle complete"
        );

        Ok(CycleReport {
            cycle: self.cycles,
            timestamp: Utc::now(),
            symbol,
            portfolio,
            analyses: decision.analyses,
            combined: decision.combined,
            recommendation: decision.recommendation,
            action_taken,
        })
    }

    fn act(
        &mut self,
        recommendation: &Recommendation,
        executor: Option<&dyn OrderExecutor>,
    ) -> Result<ActionTaken, SessionError> {
        if self.mode == SessionMode::AnalysisOnly {
            return Ok(ActionTaken::AnalysisOnly);
        }
        let threshold = self.engine.config().risk.action_threshold;
        if !recommendation.is_actionable() || recommendation.confidence < threshold {
            return Ok(ActionTaken::NothingToDo);
        }
        let Some(executor) = executor else {
            warn!("auto-execute requested but the market source cannot execute orders");
            return Ok(ActionTaken::NoExecutor);
        };

        match executor.execute(recommendation.action, recommendation.quantity_base) {
            Ok(fill) => {
                self.tracker.record_fill(&fill)?;
                Ok(ActionTaken::Executed(fill))
            }
            Err(e) => {
                warn!(executor = executor.name(), error = %e, "order failed");
                Ok(ActionTaken::Failed(e.to_string()))
            }
        }
    }
}
