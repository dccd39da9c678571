//! Paper trading — an auto-execute session against the simulated market.
//!
//! Each tick runs one cycle and then advances the simulated clock. The run id
//! is a blake3 hash of the effective configuration, so two runs with the same
//! id produce the same trades.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use tradewise_core::config::{ConfigError, EngineConfig, MarketDataConfig, SimulatedConfig};
use tradewise_core::data::{
    MarketDataError, MarketDataSource, SimulatedMarketDataSource, MAX_TICK, WARMUP_STEPS,
};
use tradewise_core::domain::Trigger;
use tradewise_core::engine::PortfolioStatus;
use tradewise_core::Action;

use crate::session::{SessionError, SessionMode, TradingSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Number of cycles to run.
    pub ticks: u64,
    /// Simulated hours between cycles.
    pub step_hours: u64,
    /// Overrides the seed from `[data]`.
    pub seed: Option<u64>,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            ticks: 48,
            step_hours: 1,
            seed: None,
        }
    }
}

/// One executed paper order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub cycle: u64,
    pub action: Action,
    pub price: f64,
    pub quantity: f64,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRunSummary {
    pub run_id: String,
    pub ticks: u64,
    pub trades: Vec<TradeEvent>,
    pub start_value: f64,
    pub final_portfolio: PortfolioStatus,
    pub return_pct: f64,
}

impl PaperRunSummary {
    pub fn buys(&self) -> usize {
        self.trades.iter().filter(|t| t.action == Action::Buy).count()
    }

    pub fn sells(&self) -> usize {
        self.trades.iter().filter(|t| t.action == Action::Sell).count()
    }
}

impl fmt::Display for PaperRunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Paper run {}", &self.run_id[..self.run_id.len().min(16)])?;
        writeln!(
            f,
            "  ticks: {}  trades: {} ({} buys, {} sells)",
            self.ticks,
            self.trades.len(),
            self.buys(),
            self.sells()
        )?;
        for t in &self.trades {
            writeln!(
                f,
                "  #{:<5} {:<4} {:.8} @ {:.2}  {}",
                t.cycle,
                t.action,
                t.quantity,
                t.price,
                t.trigger.describe()
            )?;
        }
        writeln!(f, "{}", self.final_portfolio)?;
        write!(
            f,
            "  start value: {:.2}  return: {:+.2}%",
            self.start_value, self.return_pct
        )
    }
}

/// Deterministic id for a paper run.
///
/// Hashes the effective configuration, so a seed override equal to the
/// configured seed gives the same id as no override.
pub fn paper_run_id(config: &EngineConfig, paper: &PaperConfig) -> Result<String, SessionError> {
    let (config, _) = effective_config(config, paper)?;
    let paper = PaperConfig {
        seed: None,
        ..paper.clone()
    };
    let json = serde_json::to_string(&(&config, &paper))
        .map_err(|e| ConfigError::Serialize(e.to_string()))?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

/// The config with the seed override applied to its simulated market.
fn effective_config(
    config: &EngineConfig,
    paper: &PaperConfig,
) -> Result<(EngineConfig, SimulatedConfig), SessionError> {
    let MarketDataConfig::Simulated(sim_config) = &config.data else {
        return Err(SessionError::NotSimulated("FILE".to_string()));
    };
    let mut sim_config = sim_config.clone();
    if let Some(seed) = paper.seed {
        sim_config.seed = seed;
    }
    let mut config = config.clone();
    config.data = MarketDataConfig::Simulated(sim_config.clone());
    Ok((config, sim_config))
}

pub fn run_paper(config: &EngineConfig, paper: &PaperConfig) -> Result<PaperRunSummary, SessionError> {
    let (config, sim_config) = effective_config(config, paper)?;
    let steps = paper.ticks.saturating_mul(paper.step_hours);
    if steps > MAX_TICK - WARMUP_STEPS {
        return Err(MarketDataError::ClockExhausted {
            tick: WARMUP_STEPS,
            steps,
            horizon: MAX_TICK,
        }
        .into());
    }
    let run_id = paper_run_id(&config, paper)?;

    let symbol = config.market.symbol.clone();
    let sim = SimulatedMarketDataSource::new(symbol.clone(), sim_config);
    let start_value = sim.balance().value_at(sim.get_current_price(&symbol)?);
    info!(run_id = %run_id, ticks = paper.ticks, start_value, "paper run started");

    let mut session = TradingSession::new(config, SessionMode::AutoExecute)?;
    let mut trades = Vec::new();
    for _ in 0..paper.ticks {
        let report = session.run_cycle(&sim, Some(&sim))?;
        if let Some(fill) = report.executed() {
            trades.push(TradeEvent {
                cycle: report.cycle,
                action: fill.action,
                price: fill.price,
                quantity: fill.quantity,
                trigger: report.recommendation.trigger,
            });
        }
        sim.advance(paper.step_hours)?;
    }

    let final_price = sim.get_current_price(&symbol)?;
    let final_portfolio =
        PortfolioStatus::new(symbol, sim.balance(), final_price, &session.position());
    let return_pct = if start_value > 0.0 {
        (final_portfolio.portfolio_value - start_value) / start_value * 100.0
    } else {
        0.0
    };
    info!(
        run_id = %run_id,
        trades = trades.len(),
        final_value = final_portfolio.portfolio_value,
        "paper run finished"
    );

    Ok(PaperRunSummary {
        run_id,
        ticks: paper.ticks,
        trades,
        start_value,
        final_portfolio,
        return_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradewise_core::config::FileSourceConfig;

    #[test]
    fn zero_ticks_keeps_the_starting_portfolio() {
        let summary = run_paper(
            &EngineConfig::default(),
            &PaperConfig {
                ticks: 0,
                ..PaperConfig::default()
            },
        )
        .unwrap();
        assert!(summary.trades.is_empty());
        assert!((summary.final_portfolio.portfolio_value - summary.start_value).abs() < 1e-9);
        assert_eq!(summary.return_pct, 0.0);
    }

    #[test]
    fn file_backend_is_rejected() {
        let mut config = EngineConfig::default();
        config.data = MarketDataConfig::File(FileSourceConfig {
            dir: "data".into(),
            base_balance: 0.0,
            quote_balance: 0.0,
        });
        let err = run_paper(&config, &PaperConfig::default()).unwrap_err();
        assert!(matches!(err, SessionError::NotSimulated(_)));
    }

    #[test]
    fn run_id_depends_on_seed() {
        let config = EngineConfig::default();
        let a = PaperConfig::default();
        let b = PaperConfig {
            seed: Some(7),
            ..PaperConfig::default()
        };
        assert_eq!(
            paper_run_id(&config, &a).unwrap(),
            paper_run_id(&config, &a).unwrap()
        );
        assert_ne!(
            paper_run_id(&config, &a).unwrap(),
            paper_run_id(&config, &b).unwrap()
        );
    }

    #[test]
    fn run_id_ignores_a_redundant_seed_override() {
        let config = EngineConfig::default();
        let configured_seed = SimulatedConfig::default().seed;
        let plain = PaperConfig::default();
        let explicit = PaperConfig {
            seed: Some(configured_seed),
            ..PaperConfig::default()
        };
        assert_eq!(
            paper_run_id(&config, &plain).unwrap(),
            paper_run_id(&config, &explicit).unwrap()
        );
    }

    #[test]
    fn run_past_the_clock_horizon_is_rejected_up_front() {
        let err = run_paper(
            &EngineConfig::default(),
            &PaperConfig {
                ticks: 2,
                step_hours: 100_000_000,
                seed: None,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Market(MarketDataError::ClockExhausted { .. })
        ));

        let err = run_paper(
            &EngineConfig::default(),
            &PaperConfig {
                ticks: u64::MAX,
                step_hours: u64::MAX,
                seed: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Market(_)));
    }

    #[test]
    fn runs_are_deterministic() {
        let config = EngineConfig::default();
        let paper = PaperConfig {
            ticks: 24,
            ..PaperConfig::default()
        };
        let first = run_paper(&config, &paper).unwrap();
        let second = run_paper(&config, &paper).unwrap();
        assert_eq!(first.run_id, second.run_id);
        assert_eq!(first.trades, second.trades);
        assert_eq!(
            first.final_portfolio.portfolio_value,
            second.final_portfolio.portfolio_value
        );
    }
}
