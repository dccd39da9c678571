//! Engine configuration — TOML-backed, validated before any decision is made.
//!
//! Every field has a default, so a partial TOML file (or none) yields a usable
//! configuration. `validate()` is the only place configuration errors surface;
//! the engine constructors call it and refuse to build on failure.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Interval;
use crate::signals::TieBreakPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid config value for `{field}`: {message}")]
    Invalid { field: &'static str, message: String },
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be a finite number, got {value}")))
    }
}

fn check_range(field: &'static str, value: f64, lo: f64, hi: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value < lo || value > hi {
        return Err(invalid(field, format!("must be in [{lo}, {hi}], got {value}")));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value <= 0.0 {
        return Err(invalid(field, format!("must be positive, got {value}")));
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, format!("must not be negative, got {value}")));
    }
    Ok(())
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub market: MarketConfig,
    pub signal: SignalConfig,
    pub fusion: FusionConfig,
    pub risk: RiskConfig,
    pub data: MarketDataConfig,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.market.validate()?;
        self.signal.validate()?;
        self.fusion.validate()?;
        self.risk.validate()?;
        self.data.validate()
    }

    /// BLAKE3 hex digest of the canonical JSON form.
    ///
    /// Two configs with the same fingerprint produce identical decisions for
    /// identical inputs.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_vec(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }
}

/// Which symbol to trade and which candle windows to evaluate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub symbol: String,
    /// Ordered shortest first; the first entry is the primary timeframe.
    pub timeframes: Vec<TimeframeConfig>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".into(),
            timeframes: vec![
                TimeframeConfig {
                    interval: Interval::OneHour,
                    limit: 100,
                },
                TimeframeConfig {
                    interval: Interval::FourHours,
                    limit: 50,
                },
            ],
        }
    }
}

impl MarketConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(invalid("market.symbol", "must not be empty"));
        }
        if self.timeframes.is_empty() {
            return Err(invalid("market.timeframes", "at least one timeframe is required"));
        }
        if let Some(tf) = self.timeframes.iter().find(|tf| tf.limit == 0) {
            return Err(invalid(
                "market.timeframes.limit",
                format!("limit for {} must be at least 1", tf.interval),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeframeConfig {
    pub interval: Interval,
    pub limit: usize,
}

/// Single-timeframe signal thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Fractional band below support still counted as "near support".
    pub support_band: f64,
    /// Fractional band above resistance still counted as "near resistance".
    pub resistance_band: f64,
    /// Percent distance from SMA50 that counts as a trend deviation.
    pub trend_threshold_pct: f64,
    /// Conditions (out of four) needed for a directional signal.
    pub min_score: u8,
    pub tie_break: TieBreakPolicy,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            support_band: 0.02,
            resistance_band: 0.02,
            trend_threshold_pct: 2.0,
            min_score: 3,
            tie_break: TieBreakPolicy::BuyFirst,
        }
    }
}

impl SignalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.rsi_period == 0 {
            return Err(invalid("signal.rsi_period", "must be at least 1"));
        }
        check_range("signal.rsi_oversold", self.rsi_oversold, 0.0, 100.0)?;
        check_range("signal.rsi_overbought", self.rsi_overbought, 0.0, 100.0)?;
        if self.rsi_oversold >= self.rsi_overbought {
            return Err(invalid(
                "signal.rsi_oversold",
                format!(
                    "must be below rsi_overbought ({} >= {})",
                    self.rsi_oversold, self.rsi_overbought
                ),
            ));
        }
        check_range("signal.support_band", self.support_band, 0.0, 1.0)?;
        check_range("signal.resistance_band", self.resistance_band, 0.0, 1.0)?;
        check_non_negative("signal.trend_threshold_pct", self.trend_threshold_pct)?;
        if !(1..=4).contains(&self.min_score) {
            return Err(invalid(
                "signal.min_score",
                format!("must be between 1 and 4, got {}", self.min_score),
            ));
        }
        Ok(())
    }
}

/// Multi-timeframe agreement parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Mean confidence that must be exceeded for the agreement bonus.
    pub agreement_threshold: f64,
    pub agreement_bonus: f64,
    pub max_confidence: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            agreement_threshold: 0.7,
            agreement_bonus: 0.1,
            max_confidence: 0.95,
        }
    }
}

impl FusionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("fusion.agreement_threshold", self.agreement_threshold, 0.0, 1.0)?;
        check_range("fusion.agreement_bonus", self.agreement_bonus, 0.0, 1.0)?;
        check_range("fusion.max_confidence", self.max_confidence, 0.0, 1.0)
    }
}

/// Position sizing and exit thresholds. Percentages are in percent units
/// (2.0 means 2%); `max_position_size` is a fraction of the quote balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub max_position_size: f64,
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
    pub min_profit_to_sell: f64,
    pub full_take_profit_percent: f64,
    pub min_quote_balance: f64,
    pub min_trade_quantity: f64,
    /// Confidence a SELL signal needs to override a position that is
    /// neither in profit nor stopped out.
    pub strong_sell_confidence: f64,
    /// Below this confidence the engine always holds.
    pub action_threshold: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_position_size: 0.10,
            stop_loss_percent: 2.0,
            take_profit_percent: 5.0,
            min_profit_to_sell: 3.0,
            full_take_profit_percent: 10.0,
            min_quote_balance: 100.0,
            min_trade_quantity: 0.0001,
            strong_sell_confidence: 0.7,
            action_threshold: 0.6,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_finite("risk.max_position_size", self.max_position_size)?;
        if self.max_position_size <= 0.0 || self.max_position_size > 1.0 {
            return Err(invalid(
                "risk.max_position_size",
                format!("must be in (0, 1], got {}", self.max_position_size),
            ));
        }
        check_positive("risk.stop_loss_percent", self.stop_loss_percent)?;
        check_positive("risk.min_profit_to_sell", self.min_profit_to_sell)?;
        check_positive("risk.take_profit_percent", self.take_profit_percent)?;
        check_positive("risk.full_take_profit_percent", self.full_take_profit_percent)?;
        if self.min_profit_to_sell > self.take_profit_percent
            || self.take_profit_percent > self.full_take_profit_percent
        {
            return Err(invalid(
                "risk.take_profit_percent",
                format!(
                    "profit tiers must be ordered: min_profit_to_sell ({}) <= take_profit_percent ({}) <= full_take_profit_percent ({})",
                    self.min_profit_to_sell, self.take_profit_percent, self.full_take_profit_percent
                ),
            ));
        }
        check_non_negative("risk.min_quote_balance", self.min_quote_balance)?;
        check_positive("risk.min_trade_quantity", self.min_trade_quantity)?;
        check_range("risk.strong_sell_confidence", self.strong_sell_confidence, 0.0, 1.0)?;
        check_range("risk.action_threshold", self.action_threshold, 0.0, 1.0)
    }
}

/// Where market data comes from. Always chosen explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketDataConfig {
    /// In-process simulated market that also fills paper orders.
    Simulated(SimulatedConfig),
    /// Klines read from `<dir>/<SYMBOL>_<interval>.json`.
    File(FileSourceConfig),
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        MarketDataConfig::Simulated(SimulatedConfig::default())
    }
}

impl MarketDataConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MarketDataConfig::Simulated(sim) => sim.validate(),
            MarketDataConfig::File(file) => {
                if file.dir.as_os_str().is_empty() {
                    return Err(invalid("data.dir", "must not be empty"));
                }
                Ok(())
            }
        }
    }
}

/// Shape of the simulated price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricePattern {
    /// Repeating ten-candle sawtooth around the base price.
    #[default]
    Sawtooth,
    /// Seeded random walk.
    RandomWalk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedConfig {
    pub pattern: PricePattern,
    pub base_price: f64,
    /// Maximum absolute per-candle return for the random walk.
    pub volatility: f64,
    pub seed: u64,
    pub initial_base: f64,
    pub initial_quote: f64,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            pattern: PricePattern::Sawtooth,
            base_price: 45_000.0,
            volatility: 0.01,
            seed: 42,
            initial_base: 0.001,
            initial_quote: 1000.0,
        }
    }
}

impl SimulatedConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        check_positive("data.base_price", self.base_price)?;
        check_range("data.volatility", self.volatility, 0.0, 0.5)?;
        check_non_negative("data.initial_base", self.initial_base)?;
        check_non_negative("data.initial_quote", self.initial_quote)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSourceConfig {
    pub dir: PathBuf,
    /// Balance reported by the file source, which has no account of its own.
    #[serde(default)]
    pub base_balance: f64,
    #[serde(default)]
    pub quote_balance: f64,
}
