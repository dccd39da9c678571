//! Portfolio status and strategy summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::domain::{AccountBalance, Position};

/// Mark-to-market view of the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatus {
    pub symbol: String,
    pub balance: AccountBalance,
    pub current_price: f64,
    pub base_value: f64,
    pub portfolio_value: f64,
    pub entry_price: Option<f64>,
    /// In quote units, over the held base balance.
    pub unrealized_pnl: Option<f64>,
    pub unrealized_pnl_percent: Option<f64>,
}

impl PortfolioStatus {
    pub fn new(
        symbol: impl Into<String>,
        balance: AccountBalance,
        current_price: f64,
        position: &Position,
    ) -> Self {
        let base_value = balance.base_asset_qty * current_price;
        let held = balance.base_asset_qty > 0.0;
        let entry = position.basis().filter(|_| held);
        Self {
            symbol: symbol.into(),
            balance,
            current_price,
            base_value,
            portfolio_value: balance.value_at(current_price),
            entry_price: entry,
            unrealized_pnl: entry.map(|e| (current_price - e) * balance.base_asset_qty),
            unrealized_pnl_percent: entry.map(|e| (current_price - e) / e * 100.0),
        }
    }
}

impl fmt::Display for PortfolioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Portfolio ({})", self.symbol)?;
        writeln!(f, "  price:       {:.2}", self.current_price)?;
        writeln!(
            f,
            "  base:        {:.8} (~{:.2} quote)",
            self.balance.base_asset_qty, self.base_value
        )?;
        writeln!(f, "  quote:       {:.2}", self.balance.quote_asset_qty)?;
        write!(f, "  total value: {:.2}", self.portfolio_value)?;
        if let (Some(entry), Some(pnl), Some(pct)) =
            (self.entry_price, self.unrealized_pnl, self.unrealized_pnl_percent)
        {
            write!(f, "\n  entry:       {entry:.2}\n  unrealized:  {pnl:+.2} ({pct:+.2}%)")?;
        }
        Ok(())
    }
}

/// The strategy's parameters in reportable form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub name: String,
    pub description: String,
    pub timeframes: Vec<String>,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub max_position_size: f64,
    pub stop_loss_percent: f64,
    pub min_profit_to_sell: f64,
    pub take_profit_percent: f64,
    pub full_take_profit_percent: f64,
    pub action_threshold: f64,
    pub fingerprint: Option<String>,
}

impl StrategySummary {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            name: "conservative".into(),
            description: "Buys oversold dips near support, takes profit in tiers, \
                          always honors the stop-loss"
                .into(),
            timeframes: config
                .market
                .timeframes
                .iter()
                .map(|tf| format!("{}:{}", tf.interval, tf.limit))
                .collect(),
            rsi_period: config.signal.rsi_period,
            rsi_oversold: config.signal.rsi_oversold,
            rsi_overbought: config.signal.rsi_overbought,
            max_position_size: config.risk.max_position_size,
            stop_loss_percent: config.risk.stop_loss_percent,
            min_profit_to_sell: config.risk.min_profit_to_sell,
            take_profit_percent: config.risk.take_profit_percent,
            full_take_profit_percent: config.risk.full_take_profit_percent,
            action_threshold: config.risk.action_threshold,
            fingerprint: config.fingerprint().ok(),
        }
    }
}

impl fmt::Display for StrategySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy: {} ({})", self.name, self.description)?;
        writeln!(f, "  timeframes:     {}", self.timeframes.join(", "))?;
        writeln!(
            f,
            "  rsi:            period {}, oversold {}, overbought {}",
            self.rsi_period, self.rsi_oversold, self.rsi_overbought
        )?;
        writeln!(
            f,
            "  position size:  {:.0}% of quote balance",
            self.max_position_size * 100.0
        )?;
        writeln!(f, "  stop-loss:      -{}%", self.stop_loss_percent)?;
        writeln!(
            f,
            "  take-profit:    25% at +{}%, 50% at +{}%, all at +{}%",
            self.min_profit_to_sell, self.take_profit_percent, self.full_take_profit_percent
        )?;
        write!(f, "  min confidence: {}", self.action_threshold)?;
        if let Some(fp) = &self.fingerprint {
            write!(f, "\n  fingerprint:    {}", &fp[..fp.len().min(16)])?;
        }
        Ok(())
    }
}
