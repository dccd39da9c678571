//! Risk manager — decides whether to act on a signal, and how much.
//!
//! Buys are capped at `max_position_size` of the quote balance. Sells run an
//! ordered exit chain (see `exit`) where price-based exits are unconditional
//! and technical exits are gated by confidence.
//!
//! # Non-Responsibilities
//! - The risk manager never looks at price history (that's the evaluator's job)
//! - It never records fills (that's the position tracker's job)

pub mod exit;

pub use exit::{ExitRule, SellDecision};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, RiskConfig};
use crate::domain::AccountBalance;
use crate::signals::CombinedSignal;

/// A sized buy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyDecision {
    pub quantity_base: f64,
    pub quantity_quote: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RiskManager {
    config: RiskConfig,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Size a buy, or `None` when the signal, balance or resulting quantity
    /// does not allow one.
    pub fn should_buy(
        &self,
        signal: &CombinedSignal,
        balance: &AccountBalance,
        current_price: f64,
    ) -> Option<BuyDecision> {
        if !signal.signal.is_buy() || signal.confidence < self.config.action_threshold {
            return None;
        }
        if !is_usable_price(current_price) {
            return None;
        }

        let available = balance.quote_asset_qty;
        if available.is_nan() || available < self.config.min_quote_balance {
            debug!(
                available,
                minimum = self.config.min_quote_balance,
                "quote balance too small to buy"
            );
            return None;
        }

        let quantity_quote = available * self.config.max_position_size;
        let quantity_base = quantity_quote / current_price;
        if quantity_base < self.config.min_trade_quantity {
            debug!(quantity_base, "buy quantity below tradable minimum");
            return None;
        }

        Some(BuyDecision {
            quantity_base,
            quantity_quote,
            confidence: signal.confidence,
        })
    }

    /// Run the exit chain against the held base balance.
    ///
    /// `entry_price` is the tracked basis; non-positive values are treated as
    /// unknown.
    pub fn should_sell(
        &self,
        signal: &CombinedSignal,
        balance: &AccountBalance,
        current_price: f64,
        entry_price: Option<f64>,
    ) -> Option<SellDecision> {
        let held = balance.base_asset_qty;
        if held.is_nan() || held < self.config.min_trade_quantity || !is_usable_price(current_price) {
            return None;
        }

        let entry = entry_price.filter(|p| is_usable_price(*p));
        let profit_percent = entry.map(|e| (current_price - e) / e * 100.0);
        let rule = exit::first_matching_rule(&self.config, signal, profit_percent)?;

        let quantity_base = held * rule.fraction();
        if quantity_base > held || quantity_base < self.config.min_trade_quantity {
            debug!(quantity_base, held, ?rule, "sell quantity not tradable");
            return None;
        }

        Some(SellDecision {
            rule,
            quantity_base,
            quantity_quote: quantity_base * current_price,
            profit_percent,
            confidence: rule.confidence(signal),
        })
    }
}

fn is_usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Signal;

    fn manager() -> RiskManager {
        RiskManager::default()
    }

    fn buy(confidence: f64) -> CombinedSignal {
        CombinedSignal::new(Signal::Buy, confidence)
    }

    #[test]
    fn buy_sizes_to_max_position() {
        let decision = manager()
            .should_buy(&buy(0.8), &AccountBalance::new(0.0, 1000.0), 50_000.0)
            .unwrap();
        assert!((decision.quantity_quote - 100.0).abs() < 1e-9);
        assert!((decision.quantity_base - 0.002).abs() < 1e-12);
        assert_eq!(decision.confidence, 0.8);
    }

    #[test]
    fn buy_requires_buy_signal() {
        let sell = CombinedSignal::new(Signal::Sell, 0.9);
        assert!(manager()
            .should_buy(&sell, &AccountBalance::new(0.0, 1000.0), 100.0)
            .is_none());
    }

    #[test]
    fn buy_requires_confidence() {
        assert!(manager()
            .should_buy(&buy(0.59), &AccountBalance::new(0.0, 1000.0), 100.0)
            .is_none());
        assert!(manager()
            .should_buy(&buy(0.6), &AccountBalance::new(0.0, 1000.0), 100.0)
            .is_some());
    }

    #[test]
    fn buy_requires_minimum_quote() {
        assert!(manager()
            .should_buy(&buy(0.9), &AccountBalance::new(0.0, 99.99), 100.0)
            .is_none());
    }

    #[test]
    fn buy_below_tradable_quantity_is_rejected() {
        // 10% of 100 = 10 quote at 200k → 0.00005 base
        assert!(manager()
            .should_buy(&buy(0.9), &AccountBalance::new(0.0, 100.0), 200_000.0)
            .is_none());
    }

    #[test]
    fn buy_rejects_unusable_price() {
        let balance = AccountBalance::new(0.0, 1000.0);
        assert!(manager().should_buy(&buy(0.9), &balance, 0.0).is_none());
        assert!(manager().should_buy(&buy(0.9), &balance, f64::NAN).is_none());
    }

    #[test]
    fn sell_refused_below_minimum_holding() {
        let sell = CombinedSignal::new(Signal::Sell, 0.9);
        assert!(manager()
            .should_sell(&sell, &AccountBalance::new(0.00009, 0.0), 100.0, Some(50.0))
            .is_none());
    }

    #[test]
    fn invalid_config_fails_fast() {
        let config = RiskConfig {
            stop_loss_percent: -2.0,
            ..RiskConfig::default()
        };
        assert!(RiskManager::new(config).is_err());
    }
}
