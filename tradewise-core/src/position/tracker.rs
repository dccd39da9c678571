//! PositionTracker — records the basis of the open exposure from fills.
//!
//! Basis model: buys blend into a quantity-weighted average entry price;
//! sells reduce the tracked quantity and leave the basis untouched. Once the
//! tracked quantity drops below the tradable minimum the position is flat
//! and the entry price is cleared.
//!
//! One tracker per asset per strategy instance. It is not shared between
//! concurrent evaluations; callers serialize access.

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{AccountBalance, Action, Position, MIN_TRADABLE_QTY};
use crate::execution::FillConfirmation;

#[derive(Debug, Error, PartialEq)]
pub enum PositionError {
    #[error("fill price must be positive and finite, got {0}")]
    InvalidPrice(f64),

    #[error("fill quantity must be positive and finite, got {0}")]
    InvalidQuantity(f64),

    #[error("a HOLD cannot be filled")]
    HoldFill,
}

#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    position: Position,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume tracking from a known position.
    pub fn from_position(position: Position) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn entry_price(&self) -> Option<f64> {
        self.position.entry_price
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_flat()
    }

    /// Apply a confirmed fill. Unexecuted fills (rejected, zero quantity) are
    /// ignored.
    pub fn record_fill(&mut self, fill: &FillConfirmation) -> Result<(), PositionError> {
        if !fill.is_executed() {
            debug!(status = ?fill.status, "ignoring unexecuted fill");
            return Ok(());
        }
        if !fill.price.is_finite() || fill.price <= 0.0 {
            return Err(PositionError::InvalidPrice(fill.price));
        }
        if !fill.quantity.is_finite() {
            return Err(PositionError::InvalidQuantity(fill.quantity));
        }

        match fill.action {
            Action::Buy => self.apply_buy(fill.price, fill.quantity),
            Action::Sell => self.apply_sell(fill.quantity),
            Action::Hold => return Err(PositionError::HoldFill),
        }
        Ok(())
    }

    fn apply_buy(&mut self, price: f64, quantity: f64) {
        let held = self.position.quantity;
        let entry = match self.position.basis() {
            Some(basis) if held > 0.0 => (basis * held + price * quantity) / (held + quantity),
            _ => price,
        };
        self.position = Position::open(entry, held + quantity);
        info!(entry_price = entry, quantity = self.position.quantity, "position basis updated");
    }

    fn apply_sell(&mut self, quantity: f64) {
        let remaining = (self.position.quantity - quantity).max(0.0);
        if remaining < MIN_TRADABLE_QTY {
            if !self.position.is_flat() {
                info!("position closed");
            }
            self.position = Position::flat();
        } else {
            self.position.quantity = remaining;
            debug!(remaining, "position reduced, basis kept");
        }
    }

    /// Align the tracked quantity with freshly fetched balances.
    ///
    /// Holdings that disappeared outside this tracker (manual sells, transfers)
    /// close or shrink the position. Holdings that appear without a fill are
    /// left untracked, since their basis is unknown.
    pub fn reconcile(&mut self, balance: &AccountBalance) {
        if self.position.is_flat() {
            return;
        }
        let held = balance.base_asset_qty;
        if held < MIN_TRADABLE_QTY {
            info!(held, "holdings gone, clearing position");
            self.position = Position::flat();
        } else if held < self.position.quantity {
            debug!(tracked = self.position.quantity, held, "shrinking tracked quantity");
            self.position.quantity = held;
        }
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> Option<f64> {
        self.position.unrealized_pnl(current_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::FillStatus;

    fn fill(action: Action, price: f64, quantity: f64) -> FillConfirmation {
        FillConfirmation {
            action,
            price,
            quantity,
            status: FillStatus::Filled,
        }
    }

    #[test]
    fn buy_sets_entry_price() {
        let mut tracker = PositionTracker::new();
        tracker.record_fill(&fill(Action::Buy, 45_000.0, 0.002)).unwrap();
        assert_eq!(tracker.entry_price(), Some(45_000.0));
        assert_eq!(tracker.position().quantity, 0.002);
    }

    #[test]
    fn second_buy_averages_basis() {
        let mut tracker = PositionTracker::new();
        tracker.record_fill(&fill(Action::Buy, 100.0, 1.0)).unwrap();
        tracker.record_fill(&fill(Action::Buy, 200.0, 1.0)).unwrap();
        assert!((tracker.entry_price().unwrap() - 150.0).abs() < 1e-9);
        assert_eq!(tracker.position().quantity, 2.0);
    }

    #[test]
    fn partial_sell_keeps_basis() {
        let mut tracker = PositionTracker::new();
        tracker.record_fill(&fill(Action::Buy, 100.0, 1.0)).unwrap();
        tracker.record_fill(&fill(Action::Sell, 120.0, 0.25)).unwrap();
        assert_eq!(tracker.entry_price(), Some(100.0));
        assert!((tracker.position().quantity - 0.75).abs() < 1e-12);
    }

    #[test]
    fn full_sell_clears_entry() {
        let mut tracker = PositionTracker::new();
        tracker.record_fill(&fill(Action::Buy, 100.0, 1.0)).unwrap();
        tracker.record_fill(&fill(Action::Sell, 97.0, 1.0)).unwrap();
        assert!(tracker.is_flat());
        assert_eq!(tracker.entry_price(), None);
    }

    #[test]
    fn dust_remainder_counts_as_flat() {
        let mut tracker = PositionTracker::new();
        tracker.record_fill(&fill(Action::Buy, 100.0, 1.0)).unwrap();
        tracker.record_fill(&fill(Action::Sell, 100.0, 0.99995)).unwrap();
        assert!(tracker.is_flat());
    }

    #[test]
    fn rejected_fill_changes_nothing() {
        let mut tracker = PositionTracker::new();
        let mut rejected = fill(Action::Buy, 100.0, 1.0);
        rejected.status = FillStatus::Rejected;
        tracker.record_fill(&rejected).unwrap();
        assert!(tracker.is_flat());
    }

    #[test]
    fn invalid_fill_price_is_an_error() {
        let mut tracker = PositionTracker::new();
        let err = tracker.record_fill(&fill(Action::Buy, 0.0, 1.0)).unwrap_err();
        assert_eq!(err, PositionError::InvalidPrice(0.0));
    }

    #[test]
    fn hold_fill_is_an_error() {
        let mut tracker = PositionTracker::new();
        assert_eq!(
            tracker.record_fill(&fill(Action::Hold, 100.0, 1.0)),
            Err(PositionError::HoldFill)
        );
    }

    #[test]
    fn reconcile_clears_when_holdings_vanish() {
        let mut tracker = PositionTracker::from_position(Position::open(100.0, 1.0));
        tracker.reconcile(&AccountBalance::new(0.0, 500.0));
        assert!(tracker.is_flat());
    }

    #[test]
    fn reconcile_shrinks_to_balance() {
        let mut tracker = PositionTracker::from_position(Position::open(100.0, 1.0));
        tracker.reconcile(&AccountBalance::new(0.4, 0.0));
        assert_eq!(tracker.position().quantity, 0.4);
        assert_eq!(tracker.entry_price(), Some(100.0));
    }

    #[test]
    fn unrealized_pnl_uses_quantity() {
        let tracker = PositionTracker::from_position(Position::open(100.0, 2.0));
        assert!((tracker.unrealized_pnl(110.0).unwrap() - 20.0).abs() < 1e-9);
        assert_eq!(PositionTracker::new().unrealized_pnl(110.0), None);
    }
}
