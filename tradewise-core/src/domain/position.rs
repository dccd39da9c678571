use serde::{Deserialize, Serialize};

/// Price basis of the currently held base-asset quantity.
///
/// `entry_price` is `None` when flat. `quantity` is the base quantity the basis
/// applies to, as recorded from fills.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub entry_price: Option<f64>,
    pub quantity: f64,
}

impl Position {
    pub fn flat() -> Self {
        Self::default()
    }

    /// A position opened at `entry_price` for `quantity` base units.
    pub fn open(entry_price: f64, quantity: f64) -> Self {
        Self {
            entry_price: Some(entry_price),
            quantity,
        }
    }

    /// Entry price when it is usable as a P&L basis (known and positive).
    pub fn basis(&self) -> Option<f64> {
        self.entry_price.filter(|p| *p > 0.0)
    }

    pub fn is_flat(&self) -> bool {
        self.entry_price.is_none()
    }

    /// Percent move from the basis to `current_price`.
    pub fn profit_percent(&self, current_price: f64) -> Option<f64> {
        self.basis()
            .map(|entry| (current_price - entry) / entry * 100.0)
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> Option<f64> {
        self.basis()
            .map(|entry| self.quantity * (current_price - entry))
    }
}
