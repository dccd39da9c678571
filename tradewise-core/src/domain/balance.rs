use serde::{Deserialize, Serialize};

/// Account balances for one trading pair, fetched fresh per evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountBalance {
    /// Traded asset (e.g. BTC).
    pub base_asset_qty: f64,
    /// Funding currency (e.g. USDT).
    pub quote_asset_qty: f64,
}

impl AccountBalance {
    pub fn new(base_asset_qty: f64, quote_asset_qty: f64) -> Self {
        Self {
            base_asset_qty,
            quote_asset_qty,
        }
    }

    /// Total value in quote units at `price`.
    pub fn value_at(&self, price: f64) -> f64 {
        self.quote_asset_qty + self.base_asset_qty * price
    }
}
