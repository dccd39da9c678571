//! Order execution contract.
//!
//! The decision engine never calls an executor. The caller acts on a
//! `Recommendation`, executes it here, and feeds the resulting fill back into
//! the `PositionTracker`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FillStatus {
    Filled,
    PartiallyFilled,
    Rejected,
}

/// Confirmation returned by the executor for one order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillConfirmation {
    pub action: Action,
    /// Average fill price.
    pub price: f64,
    /// Executed base quantity.
    pub quantity: f64,
    pub status: FillStatus,
}

impl FillConfirmation {
    pub fn is_executed(&self) -> bool {
        matches!(self.status, FillStatus::Filled | FillStatus::PartiallyFilled) && self.quantity > 0.0
    }
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("cannot execute a {0} order")]
    NotExecutable(Action),

    #[error("invalid order quantity {0}")]
    InvalidQuantity(f64),

    #[error("insufficient {asset} balance: need {needed}, have {available}")]
    InsufficientBalance {
        asset: &'static str,
        needed: f64,
        available: f64,
    },

    #[error("no price available to fill against: {0}")]
    NoPrice(String),

    #[error("executor error: {0}")]
    Other(String),
}

/// Something that can execute a sized market order.
pub trait OrderExecutor: Send + Sync {
    /// Human-readable name of this executor.
    fn name(&self) -> &str;

    fn execute(&self, action: Action, quantity_base: f64) -> Result<FillConfirmation, ExecutionError>;
}
