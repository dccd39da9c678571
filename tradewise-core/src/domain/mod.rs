//! Domain types for the decision engine.

pub mod balance;
pub mod kline;
pub mod position;
pub mod recommendation;

pub use balance::AccountBalance;
pub use kline::{Interval, Kline, PriceSeries, SeriesError};
pub use position::Position;
pub use recommendation::{Action, Recommendation, Trigger};

/// Smallest base-asset quantity that can be traded or held as a position.
pub const MIN_TRADABLE_QTY: f64 = 0.0001;
