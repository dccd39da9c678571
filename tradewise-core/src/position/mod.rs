//! Position tracking — the single owner of the entry-price basis.

pub mod tracker;

pub use tracker::{PositionError, PositionTracker};
