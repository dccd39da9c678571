//! Tradewise Core — a market-signal decision engine.
//!
//! Turns OHLCV history into a bounded, risk-constrained BUY / SELL / HOLD
//! recommendation:
//! - Domain types (klines, price series, balances, positions, recommendations)
//! - Indicators (RSI, simple moving averages, support/resistance)
//! - Per-timeframe signal evaluation and multi-timeframe fusion
//! - Risk management: position-size caps, stop-loss, tiered take-profit
//! - Position tracking from confirmed fills
//! - The decision engine that wires the above together
//! - Collaborator contracts for market data and order execution, with
//!   simulated and file-backed implementations

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod indicators;
pub mod position;
pub mod risk;
pub mod rng;
pub mod signals;

pub use config::{ConfigError, EngineConfig};
pub use domain::{AccountBalance, Action, Interval, Kline, Position, PriceSeries, Recommendation};
pub use engine::{Decision, DecisionEngine};
