//! Tradewise Runner — trading sessions on top of `tradewise-core`.
//!
//! This crate provides:
//! - Trading sessions: fetch, evaluate, optionally execute, track the fill
//! - Analysis-only and auto-execute modes
//! - Per-cycle reports (portfolio, per-timeframe market view, decision, action)
//! - Paper-trading runs over a simulated market with a deterministic run id

pub mod paper;
pub mod report;
pub mod session;

pub use paper::{paper_run_id, run_paper, PaperConfig, PaperRunSummary, TradeEvent};
pub use report::{ActionTaken, CycleReport};
pub use session::{SessionError, SessionMode, TradingSession};
