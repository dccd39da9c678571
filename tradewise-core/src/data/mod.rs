//! Market data collaborators.
//!
//! The engine only consumes the `MarketDataSource` trait. Which
//! implementation backs it is an explicit configuration choice, never
//! inferred from missing credentials.

pub mod file;
pub mod provider;
pub mod simulated;

pub use file::FileMarketDataSource;
pub use provider::{MarketDataError, MarketDataSource};
pub use simulated::{SimulatedMarketDataSource, MAX_TICK, WARMUP_STEPS};

use crate::config::MarketDataConfig;
use crate::execution::OrderExecutor;

/// A configured market backend.
///
/// The simulated backend fills paper orders itself; the file backend is
/// read-only.
#[derive(Debug)]
pub enum MarketBackend {
    Simulated(SimulatedMarketDataSource),
    File(FileMarketDataSource),
}

impl MarketBackend {
    pub fn from_config(symbol: &str, config: &MarketDataConfig) -> Self {
        match config {
            MarketDataConfig::Simulated(sim) => {
                MarketBackend::Simulated(SimulatedMarketDataSource::new(symbol, sim.clone()))
            }
            MarketDataConfig::File(file) => MarketBackend::File(FileMarketDataSource::from_config(file)),
        }
    }

    pub fn source(&self) -> &dyn MarketDataSource {
        match self {
            MarketBackend::Simulated(sim) => sim,
            MarketBackend::File(file) => file,
        }
    }

    pub fn executor(&self) -> Option<&dyn OrderExecutor> {
        match self {
            MarketBackend::Simulated(sim) => Some(sim),
            MarketBackend::File(_) => None,
        }
    }

    pub fn simulated(&self) -> Option<&SimulatedMarketDataSource> {
        match self {
            MarketBackend::Simulated(sim) => Some(sim),
            MarketBackend::File(_) => None,
        }
    }
}
