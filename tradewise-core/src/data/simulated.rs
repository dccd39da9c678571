//! Simulated market — deterministic prices, balances and paper fills.
//!
//! Prices advance in hourly steps. Step `s` is either a point on a repeating
//! ten-step sawtooth around `base_price`, or a seeded random walk whose
//! per-step randomness comes from `RngHierarchy::rng_for(symbol, s)`.
//! Candles longer than an hour aggregate whole steps; shorter intervals map
//! one step to one candle.
//!
//! The clock starts after a warmup window so even 200 daily candles have
//! history behind them. `advance` moves it forward, up to `MAX_TICK`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::config::{PricePattern, SimulatedConfig};
use crate::domain::{AccountBalance, Action, Interval, Kline, PriceSeries};
use crate::execution::{ExecutionError, FillConfirmation, FillStatus, OrderExecutor};
use crate::rng::RngHierarchy;

use super::provider::{MarketDataError, MarketDataSource};

/// Steps of history available before the first tick.
pub const WARMUP_STEPS: u64 = 24 * 200;

/// Last step the clock can reach: ten years of hourly steps after warmup.
/// Random-walk history is kept in memory, so this also bounds its size.
pub const MAX_TICK: u64 = WARMUP_STEPS + 24 * 365 * 10;

const SAWTOOTH_PERIOD: u64 = 10;
const SAWTOOTH_STEP: f64 = 100.0;
const SAWTOOTH_WICK: f64 = 200.0;

#[derive(Debug, Clone, Copy)]
struct Step {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug)]
struct SimState {
    tick: u64,
    /// Random-walk steps generated so far, index = step.
    walk: Vec<Step>,
    balance: AccountBalance,
}

#[derive(Debug)]
pub struct SimulatedMarketDataSource {
    symbol: String,
    config: SimulatedConfig,
    rng: RngHierarchy,
    origin: DateTime<Utc>,
    state: Mutex<SimState>,
}

impl SimulatedMarketDataSource {
    pub fn new(symbol: impl Into<String>, config: SimulatedConfig) -> Self {
        let balance = AccountBalance::new(config.initial_base, config.initial_quote);
        Self {
            symbol: symbol.into(),
            rng: RngHierarchy::new(config.seed),
            origin: Utc.timestamp_opt(1_704_067_200, 0).single().unwrap_or_default(),
            state: Mutex::new(SimState {
                tick: WARMUP_STEPS,
                walk: Vec::new(),
                balance,
            }),
            config,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn config(&self) -> &SimulatedConfig {
        &self.config
    }

    /// Current step index.
    pub fn tick(&self) -> u64 {
        self.state().tick
    }

    /// Timestamp of the current step.
    pub fn now(&self) -> DateTime<Utc> {
        self.step_time(self.tick())
    }

    /// Move the clock forward by `steps` hours. The clock is left where it
    /// was if that would pass `MAX_TICK`.
    pub fn advance(&self, steps: u64) -> Result<u64, MarketDataError> {
        let mut state = self.state();
        let tick = state
            .tick
            .checked_add(steps)
            .filter(|&t| t <= MAX_TICK)
            .ok_or(MarketDataError::ClockExhausted {
                tick: state.tick,
                steps,
                horizon: MAX_TICK,
            })?;
        state.tick = tick;
        debug!(tick, "simulated clock advanced");
        Ok(tick)
    }

    pub fn balance(&self) -> AccountBalance {
        self.state().balance
    }

    pub fn set_balance(&self, balance: AccountBalance) {
        self.state().balance = balance;
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn step_time(&self, step: u64) -> DateTime<Utc> {
        self.origin + Duration::hours(step as i64)
    }

    fn check_symbol(&self, symbol: &str) -> Result<(), MarketDataError> {
        if symbol == self.symbol {
            Ok(())
        } else {
            Err(MarketDataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
    }

    fn sawtooth_step(&self, step: u64) -> Step {
        let variation = ((step % SAWTOOTH_PERIOD) as f64 - 5.0) * SAWTOOTH_STEP;
        let open = self.config.base_price + variation;
        let close = open + variation * 0.5;
        // the deepest step closes below the fixed wick; stretch it to the body
        Step {
            open,
            high: (open + SAWTOOTH_WICK).max(close),
            low: (open - SAWTOOTH_WICK).min(close),
            close,
            volume: 100.0 + (step % 50) as f64,
        }
    }

    fn walk_step(&self, step: u64, open: f64) -> Step {
        let vol = self.config.volatility;
        let mut rng = self.rng_for_step(step);
        let ret = (rng.gen::<f64>() * 2.0 - 1.0) * vol;
        let close = open * (1.0 + ret);
        let high = open.max(close) * (1.0 + rng.gen::<f64>() * vol * 0.5);
        let low = open.min(close) * (1.0 - rng.gen::<f64>() * vol * 0.5);
        let volume = rng.gen_range(50.0..500.0);
        Step {
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn rng_for_step(&self, step: u64) -> rand::rngs::StdRng {
        self.rng.rng_for(&self.symbol, step)
    }

    /// Steps `first..=last`, generating random-walk history as needed.
    fn steps(&self, state: &mut SimState, first: u64, last: u64) -> Vec<Step> {
        match self.config.pattern {
            PricePattern::Sawtooth => (first..=last).map(|s| self.sawtooth_step(s)).collect(),
            PricePattern::RandomWalk => {
                while state.walk.len() as u64 <= last {
                    let step = state.walk.len() as u64;
                    let open = state
                        .walk
                        .last()
                        .map(|s| s.close)
                        .unwrap_or(self.config.base_price);
                    let next = self.walk_step(step, open);
                    state.walk.push(next);
                }
                state.walk[first as usize..=last as usize].to_vec()
            }
        }
    }

    fn current_step(&self) -> Step {
        let mut state = self.state();
        let tick = state.tick;
        self.steps(&mut state, tick, tick)[0]
    }
}

fn steps_per_candle(interval: Interval) -> u64 {
    (interval.duration().num_hours().max(1)) as u64
}

fn aggregate(steps: &[Step]) -> Option<Step> {
    let first = steps.first()?;
    let last = steps.last()?;
    Some(Step {
        open: first.open,
        high: steps.iter().map(|s| s.high).fold(f64::MIN, f64::max),
        low: steps.iter().map(|s| s.low).fold(f64::MAX, f64::min),
        close: last.close,
        volume: steps.iter().map(|s| s.volume).sum(),
    })
}

impl MarketDataSource for SimulatedMarketDataSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn get_current_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        self.check_symbol(symbol)?;
        Ok(self.current_step().close)
    }

    fn get_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<PriceSeries, MarketDataError> {
        self.check_symbol(symbol)?;
        let per_candle = steps_per_candle(interval);

        let mut state = self.state();
        let tick = state.tick;
        let available = (tick + 1) / per_candle;
        let count = (limit as u64).min(available);
        if count == 0 {
            return Ok(PriceSeries::empty(symbol, interval));
        }

        let first_step = tick + 1 - count * per_candle;
        let steps = self.steps(&mut state, first_step, tick);
        drop(state);

        let klines = steps
            .chunks(per_candle as usize)
            .enumerate()
            .filter_map(|(i, chunk)| {
                let candle = aggregate(chunk)?;
                Some(Kline {
                    timestamp: self.step_time(first_step + i as u64 * per_candle),
                    open: candle.open,
                    high: candle.high,
                    low: candle.low,
                    close: candle.close,
                    volume: candle.volume,
                })
            })
            .collect();
        Ok(PriceSeries::new(symbol, interval, klines)?)
    }

    fn get_balance(&self) -> Result<AccountBalance, MarketDataError> {
        Ok(self.balance())
    }
}

impl OrderExecutor for SimulatedMarketDataSource {
    fn name(&self) -> &str {
        "paper"
    }

    /// Fill the whole order at the current price and move balances.
    fn execute(&self, action: Action, quantity_base: f64) -> Result<FillConfirmation, ExecutionError> {
        if !quantity_base.is_finite() || quantity_base <= 0.0 {
            return Err(ExecutionError::InvalidQuantity(quantity_base));
        }

        let price = self.current_step().close;
        let mut state = self.state();
        let balance = &mut state.balance;
        match action {
            Action::Buy => {
                let cost = quantity_base * price;
                if cost > balance.quote_asset_qty {
                    return Err(ExecutionError::InsufficientBalance {
                        asset: "quote",
                        needed: cost,
                        available: balance.quote_asset_qty,
                    });
                }
                balance.quote_asset_qty -= cost;
                balance.base_asset_qty += quantity_base;
            }
            Action::Sell => {
                if quantity_base > balance.base_asset_qty {
                    return Err(ExecutionError::InsufficientBalance {
                        asset: "base",
                        needed: quantity_base,
                        available: balance.base_asset_qty,
                    });
                }
                balance.base_asset_qty -= quantity_base;
                balance.quote_asset_qty += quantity_base * price;
            }
            Action::Hold => return Err(ExecutionError::NotExecutable(action)),
        }

        info!(
            symbol = %self.symbol,
            %action,
            quantity = quantity_base,
            price,
            "paper order filled"
        );
        Ok(FillConfirmation {
            action,
            price,
            quantity: quantity_base,
            status: FillStatus::Filled,
        })
    }
}
