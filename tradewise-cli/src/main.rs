//! Tradewise CLI — analyze, trade, paper-trade and inspect configuration.
//!
//! Commands:
//! - `analyze`: one analysis-only cycle, printed as a report
//! - `trade`: auto-execute cycles against the configured market
//! - `paper`: paper-trading run over a simulated random walk
//! - `strategy`: print the strategy parameters
//! - `config`: print the effective configuration as TOML

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tradewise_core::config::{MarketDataConfig, PricePattern};
use tradewise_core::data::MarketBackend;
use tradewise_core::engine::StrategySummary;
use tradewise_core::EngineConfig;
use tradewise_runner::{run_paper, PaperConfig, SessionMode, TradingSession};

/// Largest simulated clock step between cycles: thirty days.
const MAX_STEP_HOURS: u64 = 24 * 30;

#[derive(Parser)]
#[command(
    name = "tradewise",
    about = "Tradewise: multi-timeframe BUY / SELL / HOLD decision engine"
)]
struct Cli {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analysis-only cycle and print the report.
    Analyze,
    /// Run auto-execute cycles against the configured market.
    Trade {
        /// Number of cycles.
        #[arg(long, default_value_t = 1)]
        cycles: u64,

        /// Simulated hours between cycles (simulated market only).
        #[arg(long, default_value_t = 1)]
        step_hours: u64,

        /// Print the full report for every cycle, not only executed ones.
        #[arg(long, default_value_t = false)]
        all: bool,
    },
    /// Paper-trade over a simulated market.
    Paper {
        /// Number of ticks.
        #[arg(long, default_value_t = 48)]
        ticks: u64,

        /// Seed override for the simulated market.
        #[arg(long)]
        seed: Option<u64>,

        /// Simulated hours between ticks.
        #[arg(long, default_value_t = 1)]
        step_hours: u64,

        /// Use the sawtooth pattern instead of a random walk.
        #[arg(long, default_value_t = false)]
        sawtooth: bool,

        /// Print the summary as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the strategy summary.
    Strategy,
    /// Print the effective configuration as TOML.
    Config {
        /// Print the built-in defaults instead of the loaded file.
        #[arg(long, default_value_t = false)]
        default: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Config { default: true } => print_config(&EngineConfig::default()),
        command => {
            let config = load_config(cli.config.as_deref())?;
            match command {
                Commands::Analyze => run_analyze(config),
                Commands::Trade {
                    cycles,
                    step_hours,
                    all,
                } => run_trade(config, cycles, step_hours, all),
                Commands::Paper {
                    ticks,
                    seed,
                    step_hours,
                    sawtooth,
                    json,
                } => run_paper_cmd(config, ticks, seed, step_hours, sawtooth, json),
                Commands::Strategy => {
                    println!("{}", StrategySummary::from_config(&config));
                    Ok(())
                }
                Commands::Config { .. } => print_config(&config),
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn run_analyze(config: EngineConfig) -> Result<()> {
    let backend = MarketBackend::from_config(&config.market.symbol, &config.data);
    let mut session = TradingSession::new(config, SessionMode::AnalysisOnly)?;
    let report = session.run_cycle(backend.source(), None)?;
    println!("{report}");
    Ok(())
}

fn run_trade(config: EngineConfig, cycles: u64, step_hours: u64, all: bool) -> Result<()> {
    if cycles == 0 {
        bail!("--cycles must be at least 1");
    }
    check_step_hours(step_hours)?;
    let backend = MarketBackend::from_config(&config.market.symbol, &config.data);
    if backend.executor().is_none() {
        bail!(
            "the '{}' market cannot execute orders; use `analyze` or a SIMULATED [data] section",
            backend.source().name()
        );
    }

    let mut session = TradingSession::new(config, SessionMode::AutoExecute)?;
    let mut executed = 0usize;
    for cycle in 0..cycles {
        let report = session.run_cycle(backend.source(), backend.executor())?;
        if report.executed().is_some() {
            executed += 1;
        }
        if all || report.executed().is_some() || cycle + 1 == cycles {
            println!("{report}\n");
        }
        if let Some(sim) = backend.simulated() {
            sim.advance(step_hours).context("advancing the simulated clock")?;
        }
    }
    info!(cycles, executed, "trading finished");
    println!("{executed} order(s) executed over {cycles} cycle(s)");
    Ok(())
}

fn run_paper_cmd(
    mut config: EngineConfig,
    ticks: u64,
    seed: Option<u64>,
    step_hours: u64,
    sawtooth: bool,
    json: bool,
) -> Result<()> {
    check_step_hours(step_hours)?;
    match &mut config.data {
        MarketDataConfig::Simulated(sim) => {
            sim.pattern = if sawtooth {
                PricePattern::Sawtooth
            } else {
                PricePattern::RandomWalk
            };
        }
        MarketDataConfig::File(_) => bail!("paper trading needs a SIMULATED [data] section"),
    }

    let summary = run_paper(
        &config,
        &PaperConfig {
            ticks,
            step_hours,
            seed,
        },
    )?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("serializing paper summary")?
        );
    } else {
        println!("{summary}");
    }
    Ok(())
}

fn check_step_hours(step_hours: u64) -> Result<()> {
    if step_hours == 0 || step_hours > MAX_STEP_HOURS {
        bail!("--step-hours must be between 1 and {MAX_STEP_HOURS}");
    }
    Ok(())
}

fn print_config(config: &EngineConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    println!("# fingerprint: {}", config.fingerprint()?);
    Ok(())
}
