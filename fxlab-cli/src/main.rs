//! FXLab CLI: run backtests and generate synthetic quote files.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config file and save artifacts
//! - `synth`: write a seeded synthetic quote series as CSV

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use fxlab_runner::data_loader::write_bars_csv;
use fxlab_runner::{
    format_summary, run_from_config, save_artifacts, BarSource, RunConfig, SyntheticBarSource,
    SyntheticConfig,
};

#[derive(Parser)]
#[command(name = "fxlab", about = "FXLab CLI: bid/ask channel crossover backtester")]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "debug", "fxlab_core=debug").
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file with [backtest] and [data] tables.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for result.json, trades.csv and equity.csv.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Write a synthetic random-walk quote series as CSV.
    Synth {
        /// Number of bars.
        #[arg(long, default_value_t = 10_000)]
        bars: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Starting mid price.
        #[arg(long, default_value_t = 1.10)]
        start_price: f64,

        /// Fixed ask − bid.
        #[arg(long, default_value_t = 0.0002)]
        spread: f64,

        /// Maximum relative move per bar.
        #[arg(long, default_value_t = 0.0005)]
        volatility: f64,

        /// First bar time (RFC 3339). Defaults to 2024-01-01T00:00:00Z.
        #[arg(long)]
        start: Option<String>,

        /// Seconds between bars.
        #[arg(long, default_value_t = 60)]
        interval_secs: i64,

        /// Output CSV path.
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            no_save,
        } => run_backtest_cmd(config, output_dir, no_save),
        Commands::Synth {
            bars,
            seed,
            start_price,
            spread,
            volatility,
            start,
            interval_secs,
            output,
        } => {
            let mut synth = SyntheticConfig {
                bars,
                seed,
                start_price,
                spread,
                volatility,
                interval_secs,
                ..Default::default()
            };
            if let Some(s) = start {
                synth.start = DateTime::parse_from_rfc3339(&s)
                    .with_context(|| format!("invalid --start '{s}', expected RFC 3339"))?
                    .with_timezone(&Utc);
            }
            run_synth(synth, output)
        }
    }
}

fn run_backtest_cmd(config_path: PathBuf, output_dir: PathBuf, no_save: bool) -> Result<()> {
    let run = RunConfig::from_file(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let base_dir = config_path.parent();

    let result = run_from_config(&run, base_dir)?;

    print!("{}", format_summary(&result));

    if !no_save {
        let dir = save_artifacts(&result, &output_dir)?;
        println!("Artifacts saved to: {}", dir.display());
    }

    Ok(())
}

fn run_synth(config: SyntheticConfig, output: PathBuf) -> Result<()> {
    let source = SyntheticBarSource::new(config);
    let bars = source.load()?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = std::fs::File::create(&output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_bars_csv(&bars, file)?;

    tracing::info!(bars = bars.len(), path = %output.display(), "synthetic series written");
    println!("Wrote {} bars to {}", bars.len(), output.display());
    Ok(())
}
