//! Alchemy CLI - Risk profiles from market-data snapshots.
//!
//! Prints JSON on stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use alchemy_core::ingest::read_tickers;
use alchemy_core::{
    build_asset_risk_profile, build_portfolio_risk_profile, ApiResponse, AssetRiskProfile, Config,
};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "alchemy")]
#[command(about = "Asset and portfolio risk profiles from market-data snapshots")]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-asset return and volatility
    Assets {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },
    /// Return and volatility of a fixed-weight portfolio
    Portfolio {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Weight per ticker, in ticker order (normalized to sum to 1)
        #[arg(short, long = "weight", required = true, allow_negative_numbers = true)]
        weights: Vec<f64>,
    },
}

#[derive(Args)]
struct SnapshotArgs {
    /// As-of date of the snapshots (yyyy-mm-dd)
    #[arg(long)]
    as_of: NaiveDate,
    /// Ticker to load (repeat for multiple tickers)
    #[arg(short, long = "ticker", conflicts_with = "ticker_file")]
    tickers: Vec<String>,
    /// File listing tickers, one per line
    #[arg(long)]
    ticker_file: Option<PathBuf>,
    /// Price column to profile [default: $ALCHEMY_PRICE_FIELD or "Adj Close"]
    #[arg(short, long)]
    field: Option<String>,
    /// Snapshot root directory [default: $ALCHEMY_DATA_DIR or ~/.alchemy/market-data]
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "alchemy_core=debug,alchemy=debug"
    } else {
        "alchemy_core=info,alchemy=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Assets { snapshot } => handle_assets(snapshot),
        Commands::Portfolio { snapshot, weights } => handle_portfolio(snapshot, weights),
    };

    let (response, code) = match result {
        Ok(data) => (ApiResponse::ok(data), ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "risk profile failed");
            (ApiResponse::err(format!("{e:#}")), ExitCode::FAILURE)
        }
    };

    match serde_json::to_string_pretty(&response) {
        Ok(output) => {
            println!("{}", output);
            code
        }
        Err(e) => {
            eprintln!("failed to serialize response: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_assets(args: SnapshotArgs) -> anyhow::Result<(Vec<String>, AssetRiskProfile)> {
    let mut config = Config::from_env();
    if let Some(dir) = args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(field) = args.field {
        config = config.with_price_field(field);
    }

    if !config.data_dir.is_dir() {
        bail!("data directory {} does not exist", config.data_dir.display());
    }

    let tickers = match args.ticker_file {
        Some(path) => read_tickers(&path)
            .with_context(|| format!("failed to read tickers from {}", path.display()))?,
        None => args.tickers,
    };
    if tickers.is_empty() {
        bail!("no ticker to process");
    }

    let tables = config
        .store()
        .load(&tickers, args.as_of)
        .with_context(|| format!("failed to load snapshots as of {}", args.as_of))?;
    let profile = build_asset_risk_profile(&tables, &tickers, &config.price_field)?;
    tracing::info!(
        tickers = tickers.len(),
        dates = profile.time_series.prices.len(),
        field = %config.price_field,
        "built asset risk profile"
    );

    Ok((tickers, profile))
}

fn handle_assets(args: SnapshotArgs) -> anyhow::Result<serde_json::Value> {
    let as_of = args.as_of;
    let (tickers, profile) = load_assets(args)?;
    let metrics: Vec<_> = profile.metrics.iter().collect();

    Ok(json!({
        "as_of": as_of,
        "tickers": tickers,
        "dates": profile.time_series.prices.len(),
        "metrics": metrics,
    }))
}

fn handle_portfolio(args: SnapshotArgs, weights: Vec<f64>) -> anyhow::Result<serde_json::Value> {
    let as_of = args.as_of;
    let (tickers, assets) = load_assets(args)?;
    let portfolio = build_portfolio_risk_profile(&assets, &weights)?;

    Ok(json!({
        "as_of": as_of,
        "tickers": tickers,
        "weights": portfolio.weights,
        "dates": portfolio.time_series.prices.len(),
        "metrics": portfolio.metrics,
        "covariance_check": portfolio.covariance_check,
        "volatility_gap": portfolio.volatility_gap(),
    }))
}
