//! Alchemy Core - Risk/return profiles for assets and portfolios.
//!
//! This crate turns historical price tables into descriptive risk metrics:
//!
//! - **Price tables**: Date-indexed, union-aligned multi-asset prices
//! - **Asset profiles**: Log returns plus daily/annualized return and volatility
//! - **Portfolio profiles**: Fixed-weight portfolios with a covariance cross-check
//! - **Snapshot ingestion**: Reading the CSV snapshots written by the market-data fetcher
//!
//! # Example
//!
//! ```rust,no_run
//! use alchemy_core::ingest::SnapshotStore;
//! use alchemy_core::{build_asset_risk_profile, build_portfolio_risk_profile};
//! use chrono::NaiveDate;
//!
//! let store = SnapshotStore::new("/data/market");
//! let as_of = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
//! let tables = store.load(&["SPY", "GLD"], as_of)?;
//!
//! let assets = build_asset_risk_profile(&tables, &["SPY", "GLD"], "Adj Close")?;
//! let portfolio = build_portfolio_risk_profile(&assets, &[0.6, 0.4])?;
//! println!("annual vol: {:.4}", portfolio.metrics.annual_vol);
//! # Ok::<(), alchemy_core::Error>(())
//! ```

pub mod config;
pub mod ingest;
pub mod profile;
pub mod stats;
pub mod table;
pub mod types;

pub use config::Config;
pub use profile::{
    build_asset_risk_profile, build_portfolio_risk_profile, ensure_finite_prices,
    normalize_weights, weighted_log_returns,
};
pub use stats::{annualize_return, annualize_volatility, TRADING_DAYS_PER_YEAR};
pub use table::{PriceAnomaly, PriceTable};
pub use types::{
    ApiResponse, AssetMetric, AssetMetrics, AssetRiskProfile, AssetTimeSeries, CovarianceCheck,
    PortfolioMetrics, PortfolioRiskProfile, PORTFOLIO_COLUMN,
};

use chrono::NaiveDate;

/// Error types for alchemy-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Shape mismatch: {expected} {what} expected, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Missing field: table #{position} has no column '{field}'")]
    MissingField { position: usize, field: String },

    #[error("Degenerate weights: {0}")]
    DegenerateWeights(String),

    #[error("Non-finite price for {asset} on {date}: {price}")]
    NonFinitePrice {
        asset: String,
        date: NaiveDate,
        price: f64,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for alchemy-core operations.
pub type Result<T> = std::result::Result<T, Error>;
