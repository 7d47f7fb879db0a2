//! Asset-level risk profiles.

use crate::stats::{annualize_return, annualize_volatility, mean, sample_std};
use crate::table::PriceTable;
use crate::types::{AssetMetrics, AssetRiskProfile, AssetTimeSeries};
use crate::{Error, Result};
use std::collections::HashSet;

/// Build an asset risk profile from per-asset price tables.
///
/// # Arguments
///
/// * `price_tables` - One date-indexed table per asset (e.g. a parsed snapshot)
/// * `asset_names` - Column name for each table, in the same order
/// * `price_field` - Column to take from every table (e.g. `"Adj Close"`)
///
/// # Returns
///
/// The union-aligned price table, its log returns, and per-asset statistics.
/// Fails with `ShapeMismatch` when the counts differ and `MissingField` when a
/// table lacks `price_field`.
///
/// Prices are assumed strictly positive. Zero or negative prices are not
/// filtered; they show up as non-finite log returns. Use
/// [`ensure_finite_prices`] to reject them up front.
///
/// Duplicate asset names are kept as separate columns; deduplication is up to
/// the caller.
pub fn build_asset_risk_profile<S: AsRef<str>>(
    price_tables: &[PriceTable],
    asset_names: &[S],
    price_field: &str,
) -> Result<AssetRiskProfile> {
    if price_tables.len() != asset_names.len() {
        return Err(Error::ShapeMismatch {
            what: "asset names",
            expected: price_tables.len(),
            actual: asset_names.len(),
        });
    }

    let selected = price_tables
        .iter()
        .enumerate()
        .map(|(position, table)| table.select(price_field, position))
        .collect::<Result<Vec<_>>>()?;

    let mut series = Vec::with_capacity(selected.len());
    for (table, name) in selected.iter().zip(asset_names) {
        let name: &str = name.as_ref();
        // select yields exactly one column
        for (_, values) in table.columns() {
            series.push((name, table.dates(), values));
        }
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = series.iter().map(|(name, _, _)| *name).find(|n| !seen.insert(*n)) {
        tracing::warn!(asset = duplicate, "duplicate asset name kept as a separate column");
    }

    let prices = PriceTable::union(&series);
    tracing::debug!(
        assets = prices.width(),
        dates = prices.len(),
        field = price_field,
        "aligned asset prices"
    );

    Ok(AssetRiskProfile::from_prices(prices))
}

/// Fail with `NonFinitePrice` on the first zero, negative or infinite price.
pub fn ensure_finite_prices(prices: &PriceTable) -> Result<()> {
    match prices.non_finite_prices().into_iter().next() {
        Some(anomaly) => Err(Error::NonFinitePrice {
            asset: anomaly.column,
            date: anomaly.date,
            price: anomaly.price,
        }),
        None => Ok(()),
    }
}

impl AssetRiskProfile {
    /// Build a profile from an already-aligned price table.
    pub fn from_prices(prices: PriceTable) -> Self {
        let anomalies = prices.non_finite_prices();
        if let Some(first) = anomalies.first() {
            tracing::warn!(
                count = anomalies.len(),
                asset = %first.column,
                date = %first.date,
                price = first.price,
                "non-positive prices produce non-finite log returns"
            );
        }

        let log_returns = prices.log_returns();
        let metrics = AssetMetrics::from_log_returns(&log_returns);

        Self {
            time_series: AssetTimeSeries {
                prices,
                log_returns,
            },
            metrics,
        }
    }
}

impl AssetMetrics {
    /// Per-column mean and sample standard deviation, with annualized figures.
    pub fn from_log_returns(log_returns: &PriceTable) -> Self {
        let width = log_returns.width();
        let mut metrics = Self {
            assets: Vec::with_capacity(width),
            daily_return: Vec::with_capacity(width),
            daily_vol: Vec::with_capacity(width),
            annual_return: Vec::with_capacity(width),
            annual_vol: Vec::with_capacity(width),
        };

        for (name, returns) in log_returns.columns() {
            let daily_return = mean(returns);
            let daily_vol = sample_std(returns);

            metrics.assets.push(name.to_string());
            metrics.daily_return.push(daily_return);
            metrics.daily_vol.push(daily_vol);
            metrics.annual_return.push(annualize_return(daily_return));
            metrics.annual_vol.push(annualize_volatility(daily_vol));
        }

        metrics
    }
}
