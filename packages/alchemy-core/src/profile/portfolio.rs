//! Portfolio-level risk profiles.
//!
//! A portfolio is a fixed linear combination of asset price levels. Its return
//! series is the log return of that combined price, and its statistics are the
//! same mean/standard-deviation figures used for single assets.
//!
//! The covariance form `wᵀΣw` is carried as a cross-check. It measures the
//! variance of the weighted sum of asset log returns, which differs from the
//! variance of the combined price's log return because `ln` is not linear.

use crate::stats::{
    annualize_return, annualize_volatility, covariance_matrix, mean, quadratic_form, sample_std,
};
use crate::table::PriceTable;
use crate::types::{
    AssetRiskProfile, AssetTimeSeries, CovarianceCheck, PortfolioMetrics, PortfolioRiskProfile,
    PORTFOLIO_COLUMN,
};
use crate::{Error, Result};

/// Scale weights so they sum to 1.
///
/// Fails with `DegenerateWeights` when the vector is empty or its sum is zero
/// or not finite.
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(Error::DegenerateWeights("weight vector is empty".to_string()));
    }

    let total: f64 = weights.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Err(Error::DegenerateWeights(format!(
            "weights sum to {}, cannot normalize",
            total
        )));
    }

    Ok(weights.iter().map(|w| w / total).collect())
}

fn check_weight_count(profile: &AssetRiskProfile, weights: &[f64]) -> Result<()> {
    if weights.len() != profile.asset_count() {
        return Err(Error::ShapeMismatch {
            what: "weights",
            expected: profile.asset_count(),
            actual: weights.len(),
        });
    }
    Ok(())
}

/// Build the risk profile of a fixed-weight portfolio.
///
/// # Arguments
///
/// * `asset_risk_profile` - Profile of the underlying assets
/// * `weights` - One weight per asset column; normalized to sum to 1 before use
///
/// # Returns
///
/// The portfolio price series `Σ w_i · price_i`, its log returns, scalar
/// statistics, and the `wᵀΣw` covariance cross-check. Fails with
/// `ShapeMismatch` when the weight count differs from the asset count and
/// `DegenerateWeights` when the weights sum to zero.
///
/// Normalization means scaling every weight by the same non-zero factor gives
/// the same profile.
pub fn build_portfolio_risk_profile(
    asset_risk_profile: &AssetRiskProfile,
    weights: &[f64],
) -> Result<PortfolioRiskProfile> {
    check_weight_count(asset_risk_profile, weights)?;
    let weights = normalize_weights(weights)?;

    let prices = asset_risk_profile
        .time_series
        .prices
        .linear_combination(&weights, PORTFOLIO_COLUMN)?;
    let log_returns = prices.log_returns();

    let returns = log_returns.column(PORTFOLIO_COLUMN).unwrap_or_default();
    let metrics = PortfolioMetrics::from_log_returns(returns);

    let covariance = covariance_matrix(&asset_risk_profile.time_series.log_returns);
    let covariance_check = CovarianceCheck::from_variance(quadratic_form(&weights, &covariance)?);

    if returns.iter().any(|r| r.is_infinite()) {
        tracing::warn!("portfolio price series is not strictly positive");
    }
    tracing::debug!(
        assets = weights.len(),
        dates = prices.len(),
        daily_vol = metrics.daily_vol,
        covariance_vol = covariance_check.daily_vol,
        "built portfolio risk profile"
    );

    Ok(PortfolioRiskProfile {
        weights,
        time_series: AssetTimeSeries {
            prices,
            log_returns,
        },
        metrics,
        covariance_check,
    })
}

/// Weighted sum of per-asset log returns, `Σ w_i · r_i`, with normalized weights.
///
/// This is the return series whose sample variance equals `wᵀΣw` on dates
/// where every asset is observed. It is not the authoritative portfolio return;
/// see [`build_portfolio_risk_profile`].
pub fn weighted_log_returns(
    asset_risk_profile: &AssetRiskProfile,
    weights: &[f64],
) -> Result<PriceTable> {
    check_weight_count(asset_risk_profile, weights)?;
    let weights = normalize_weights(weights)?;
    asset_risk_profile
        .time_series
        .log_returns
        .linear_combination(&weights, PORTFOLIO_COLUMN)
}

impl PortfolioMetrics {
    /// Mean and sample standard deviation of a return series, with annualized figures.
    pub fn from_log_returns(log_returns: &[f64]) -> Self {
        let daily_return = mean(log_returns);
        let daily_vol = sample_std(log_returns);
        Self {
            daily_return,
            daily_vol,
            annual_return: annualize_return(daily_return),
            annual_vol: annualize_volatility(daily_vol),
        }
    }
}

impl CovarianceCheck {
    /// Derive volatility figures from a daily variance.
    pub fn from_variance(variance: f64) -> Self {
        let daily_vol = variance.sqrt();
        Self {
            variance,
            daily_vol,
            annual_vol: annualize_volatility(daily_vol),
        }
    }
}
