//! Core data types for asset and portfolio risk profiles.
//!
//! The same shapes serve single assets and portfolios: a portfolio is simply a
//! time series with one column named [`PORTFOLIO_COLUMN`].

use crate::table::PriceTable;
use serde::{Deserialize, Serialize};

/// Column name used for the single series of a portfolio profile.
pub const PORTFOLIO_COLUMN: &str = "portfolio";

/// Historical prices and the log returns derived from them.
///
/// Both tables share the same columns. `log_returns` starts one date later
/// than `prices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetTimeSeries {
    /// Raw price observations, one column per asset
    pub prices: PriceTable,
    /// Natural-log period returns derived from `prices`
    pub log_returns: PriceTable,
}

/// Per-asset return and volatility statistics, index-aligned with `assets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMetrics {
    /// Asset names in column order
    pub assets: Vec<String>,
    /// Sample mean of daily log returns
    #[serde(deserialize_with = "nan::vec")]
    pub daily_return: Vec<f64>,
    /// Sample standard deviation of daily log returns
    #[serde(deserialize_with = "nan::vec")]
    pub daily_vol: Vec<f64>,
    /// `daily_return * 252`
    #[serde(deserialize_with = "nan::vec")]
    pub annual_return: Vec<f64>,
    /// `daily_vol * sqrt(252)`
    #[serde(deserialize_with = "nan::vec")]
    pub annual_vol: Vec<f64>,
}

impl AssetMetrics {
    /// Number of assets covered.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether no assets are covered.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Statistics for the asset at column `index`.
    pub fn get(&self, index: usize) -> Option<AssetMetric> {
        Some(AssetMetric {
            asset: self.assets.get(index)?.clone(),
            daily_return: *self.daily_return.get(index)?,
            daily_vol: *self.daily_vol.get(index)?,
            annual_return: *self.annual_return.get(index)?,
            annual_vol: *self.annual_vol.get(index)?,
        })
    }

    /// Iterate over per-asset statistics in column order.
    pub fn iter(&self) -> impl Iterator<Item = AssetMetric> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

/// Statistics of a single asset, as a flat record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetMetric {
    pub asset: String,
    #[serde(deserialize_with = "nan::scalar")]
    pub daily_return: f64,
    #[serde(deserialize_with = "nan::scalar")]
    pub daily_vol: f64,
    #[serde(deserialize_with = "nan::scalar")]
    pub annual_return: f64,
    #[serde(deserialize_with = "nan::scalar")]
    pub annual_vol: f64,
}

/// Price history, log returns and statistics for a set of assets.
///
/// Built once by [`crate::build_asset_risk_profile`] and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRiskProfile {
    pub time_series: AssetTimeSeries,
    pub metrics: AssetMetrics,
}

impl AssetRiskProfile {
    /// Asset names in column order.
    pub fn asset_names(&self) -> &[String] {
        self.time_series.prices.column_names()
    }

    /// Number of asset columns.
    pub fn asset_count(&self) -> usize {
        self.time_series.prices.width()
    }

    /// Statistics for the first asset with the given name.
    pub fn metric(&self, asset: &str) -> Option<AssetMetric> {
        let index = self.metrics.assets.iter().position(|a| a == asset)?;
        self.metrics.get(index)
    }
}

/// Scalar return and volatility statistics of a portfolio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PortfolioMetrics {
    /// Sample mean of the portfolio's daily log returns
    #[serde(deserialize_with = "nan::scalar")]
    pub daily_return: f64,
    /// Sample standard deviation of the portfolio's daily log returns
    #[serde(deserialize_with = "nan::scalar")]
    pub daily_vol: f64,
    /// `daily_return * 252`
    #[serde(deserialize_with = "nan::scalar")]
    pub annual_return: f64,
    /// `daily_vol * sqrt(252)`
    #[serde(deserialize_with = "nan::scalar")]
    pub annual_vol: f64,
}

/// Portfolio variance from the covariance of per-asset log returns (`wᵀΣw`).
///
/// This is the variance of the weighted sum of asset log returns, which is not
/// the same quantity as the variance of the log return of the weighted price
/// series. It is carried alongside the direct figures for comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CovarianceCheck {
    /// Daily variance `wᵀΣw`
    #[serde(deserialize_with = "nan::scalar")]
    pub variance: f64,
    /// `sqrt(variance)`
    #[serde(deserialize_with = "nan::scalar")]
    pub daily_vol: f64,
    /// `daily_vol * sqrt(252)`
    #[serde(deserialize_with = "nan::scalar")]
    pub annual_vol: f64,
}

/// Price history, log returns and statistics for a fixed-weight portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRiskProfile {
    /// Normalized weights (sum to 1), in asset column order
    pub weights: Vec<f64>,
    /// Single-column price and log-return series
    pub time_series: AssetTimeSeries,
    pub metrics: PortfolioMetrics,
    pub covariance_check: CovarianceCheck,
}

impl PortfolioRiskProfile {
    /// Daily volatility of the price-series returns minus the covariance estimate.
    pub fn volatility_gap(&self) -> f64 {
        self.metrics.daily_vol - self.covariance_check.daily_vol
    }
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// serde_json writes non-finite floats as `null`; read them back as NaN.
///
/// The encoding is lossy: `+inf` and `-inf` also come back as NaN, so an
/// infinite log return from a zero price reads back like a missing
/// observation. Check [`crate::PriceTable::non_finite_prices`] on the prices
/// before serializing when that distinction matters.
pub(crate) mod nan {
    use serde::{Deserialize, Deserializer};

    pub fn scalar<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }

    pub fn vec<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        let raw = Vec::<Option<f64>>::deserialize(d)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }

    pub fn matrix<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let raw = Vec::<Vec<Option<f64>>>::deserialize(d)?;
        Ok(raw
            .into_iter()
            .map(|col| col.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> AssetMetrics {
        AssetMetrics {
            assets: vec!["SPY".to_string(), "GLD".to_string()],
            daily_return: vec![0.001, f64::NAN],
            daily_vol: vec![0.01, f64::NAN],
            annual_return: vec![0.252, f64::NAN],
            annual_vol: vec![0.01 * 252f64.sqrt(), f64::NAN],
        }
    }

    #[test]
    fn test_asset_metrics_get() {
        let m = metrics();
        let spy = m.get(0).unwrap();
        assert_eq!(spy.asset, "SPY");
        assert_eq!(spy.daily_return, 0.001);
        assert!(m.get(2).is_none());
        assert_eq!(m.iter().count(), 2);
    }

    #[test]
    fn test_metrics_nan_roundtrip_through_json() {
        let json = serde_json::to_string(&metrics()).unwrap();
        assert!(json.contains("null"));

        let back: AssetMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.daily_return[0], 0.001);
        assert!(back.daily_return[1].is_nan());
        assert!(back.annual_vol[1].is_nan());
    }

    #[test]
    fn test_infinite_values_read_back_as_nan() {
        let mut m = metrics();
        m.daily_return[0] = f64::INFINITY;
        m.daily_vol[0] = f64::NEG_INFINITY;

        let back: AssetMetrics = serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();
        assert!(back.daily_return[0].is_nan());
        assert!(back.daily_vol[0].is_nan());
        assert_eq!(back.annual_return[0], 0.252);
    }

    #[test]
    fn test_api_response_metric_payload() {
        let gld = metrics().get(1).unwrap();
        let value = serde_json::to_value(ApiResponse::ok(vec![gld])).unwrap();

        assert_eq!(value["ok"], true);
        assert!(value.get("error").is_none());
        assert_eq!(value["data"][0]["asset"], "GLD");
        assert!(value["data"][0]["annual_vol"].is_null());

        let value = serde_json::to_value(ApiResponse::<AssetMetric>::err("no ticker to process"))
            .unwrap();
        assert_eq!(value["ok"], false);
        assert!(value.get("data").is_none());
        assert_eq!(value["error"], "no ticker to process");
    }
}
