//! Sample statistics over price and return series.
//!
//! Missing observations (`NaN`) are skipped, so a column with gaps is
//! summarized over the dates it actually has. Infinite values are not skipped
//! and propagate into the result.

use crate::table::PriceTable;
use crate::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Trading days per year used to annualize daily figures.
///
/// Fixed by convention for exchange-traded assets; not configurable.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

fn observed(xs: &[f64]) -> impl Iterator<Item = f64> + '_ {
    xs.iter().copied().filter(|x| !x.is_nan())
}

/// Sample mean, or `NaN` when there are no observations.
pub fn mean(xs: &[f64]) -> f64 {
    let (sum, n) = observed(xs).fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Unbiased sample variance (n - 1 denominator), or `NaN` below two observations.
pub fn sample_variance(xs: &[f64]) -> f64 {
    let n = observed(xs).count();
    if n < 2 {
        return f64::NAN;
    }

    let m = mean(xs);
    observed(xs).map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Unbiased sample standard deviation.
pub fn sample_std(xs: &[f64]) -> f64 {
    sample_variance(xs).sqrt()
}

/// Scale a daily mean return to a yearly figure.
pub fn annualize_return(daily_return: f64) -> f64 {
    daily_return * TRADING_DAYS_PER_YEAR
}

/// Scale a daily volatility to a yearly figure (square-root-of-time rule).
pub fn annualize_volatility(daily_vol: f64) -> f64 {
    daily_vol * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sample covariance matrix of the table's columns.
///
/// Only rows where every column is observed are used. With fewer than two
/// such rows every entry is `NaN`.
pub fn covariance_matrix(table: &PriceTable) -> DMatrix<f64> {
    let k = table.width();
    let rows = table.complete_rows();
    let n = rows.len();
    if n < 2 {
        return DMatrix::from_element(k, k, f64::NAN);
    }

    let means: Vec<f64> = (0..k)
        .map(|j| rows.iter().map(|row| row[j]).sum::<f64>() / n as f64)
        .collect();

    let mut cov = DMatrix::zeros(k, k);
    for i in 0..k {
        for j in i..k {
            let c = rows
                .iter()
                .map(|row| (row[i] - means[i]) * (row[j] - means[j]))
                .sum::<f64>()
                / (n - 1) as f64;
            cov[(i, j)] = c;
            cov[(j, i)] = c;
        }
    }
    cov
}

/// Quadratic form `wᵀΣw`.
pub fn quadratic_form(weights: &[f64], covariance: &DMatrix<f64>) -> Result<f64> {
    if covariance.nrows() != covariance.ncols() {
        return Err(Error::ShapeMismatch {
            what: "covariance columns",
            expected: covariance.nrows(),
            actual: covariance.ncols(),
        });
    }
    if weights.len() != covariance.nrows() {
        return Err(Error::ShapeMismatch {
            what: "weights",
            expected: covariance.nrows(),
            actual: weights.len(),
        });
    }

    let w = DVector::from_column_slice(weights);
    Ok((w.transpose() * covariance * &w)[(0, 0)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    #[test]
    fn test_mean_and_std() {
        let xs = [0.01, -0.02, 0.03, 0.0];
        assert_relative_eq!(mean(&xs), 0.005, epsilon = 1e-15);

        // deviations: 0.005, -0.025, 0.025, -0.005 -> ss = 0.0013, / 3
        assert_relative_eq!(sample_variance(&xs), 0.0013 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(sample_std(&xs), (0.0013f64 / 3.0).sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_statistics_skip_missing() {
        let xs = [1.0, f64::NAN, 3.0];
        assert_eq!(mean(&xs), 2.0);
        assert_eq!(sample_variance(&xs), 2.0);
    }

    #[test]
    fn test_statistics_of_short_series() {
        assert!(mean(&[]).is_nan());
        assert!(mean(&[f64::NAN]).is_nan());
        assert!(sample_variance(&[1.0]).is_nan());
        assert!(sample_std(&[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn test_infinite_values_propagate() {
        assert_eq!(mean(&[1.0, f64::NEG_INFINITY]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_annualization_is_pure_scaling() {
        let daily = 0.000_4;
        assert_eq!(annualize_return(daily), daily * 252.0);
        assert_eq!(annualize_volatility(daily), daily * 252f64.sqrt());
    }

    #[test]
    fn test_covariance_matrix() {
        let dates: Vec<NaiveDate> = (2..6)
            .map(|day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap())
            .collect();
        let table = PriceTable::new(
            dates,
            vec![
                ("A".to_string(), vec![1.0, 2.0, 3.0, 4.0]),
                ("B".to_string(), vec![2.0, 4.0, 6.0, 8.0]),
            ],
        )
        .unwrap();

        let cov = covariance_matrix(&table);
        let var_a = sample_variance(table.column("A").unwrap());
        assert_relative_eq!(cov[(0, 0)], var_a, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], 2.0 * var_a, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 0)], cov[(0, 1)]);
        assert_relative_eq!(cov[(1, 1)], 4.0 * var_a, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_matrix_too_few_rows() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let table = PriceTable::single("A", vec![date], vec![1.0]).unwrap();
        let cov = covariance_matrix(&table);
        assert_eq!(cov.shape(), (1, 1));
        assert!(cov[(0, 0)].is_nan());
    }

    #[test]
    fn test_quadratic_form() {
        let cov = DMatrix::from_row_slice(2, 2, &[0.04, 0.006, 0.006, 0.09]);
        let variance = quadratic_form(&[0.6, 0.4], &cov).unwrap();

        // 0.36 * 0.04 + 2 * 0.24 * 0.006 + 0.16 * 0.09
        assert_relative_eq!(variance, 0.0144 + 0.00288 + 0.0144, epsilon = 1e-15);
    }

    #[test]
    fn test_quadratic_form_shape_mismatch() {
        let cov = DMatrix::from_element(2, 2, 1.0);
        let result = quadratic_form(&[1.0], &cov);
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }
}
