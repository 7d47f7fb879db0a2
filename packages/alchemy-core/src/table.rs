//! Date-indexed price tables.
//!
//! A [`PriceTable`] holds one row per trading date and one named `f64` column
//! per series. Missing observations are stored as `NaN`.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Date-indexed table of named numeric columns.
///
/// Deserialization goes through [`PriceTable::new`], so a decoded table holds
/// the same shape guarantees as a constructed one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawPriceTable")]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    /// Column-major values, `values[column][row]`
    values: Vec<Vec<f64>>,
}

/// Wire form of [`PriceTable`], checked before use.
#[derive(Deserialize)]
struct RawPriceTable {
    dates: Vec<NaiveDate>,
    columns: Vec<String>,
    #[serde(deserialize_with = "crate::types::nan::matrix")]
    values: Vec<Vec<f64>>,
}

impl TryFrom<RawPriceTable> for PriceTable {
    type Error = Error;

    fn try_from(raw: RawPriceTable) -> Result<Self> {
        if raw.columns.len() != raw.values.len() {
            return Err(Error::ShapeMismatch {
                what: "value columns",
                expected: raw.columns.len(),
                actual: raw.values.len(),
            });
        }
        Self::new(raw.dates, raw.columns.into_iter().zip(raw.values).collect())
    }
}

/// A price that cannot be used to take a log return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceAnomaly {
    pub column: String,
    pub date: NaiveDate,
    pub price: f64,
}

impl PriceTable {
    /// Create a table from a date index and `(name, values)` columns.
    ///
    /// Every column must have one value per date, and dates must be strictly
    /// ascending.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidInput(format!(
                "dates must be strictly ascending: {} followed by {}",
                pair[0], pair[1]
            )));
        }

        let mut names = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            if column.len() != dates.len() {
                return Err(Error::ShapeMismatch {
                    what: "values in column",
                    expected: dates.len(),
                    actual: column.len(),
                });
            }
            names.push(name);
            values.push(column);
        }

        Ok(Self {
            dates,
            columns: names,
            values,
        })
    }

    /// Create a one-column table.
    pub fn single(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        Self::new(dates, vec![(name.into(), values)])
    }

    /// Align named series on the union of their dates.
    ///
    /// Each series is `(name, dates, values)` with ascending dates. A date
    /// absent from one series becomes `NaN` in that column. Column order follows
    /// the input order; repeated names keep separate columns.
    pub fn union(series: &[(&str, &[NaiveDate], &[f64])]) -> Self {
        let dates: Vec<NaiveDate> = series
            .iter()
            .flat_map(|(_, dates, _)| dates.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut columns = Vec::with_capacity(series.len());
        let mut values = Vec::with_capacity(series.len());
        for (name, series_dates, series_values) in series {
            let mut column = vec![f64::NAN; dates.len()];
            for (date, value) in series_dates.iter().zip(series_values.iter()) {
                if let Ok(row) = dates.binary_search(date) {
                    column[row] = *value;
                }
            }
            columns.push(name.to_string());
            values.push(column);
        }

        Self {
            dates,
            columns,
            values,
        }
    }

    /// Date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names in order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Values of the first column with the given name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.column_at(index)
    }

    /// Values of the column at `index`.
    pub fn column_at(&self, index: usize) -> Option<&[f64]> {
        self.values.get(index).map(Vec::as_slice)
    }

    /// Iterate over `(name, values)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// One-column table holding the named field.
    ///
    /// `position` only labels the error when the field is absent.
    pub fn select(&self, field: &str, position: usize) -> Result<PriceTable> {
        let values = self.column(field).ok_or_else(|| Error::MissingField {
            position,
            field: field.to_string(),
        })?;
        Ok(Self {
            dates: self.dates.clone(),
            columns: vec![field.to_string()],
            values: vec![values.to_vec()],
        })
    }

    /// Natural-log returns, `ln(p[t] / p[t-1])`, without the first date.
    ///
    /// Missing neighbours give `NaN`; zero or negative prices give non-finite
    /// values, which are kept as-is.
    pub fn log_returns(&self) -> PriceTable {
        let dates = self.dates.iter().skip(1).copied().collect();
        let values: Vec<Vec<f64>> = self
            .values
            .iter()
            .map(|column| column.windows(2).map(|w| (w[1] / w[0]).ln()).collect())
            .collect();

        Self {
            dates,
            columns: self.columns.clone(),
            values,
        }
    }

    /// One-column table of `Σ w_i · column_i` at every date.
    pub fn linear_combination(&self, weights: &[f64], name: &str) -> Result<PriceTable> {
        if weights.len() != self.width() {
            return Err(Error::ShapeMismatch {
                what: "weights",
                expected: self.width(),
                actual: weights.len(),
            });
        }

        let combined: Vec<f64> = (0..self.len())
            .map(|row| {
                weights
                    .iter()
                    .zip(self.values.iter())
                    .map(|(w, column)| w * column[row])
                    .sum::<f64>()
            })
            .collect();

        Ok(Self {
            dates: self.dates.clone(),
            columns: vec![name.to_string()],
            values: vec![combined],
        })
    }

    /// Rows where every column has an observation.
    pub fn complete_rows(&self) -> Vec<Vec<f64>> {
        (0..self.len())
            .map(|row| self.values.iter().map(|column| column[row]).collect::<Vec<f64>>())
            .filter(|row| row.iter().all(|v| !v.is_nan()))
            .collect()
    }

    /// Zero, negative or infinite prices. Missing (`NaN`) cells are not reported.
    pub fn non_finite_prices(&self) -> Vec<PriceAnomaly> {
        let mut anomalies = Vec::new();
        for (name, column) in self.columns() {
            for (date, &price) in self.dates.iter().zip(column) {
                if !price.is_nan() && (price.is_infinite() || price <= 0.0) {
                    anomalies.push(PriceAnomaly {
                        column: name.to_string(),
                        date: *date,
                        price,
                    });
                }
            }
        }
        anomalies
    }
}
