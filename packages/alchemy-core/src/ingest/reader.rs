//! CSV price snapshot parsing.

use crate::table::PriceTable;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse the leading `YYYY-MM-DD` of a cell, ignoring any time suffix.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    let head = cell.get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

/// Empty or unparsable cells are missing observations.
fn parse_value(cell: &str) -> f64 {
    cell.trim().parse().unwrap_or(f64::NAN)
}

/// Read a price snapshot file.
///
/// The first column is the trading date; every other header becomes a column
/// (e.g. `Open`, `Close`, `Adj Close`, `Volume`). Rows whose first cell is not
/// a date, such as the `Ticker,...` and `Date,,,` header rows written for
/// multi-level columns, are skipped.
pub fn read_price_table(path: impl AsRef<Path>) -> Result<PriceTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let table = read_price_table_from(file)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.len(),
        columns = table.width(),
        "read price snapshot"
    );
    Ok(table)
}

/// Read a price snapshot from any reader. See [`read_price_table`].
pub fn read_price_table_from<R: Read>(reader: R) -> Result<PriceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "expected a date column followed by price columns, got {} column(s)",
            headers.len()
        )));
    }
    let names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(date) = record.get(0).and_then(parse_date) else {
            continue;
        };
        let values = (1..=names.len())
            .map(|i| record.get(i).map(parse_value).unwrap_or(f64::NAN))
            .collect();
        rows.push((date, values));
    }

    rows.sort_by_key(|(date, _)| *date);
    let dates: Vec<NaiveDate> = rows.iter().map(|(date, _)| *date).collect();
    let columns: Vec<(String, Vec<f64>)> = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, rows.iter().map(|(_, values)| values[i]).collect()))
        .collect();

    PriceTable::new(dates, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SNAPSHOT: &str = "\
Date,Adj Close,Close,High,Low,Open,Volume
2024-01-02,470.1,472.65,473.67,470.49,472.16,123623700
2024-01-03,465.9,468.79,471.19,468.17,470.43,103585900
2024-01-04,,467.28,470.96,467.05,468.30,84232200
";

    #[test]
    fn test_read_snapshot() {
        let table = read_price_table_from(SNAPSHOT.as_bytes()).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.width(), 6);
        assert_eq!(table.column_names()[0], "Adj Close");
        assert_eq!(table.dates()[0], NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(table.column("Close").unwrap()[1], 468.79);

        let adj = table.column("Adj Close").unwrap();
        assert!(adj[2].is_nan());
    }

    #[test]
    fn test_skips_multi_level_header_rows() {
        let csv = "\
Price,Adj Close,Close
Ticker,SPY,SPY
Date,,
2024-01-02 00:00:00,470.1,472.65
2024-01-03 00:00:00,465.9,468.79
";
        let table = read_price_table_from(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("Adj Close").unwrap(), &[470.1, 465.9]);
    }

    #[test]
    fn test_sorts_rows_by_date() {
        let csv = "Date,Close\n2024-01-03,2.0\n2024-01-02,1.0\n";
        let table = read_price_table_from(csv.as_bytes()).unwrap();
        assert_eq!(table.column("Close").unwrap(), &[1.0, 2.0]);
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let csv = "Date,Close\n2024-01-02,2.0\n2024-01-02,1.0\n";
        let result = read_price_table_from(csv.as_bytes());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_date_only_file_rejected() {
        let result = read_price_table_from("Date\n2024-01-02\n".as_bytes());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_read_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("SPY-20240105-1704470400000.csv");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let table = read_price_table(&path).unwrap();
        assert_eq!(table.len(), 3);

        let missing = read_price_table(dir.path().join("nope.csv"));
        assert!(matches!(missing, Err(Error::Io(_))));
    }
}
