//! Market-data snapshot ingestion.
//!
//! The market-data fetcher writes one CSV per ticker per run under a directory
//! per as-of date:
//!
//! ```text
//! <root>/<yyyymmdd>/<ticker>-<yyyymmdd>-<timestamp>.csv
//! ```
//!
//! A ticker fetched several times on the same day has several files; the one
//! with the newest timestamp wins. This module only reads that layout.

mod reader;
mod tickers;

pub use reader::{read_price_table, read_price_table_from};
pub use tickers::{parse_tickers, read_tickers};

use crate::table::PriceTable;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const AS_OF_FORMAT: &str = "%Y%m%d";

/// Integer timestamps below this are epoch seconds rather than milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Parsed `<ticker>-<yyyymmdd>-<timestamp>.csv` snapshot file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotName {
    /// Ticker symbol, which may itself contain `-` (e.g. `BRK-B`)
    pub ticker: String,
    /// Logical date the snapshot represents
    pub as_of: NaiveDate,
    /// Wall-clock fetch time in epoch milliseconds
    pub fetched_at_millis: i64,
}

impl SnapshotName {
    /// Create a snapshot name.
    pub fn new(ticker: &str, as_of: NaiveDate, fetched_at_millis: i64) -> Self {
        Self {
            ticker: ticker.to_string(),
            as_of,
            fetched_at_millis,
        }
    }

    /// Parse a snapshot file name.
    ///
    /// The timestamp may be integer epoch milliseconds, integer epoch seconds,
    /// or fractional epoch seconds. Returns `None` for anything else.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".csv")?;
        let mut parts = stem.rsplitn(3, '-');
        let timestamp = parts.next()?;
        let as_of = parts.next()?;
        let ticker = parts.next().filter(|t| !t.is_empty())?;

        let as_of = NaiveDate::parse_from_str(as_of, AS_OF_FORMAT).ok()?;
        let fetched_at_millis = parse_timestamp(timestamp)?;

        Some(Self::new(ticker, as_of, fetched_at_millis))
    }

    /// File name in the fetcher's layout, with a millisecond timestamp.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.csv",
            self.ticker,
            self.as_of.format(AS_OF_FORMAT),
            self.fetched_at_millis
        )
    }

    /// Fetch time as a UTC timestamp.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.fetched_at_millis)
    }
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(value) = raw.parse::<i64>() {
        if value < 0 {
            return None;
        }
        return Some(if value < MILLIS_THRESHOLD {
            value * 1000
        } else {
            value
        });
    }

    let seconds: f64 = raw.parse().ok()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| (seconds * 1000.0).round() as i64)
}

/// Read-only view over a snapshot directory tree.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the snapshots for an as-of date.
    pub fn dir_for(&self, as_of: NaiveDate) -> PathBuf {
        self.root.join(as_of.format(AS_OF_FORMAT).to_string())
    }

    /// All snapshot files for an as-of date, in directory order.
    ///
    /// Files that do not follow the naming scheme, or whose embedded as-of date
    /// differs from the directory's, are ignored.
    pub fn snapshots(&self, as_of: NaiveDate) -> Result<Vec<(SnapshotName, PathBuf)>> {
        let dir = self.dir_for(as_of);
        if !dir.is_dir() {
            return Err(Error::SnapshotNotFound(format!(
                "no snapshot directory {}",
                dir.display()
            )));
        }

        let mut found = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            match SnapshotName::parse(file_name) {
                Some(name) if name.as_of == as_of => found.push((name, path)),
                _ => tracing::debug!(file = file_name, "skipping non-snapshot file"),
            }
        }
        Ok(found)
    }

    /// Path of the newest snapshot of `ticker` for `as_of`.
    pub fn latest(&self, ticker: &str, as_of: NaiveDate) -> Result<PathBuf> {
        self.snapshots(as_of)?
            .into_iter()
            .filter(|(name, _)| name.ticker == ticker)
            .max_by_key(|(name, _)| name.fetched_at_millis)
            .map(|(_, path)| path)
            .ok_or_else(|| {
                Error::SnapshotNotFound(format!("{} as of {}", ticker, as_of))
            })
    }

    /// Load the newest snapshot of every ticker, in ticker order.
    pub fn load<S: AsRef<str>>(&self, tickers: &[S], as_of: NaiveDate) -> Result<Vec<PriceTable>> {
        tickers
            .iter()
            .map(|ticker| {
                let path = self.latest(ticker.as_ref(), as_of)?;
                read_price_table(path)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    #[test]
    fn test_parse_snapshot_name() {
        let name = SnapshotName::parse("SPY-20240628-1719600000123.csv").unwrap();
        assert_eq!(name.ticker, "SPY");
        assert_eq!(name.as_of, as_of());
        assert_eq!(name.fetched_at_millis, 1_719_600_000_123);
    }

    #[test]
    fn test_parse_hyphenated_ticker_and_fractional_seconds() {
        let name = SnapshotName::parse("BRK-B-20240628-1719600000.5.csv").unwrap();
        assert_eq!(name.ticker, "BRK-B");
        assert_eq!(name.fetched_at_millis, 1_719_600_000_500);
    }

    #[test]
    fn test_parse_integer_seconds() {
        let name = SnapshotName::parse("GLD-20240628-1719600000.csv").unwrap();
        assert_eq!(name.fetched_at_millis, 1_719_600_000_000);
    }

    #[test]
    fn test_parse_rejects_other_files() {
        assert!(SnapshotName::parse("tickers.txt").is_none());
        assert!(SnapshotName::parse("SPY.csv").is_none());
        assert!(SnapshotName::parse("-20240628-1719600000.csv").is_none());
        assert!(SnapshotName::parse("SPY-2024-06-28-1.csv").is_none());
        assert!(SnapshotName::parse("SPY-20240628-soon.csv").is_none());
    }

    #[test]
    fn test_file_name_roundtrip() {
        let name = SnapshotName::new("BRK-B", as_of(), 1_719_600_000_123);
        assert_eq!(name.file_name(), "BRK-B-20240628-1719600000123.csv");
        assert_eq!(SnapshotName::parse(&name.file_name()), Some(name.clone()));
        assert!(name.fetched_at().is_some());
    }

    #[test]
    fn test_latest_picks_newest_fetch() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let day_dir = store.dir_for(as_of());
        fs::create_dir_all(&day_dir).unwrap();

        for (millis, close) in [(1_000_000_000_000i64, "1.0"), (1_000_000_500_000, "2.0")] {
            let name = SnapshotName::new("SPY", as_of(), millis);
            let body = format!("Date,Close\n2024-06-27,{}\n", close);
            fs::write(day_dir.join(name.file_name()), body).unwrap();
        }
        fs::write(day_dir.join("notes.txt"), "ignore me").unwrap();

        assert_eq!(store.snapshots(as_of()).unwrap().len(), 2);

        let latest = store.latest("SPY", as_of()).unwrap();
        assert!(latest.ends_with("SPY-20240628-1000000500000.csv"));

        let tables = store.load(&["SPY"], as_of()).unwrap();
        assert_eq!(tables[0].column("Close").unwrap(), &[2.0]);
    }

    #[test]
    fn test_missing_ticker_and_directory() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());

        let result = store.latest("SPY", as_of());
        assert!(matches!(result, Err(Error::SnapshotNotFound(_))));

        fs::create_dir_all(store.dir_for(as_of())).unwrap();
        let result = store.load(&["QQQ"], as_of());
        assert!(matches!(result, Err(Error::SnapshotNotFound(_))));
    }
}
