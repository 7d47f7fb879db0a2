//! Runtime configuration for loading snapshots.

use crate::ingest::SnapshotStore;
use std::env;
use std::path::PathBuf;

/// Environment variable overriding the snapshot root directory.
pub const DATA_DIR_ENV: &str = "ALCHEMY_DATA_DIR";

/// Environment variable overriding the price column.
pub const PRICE_FIELD_ENV: &str = "ALCHEMY_PRICE_FIELD";

/// Price column used when none is configured.
pub const DEFAULT_PRICE_FIELD: &str = "Adj Close";

/// Where snapshots live and which price column to profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root of the `<yyyymmdd>/<ticker>-...csv` snapshot tree
    pub data_dir: PathBuf,
    /// Column taken from every snapshot
    pub price_field: String,
}

impl Config {
    /// Configuration from `ALCHEMY_DATA_DIR` and `ALCHEMY_PRICE_FIELD`, with defaults.
    pub fn from_env() -> Self {
        Self::resolve(env::var(DATA_DIR_ENV).ok(), env::var(PRICE_FIELD_ENV).ok())
    }

    /// Configuration from optional overrides, falling back to defaults.
    pub fn resolve(data_dir: Option<String>, price_field: Option<String>) -> Self {
        Self {
            data_dir: data_dir
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(Self::default_data_dir),
            price_field: price_field
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_PRICE_FIELD.to_string()),
        }
    }

    /// Default snapshot root: `~/.alchemy/market-data`.
    pub fn default_data_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".alchemy/market-data"))
            .unwrap_or_else(|| PathBuf::from("market-data"))
    }

    /// Replace the snapshot root.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Replace the price column.
    pub fn with_price_field(mut self, price_field: impl Into<String>) -> Self {
        self.price_field = price_field.into();
        self
    }

    /// Snapshot store over `data_dir`.
    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(self.data_dir.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
