//! Ticker list files.
//!
//! One ticker per line; `#` starts a comment and blank lines are ignored:
//!
//! ```text
//! SPY # S&P500 ETF
//!
//! VOO # S&P500 ETF
//! # IWW
//! GLD
//! ```

use crate::Result;
use std::path::Path;

/// Extract tickers from ticker-list text.
pub fn parse_tickers(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let token = line.split('#').next().unwrap_or("").trim();
            (!token.is_empty()).then(|| token.to_string())
        })
        .collect()
}

/// Read and parse a ticker-list file.
pub fn read_tickers(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_tickers(&content))
}
