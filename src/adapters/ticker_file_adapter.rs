//! Saved screener results on disk.
//!
//! Accepts a Finviz-style export (CSV with a `Ticker` column) or a plain list
//! with one ticker per line.

use crate::domain::error::TurnscreenError;
use crate::domain::universe::normalize_tickers;
use crate::ports::screener_port::ScreenerPort;
use std::fs;
use std::path::PathBuf;

/// Pull the `Ticker` column out of a CSV export. `None` when the header has no
/// such column (e.g. a login page served instead of the export).
pub fn tickers_from_export(content: &str) -> Option<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());

    let column = rdr
        .headers()
        .ok()?
        .iter()
        .position(|h| h.trim().trim_matches('"').eq_ignore_ascii_case("ticker"))?;

    let tickers = rdr
        .records()
        .filter_map(Result::ok)
        .filter_map(|record| record.get(column).map(str::to_string));

    Some(normalize_tickers(tickers))
}

pub struct TickerFileAdapter {
    path: PathBuf,
}

impl TickerFileAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ScreenerPort for TickerFileAdapter {
    fn screen(&self, _min_sales_growth_pct: u32) -> Result<Vec<String>, TurnscreenError> {
        let content = fs::read_to_string(&self.path).map_err(|e| TurnscreenError::ScreenerUnavailable {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let tickers = tickers_from_export(&content).unwrap_or_else(|| {
            normalize_tickers(
                content
                    .lines()
                    .map(|line| line.split(',').next().unwrap_or_default()),
            )
        });

        if tickers.is_empty() {
            return Err(TurnscreenError::ScreenerUnavailable {
                reason: format!("no tickers in {}", self.path.display()),
            });
        }
        Ok(tickers)
    }
}
