//! CSV directory data adapter.
//!
//! One file per ticker, `{TICKER}.csv`, with header
//! `fiscal_year,revenue,net_income,market_cap` and optionally
//! `operating_cash_flow`, `total_debt` and `stockholders_equity` (looked up by
//! name, blank cells allowed). Market cap is read from the most recent
//! fiscal-year row. Also acts as an offline screener listing every
//! ticker in the directory.

use crate::domain::error::TurnscreenError;
use crate::domain::financials::{FinancialRecord, FiscalYear};
use crate::domain::universe::is_valid_ticker;
use crate::ports::data_port::FinancialDataPort;
use crate::ports::screener_port::ScreenerPort;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    ticker: &str,
) -> Result<T, TurnscreenError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| TurnscreenError::MalformedData {
        ticker: ticker.to_string(),
        reason: format!("missing {} column", name),
    })?;
    raw.trim().parse().map_err(|e| TurnscreenError::MalformedData {
        ticker: ticker.to_string(),
        reason: format!("invalid {} value '{}': {}", name, raw, e),
    })
}

fn parse_optional(
    record: &csv::StringRecord,
    index: Option<usize>,
    name: &str,
    ticker: &str,
) -> Result<Option<f64>, TurnscreenError> {
    let Some(i) = index else {
        return Ok(None);
    };
    match record.get(i).map(str::trim) {
        None | Some("") => Ok(None),
        Some(_) => parse_field(record, i, name, ticker).map(Some),
    }
}

impl FinancialDataPort for CsvAdapter {
    fn fetch_financials(&self, ticker: &str) -> Result<FinancialRecord, TurnscreenError> {
        if !is_valid_ticker(ticker) {
            return Err(TurnscreenError::Fetch {
                ticker: ticker.to_string(),
                reason: "not a valid ticker symbol".to_string(),
            });
        }
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| TurnscreenError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().cloned().map_err(|e| TurnscreenError::MalformedData {
            ticker: ticker.to_string(),
            reason: format!("CSV header error: {}", e),
        })?;
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let ocf_col = column("operating_cash_flow");
        let debt_col = column("total_debt");
        let equity_col = column("stockholders_equity");

        let mut years = Vec::new();
        let mut latest_cap: Option<(i32, f64)> = None;

        for result in rdr.records() {
            let record = result.map_err(|e| TurnscreenError::MalformedData {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let year: i32 = parse_field(&record, 0, "fiscal_year", ticker)?;
            let revenue: f64 = parse_field(&record, 1, "revenue", ticker)?;
            let net_income: f64 = parse_field(&record, 2, "net_income", ticker)?;
            let market_cap: f64 = parse_field(&record, 3, "market_cap", ticker)?;

            if latest_cap.is_none_or(|(y, _)| year > y) {
                latest_cap = Some((year, market_cap));
            }

            years.push(FiscalYear {
                year,
                revenue,
                net_income,
                operating_cash_flow: parse_optional(&record, ocf_col, "operating_cash_flow", ticker)?,
                total_debt: parse_optional(&record, debt_col, "total_debt", ticker)?,
                stockholders_equity: parse_optional(&record, equity_col, "stockholders_equity", ticker)?,
            });
        }

        let (_, market_cap) = latest_cap.ok_or_else(|| TurnscreenError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("no rows in {}", path.display()),
        })?;

        years.sort_by_key(|y| y.year);
        Ok(FinancialRecord::new(ticker, years, market_cap))
    }
}

impl ScreenerPort for CsvAdapter {
    /// Lists every ticker with a data file; the growth threshold is left to
    /// whoever assembled the directory.
    fn screen(&self, _min_sales_growth_pct: u32) -> Result<Vec<String>, TurnscreenError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| TurnscreenError::ScreenerUnavailable {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| TurnscreenError::ScreenerUnavailable {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(ticker) = name_str.strip_suffix(".csv") {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}
