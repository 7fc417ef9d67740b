#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use turnscreen::domain::error::TurnscreenError;
pub use turnscreen::domain::financials::{FinancialRecord, FiscalYear};
use turnscreen::domain::thresholds::Thresholds;
use turnscreen::ports::data_port::FinancialDataPort;
use turnscreen::ports::screener_port::ScreenerPort;

pub struct MockScreener {
    pub tickers: Vec<String>,
    pub failure: Option<String>,
}

impl MockScreener {
    pub fn new(tickers: &[&str]) -> Self {
        Self {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            failure: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            tickers: Vec::new(),
            failure: Some(reason.to_string()),
        }
    }
}

impl ScreenerPort for MockScreener {
    fn screen(&self, _min_sales_growth_pct: u32) -> Result<Vec<String>, TurnscreenError> {
        match &self.failure {
            Some(reason) => Err(TurnscreenError::ScreenerUnavailable {
                reason: reason.clone(),
            }),
            None => Ok(self.tickers.clone()),
        }
    }
}

pub struct MockDataPort {
    pub records: HashMap<String, FinancialRecord>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_record(mut self, record: FinancialRecord) -> Self {
        self.records.insert(record.ticker.clone(), record);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl FinancialDataPort for MockDataPort {
    fn fetch_financials(&self, ticker: &str) -> Result<FinancialRecord, TurnscreenError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TurnscreenError::Fetch {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        self.records
            .get(ticker)
            .cloned()
            .ok_or_else(|| TurnscreenError::Fetch {
                ticker: ticker.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })
    }
}

/// Record with consecutive fiscal years ending in 2024.
pub fn make_record(ticker: &str, revenues: &[f64], incomes: &[f64], market_cap: f64) -> FinancialRecord {
    let first_year = 2025 - revenues.len() as i32;
    let years = revenues
        .iter()
        .zip(incomes)
        .enumerate()
        .map(|(i, (&revenue, &net_income))| FiscalYear {
            year: first_year + i as i32,
            revenue,
            net_income,
            ..Default::default()
        })
        .collect();
    FinancialRecord::new(ticker, years, market_cap)
}

/// Passes every default threshold: 50% CAGR, loss to profit, $2.5B cap.
pub fn passing_record(ticker: &str) -> FinancialRecord {
    make_record(
        ticker,
        &[100_000_000.0, 150_000_000.0, 225_000_000.0],
        &[-30_000_000.0, -5_000_000.0, 12_000_000.0],
        2_500_000_000.0,
    )
}

pub fn default_thresholds() -> Thresholds {
    Thresholds::default()
}

/// Write `{TICKER}.csv` in the layout read by `CsvAdapter`.
pub fn write_financials_csv(dir: &Path, record: &FinancialRecord) {
    let mut content = String::from("fiscal_year,revenue,net_income,market_cap\n");
    for year in &record.years {
        content.push_str(&format!(
            "{},{},{},{}\n",
            year.year, year.revenue, year.net_income, record.market_cap
        ));
    }
    fs::write(dir.join(format!("{}.csv", record.ticker)), content).unwrap();
}

/// Read the data rows of an exported CSV as `(ticker, cagr, net_income, market_cap)`.
pub fn read_output_csv(path: &Path) -> Vec<(String, f64, f64, f64)> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records()
        .map(|r| {
            let r = r.unwrap();
            (
                r[0].to_string(),
                r[1].parse().unwrap(),
                r[2].parse().unwrap(),
                r[3].parse().unwrap(),
            )
        })
        .collect()
}
