//! Yahoo Finance fundamentals-timeseries adapter.
//!
//! One request per ticker returns annual total revenue, net income, operating
//! cash flow, total debt and stockholders' equity plus the trailing market cap
//! series.

use crate::domain::config_validation::{DEFAULT_LOOKBACK_YEARS, DEFAULT_TIMEOUT_SECS};
use crate::domain::error::TurnscreenError;
use crate::domain::financials::{FinancialRecord, FiscalYear};
use crate::domain::universe::is_valid_ticker;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::FinancialDataPort;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::cell::Cell;
use std::time::{Duration, Instant};
use tracing::trace;

pub const DEFAULT_TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

const REVENUE_SERIES: &str = "annualTotalRevenue";
const NET_INCOME_SERIES: &str = "annualNetIncome";
const MARKET_CAP_SERIES: &str = "trailingMarketCap";
const OPERATING_CASH_FLOW_SERIES: &str = "annualOperatingCashFlow";
const TOTAL_DEBT_SERIES: &str = "annualTotalDebt";
const EQUITY_SERIES: &str = "annualStockholdersEquity";

const REQUESTED_SERIES: [&str; 6] = [
    REVENUE_SERIES,
    NET_INCOME_SERIES,
    MARKET_CAP_SERIES,
    OPERATING_CASH_FLOW_SERIES,
    TOTAL_DEBT_SERIES,
    EQUITY_SERIES,
];

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesBody,
}

#[derive(Debug, Deserialize)]
struct TimeseriesBody {
    #[serde(default)]
    result: Option<Vec<SeriesResult>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SeriesResult {
    meta: SeriesMeta,
    #[serde(flatten)]
    series: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SeriesMeta {
    #[serde(rename = "type", default)]
    kind: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataPoint {
    as_of_date: String,
    #[serde(default)]
    reported_value: Option<ReportedValue>,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: f64,
}

pub struct YahooAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    lookback_years: i64,
    request_delay: Duration,
    last_request: Cell<Option<Instant>>,
}

impl YahooAdapter {
    pub fn new(
        base_url: String,
        lookback_years: i64,
        timeout: Duration,
        request_delay: Duration,
    ) -> Result<Self, TurnscreenError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TurnscreenError::ConfigInvalid {
                section: "financials".into(),
                key: "url".into(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            lookback_years,
            request_delay,
            last_request: Cell::new(None),
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TurnscreenError> {
        let base_url = config
            .get_string("financials", "url")
            .unwrap_or_else(|| DEFAULT_TIMESERIES_URL.to_string());
        let lookback = config.get_int("financials", "lookback_years", DEFAULT_LOOKBACK_YEARS);
        let timeout = config.get_int("financials", "timeout_secs", DEFAULT_TIMEOUT_SECS).max(1) as u64;
        let delay = config.get_int("financials", "request_delay_ms", 0).max(0) as u64;

        Self::new(
            base_url,
            lookback,
            Duration::from_secs(timeout),
            Duration::from_millis(delay),
        )
    }

    /// Keep at least `request_delay` between consecutive requests, whether or
    /// not the previous one succeeded.
    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let since = last.elapsed();
            if since < self.request_delay {
                std::thread::sleep(self.request_delay - since);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    fn url(&self, ticker: &str) -> String {
        let now = Utc::now();
        let (period1, period2) = request_window(now.date_naive(), self.lookback_years, now.timestamp());
        format!(
            "{}/{}?symbol={}&type={}&period1={}&period2={}",
            self.base_url.trim_end_matches('/'),
            ticker,
            ticker,
            REQUESTED_SERIES.join(","),
            period1,
            period2
        )
    }
}

/// `(period1, period2)` in epoch seconds. `period1` is January 1st of
/// `today.year() - lookback_years`, so every fiscal year ending inside the
/// lookback is covered whatever month the filer closes its books.
fn request_window(today: NaiveDate, lookback_years: i64, now_ts: i64) -> (i64, i64) {
    let start_year = i64::from(today.year()) - lookback_years;
    let period1 = i32::try_from(start_year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0);
    (period1, now_ts)
}

/// Points of one series keyed by as-of date; points without a reported value are dropped.
fn series_points(
    ticker: &str,
    result: &SeriesResult,
    name: &str,
) -> Result<BTreeMap<NaiveDate, f64>, TurnscreenError> {
    let Some(raw) = result.series.get(name) else {
        return Ok(BTreeMap::new());
    };

    let points: Vec<Option<DataPoint>> =
        serde_json::from_value(raw.clone()).map_err(|e| TurnscreenError::MalformedData {
            ticker: ticker.to_string(),
            reason: format!("bad {} series: {}", name, e),
        })?;

    let mut out = BTreeMap::new();
    for point in points.into_iter().flatten() {
        let Some(value) = point.reported_value else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&point.as_of_date, "%Y-%m-%d").map_err(|_| {
            TurnscreenError::MalformedData {
                ticker: ticker.to_string(),
                reason: format!("invalid asOfDate '{}'", point.as_of_date),
            }
        })?;
        out.insert(date, value.raw);
    }
    Ok(out)
}

/// Turn a timeseries response body into a record. Years appear only where both
/// revenue and net income were reported for the same fiscal year end.
pub fn parse_timeseries(ticker: &str, body: &str) -> Result<FinancialRecord, TurnscreenError> {
    let response: TimeseriesResponse =
        serde_json::from_str(body).map_err(|e| TurnscreenError::MalformedData {
            ticker: ticker.to_string(),
            reason: format!("invalid JSON: {}", e),
        })?;

    if let Some(err) = response.timeseries.error.filter(|e| !e.is_null()) {
        return Err(TurnscreenError::Fetch {
            ticker: ticker.to_string(),
            reason: format!("API error: {}", err),
        });
    }

    let mut revenue = BTreeMap::new();
    let mut net_income = BTreeMap::new();
    let mut market_cap = BTreeMap::new();
    let mut operating_cash_flow = BTreeMap::new();
    let mut total_debt = BTreeMap::new();
    let mut equity = BTreeMap::new();

    for result in response.timeseries.result.unwrap_or_default() {
        for kind in &result.meta.kind {
            let target = match kind.as_str() {
                REVENUE_SERIES => &mut revenue,
                NET_INCOME_SERIES => &mut net_income,
                MARKET_CAP_SERIES => &mut market_cap,
                OPERATING_CASH_FLOW_SERIES => &mut operating_cash_flow,
                TOTAL_DEBT_SERIES => &mut total_debt,
                EQUITY_SERIES => &mut equity,
                _ => continue,
            };
            target.extend(series_points(ticker, &result, kind)?);
        }
    }

    let (_, cap) = market_cap
        .last_key_value()
        .ok_or_else(|| TurnscreenError::MalformedData {
            ticker: ticker.to_string(),
            reason: "no market cap reported".to_string(),
        })?;

    let years = revenue
        .iter()
        .filter_map(|(date, rev)| {
            net_income.get(date).map(|ni| FiscalYear {
                year: date.year(),
                revenue: *rev,
                net_income: *ni,
                operating_cash_flow: operating_cash_flow.get(date).copied(),
                total_debt: total_debt.get(date).copied(),
                stockholders_equity: equity.get(date).copied(),
            })
        })
        .collect();

    Ok(FinancialRecord::new(ticker, years, *cap))
}

impl FinancialDataPort for YahooAdapter {
    fn fetch_financials(&self, ticker: &str) -> Result<FinancialRecord, TurnscreenError> {
        let fetch_err = |reason: String| TurnscreenError::Fetch {
            ticker: ticker.to_string(),
            reason,
        };

        if !is_valid_ticker(ticker) {
            return Err(fetch_err("not a valid ticker symbol".to_string()));
        }

        let url = self.url(ticker);
        self.throttle();
        trace!(%url, "requesting timeseries");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| fetch_err(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| fetch_err(format!("failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status)));
        }

        parse_timeseries(ticker, &body)
    }
}
