//! Finviz screener export over HTTP.
//!
//! Requests `export.ashx` with a 5-year sales-growth filter plus any extra
//! filters (market-cap bands by default) and reads the `Ticker` column of the
//! CSV response.

use crate::adapters::ticker_file_adapter::tickers_from_export;
use crate::domain::config_validation::DEFAULT_TIMEOUT_SECS;
use crate::domain::error::TurnscreenError;
use crate::ports::config_port::ConfigPort;
use crate::ports::screener_port::ScreenerPort;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_EXPORT_URL: &str = "https://elite.finviz.com/export.ashx";
pub const DEFAULT_EXTRA_FILTERS: &str = "cap_smallover,cap_megaunder";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct FinvizAdapter {
    client: reqwest::blocking::Client,
    export_url: String,
    extra_filters: Vec<String>,
    auth_token: Option<String>,
}

impl FinvizAdapter {
    pub fn new(
        export_url: String,
        extra_filters: Vec<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TurnscreenError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TurnscreenError::ScreenerUnavailable {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            export_url,
            extra_filters,
            auth_token,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TurnscreenError> {
        let export_url = config
            .get_string("screener", "url")
            .unwrap_or_else(|| DEFAULT_EXPORT_URL.to_string());
        let extra_filters = config.get_list("screener", "filters").unwrap_or_else(|| {
            DEFAULT_EXTRA_FILTERS
                .split(',')
                .map(str::to_string)
                .collect()
        });
        let auth_token = config
            .get_string("screener", "auth_token")
            .filter(|t| !t.trim().is_empty());
        let timeout = config.get_int("screener", "timeout_secs", DEFAULT_TIMEOUT_SECS).max(1) as u64;

        Self::new(
            export_url,
            extra_filters,
            auth_token,
            Duration::from_secs(timeout),
        )
    }

    /// Filter expression, e.g. `fa_sales5years_o20,cap_smallover,cap_megaunder`.
    pub fn filter_expression(&self, min_sales_growth_pct: u32) -> String {
        std::iter::once(format!("fa_sales5years_o{}", min_sales_growth_pct))
            .chain(self.extra_filters.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn query(&self, min_sales_growth_pct: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("v", "111".to_string()),
            ("f", self.filter_expression(min_sales_growth_pct)),
        ];
        if let Some(token) = &self.auth_token {
            query.push(("auth", token.clone()));
        }
        query
    }
}

/// Interpret an export response body.
pub fn parse_export(body: &str) -> Result<Vec<String>, TurnscreenError> {
    tickers_from_export(body).ok_or_else(|| TurnscreenError::ScreenerUnavailable {
        reason: "response has no Ticker column (check the auth token)".to_string(),
    })
}

impl ScreenerPort for FinvizAdapter {
    fn screen(&self, min_sales_growth_pct: u32) -> Result<Vec<String>, TurnscreenError> {
        let unavailable = |reason: String| TurnscreenError::ScreenerUnavailable { reason };

        debug!(filters = %self.filter_expression(min_sales_growth_pct), "querying finviz");

        let response = self
            .client
            .get(&self.export_url)
            .query(&self.query(min_sales_growth_pct))
            .send()
            .map_err(|e| unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .map_err(|e| unavailable(format!("failed to read body: {}", e)))?;

        let tickers = parse_export(&body)?;
        info!(count = tickers.len(), "screener returned tickers");
        Ok(tickers)
    }
}
