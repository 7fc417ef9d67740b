//! Fetch-then-filter pass over a ticker universe.

use crate::domain::candidate::{self, CandidateRow};
use crate::domain::thresholds::Thresholds;
use crate::domain::universe::{SkipReason, SkippedTicker};
use crate::ports::data_port::FinancialDataPort;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct ScreenOutcome {
    /// Rows passing every threshold, sorted by ticker.
    pub candidates: Vec<CandidateRow>,
    /// Tickers with complete data that failed at least one threshold.
    pub rejected: usize,
    pub skipped: Vec<SkippedTicker>,
}

impl ScreenOutcome {
    pub fn evaluated(&self) -> usize {
        self.candidates.len() + self.rejected
    }

    pub fn total(&self) -> usize {
        self.evaluated() + self.skipped.len()
    }
}

/// Evaluate every ticker in turn. A failure for one ticker is logged and
/// recorded in `skipped`; it never aborts the pass.
pub fn run_screen(
    data_port: &dyn FinancialDataPort,
    tickers: &[String],
    thresholds: &Thresholds,
) -> ScreenOutcome {
    let mut outcome = ScreenOutcome::default();

    for (i, ticker) in tickers.iter().enumerate() {
        debug!(ticker = %ticker, progress = i + 1, total = tickers.len(), "fetching financials");

        let row = data_port
            .fetch_financials(ticker)
            .and_then(|record| candidate::evaluate(&record, thresholds));

        match row {
            Ok(row) if row.passes() => {
                debug!(ticker = %ticker, cagr = ?row.cagr, "candidate accepted");
                outcome.candidates.push(row);
            }
            Ok(row) => {
                debug!(
                    ticker = %ticker,
                    cagr_ok = row.cagr_ok,
                    market_cap_ok = row.market_cap_ok,
                    turnaround_ok = row.turnaround_ok,
                    "candidate rejected"
                );
                outcome.rejected += 1;
            }
            Err(e) => {
                let reason = SkipReason::from_error(&e);
                warn!(ticker = %ticker, "skipping ticker: {reason}");
                outcome.skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason,
                });
            }
        }
    }

    outcome.candidates.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    info!(
        screened = outcome.total(),
        accepted = outcome.candidates.len(),
        rejected = outcome.rejected,
        skipped = outcome.skipped.len(),
        "screen complete"
    );

    outcome
}
