//! Ticker universe handling.
//!
//! Parses explicit ticker lists, normalises screener output so every ticker is
//! unique within a run, and records why tickers were dropped.

use crate::domain::error::TurnscreenError;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),

    #[error("invalid ticker symbol: {0}")]
    InvalidTicker(String),
}

/// Upper-case letters, digits, `.` and `-`, starting with a letter or digit
/// (`BRK.B`, `BRK-B`). Tickers end up in file paths and URLs, so nothing else
/// is accepted.
pub fn is_valid_ticker(ticker: &str) -> bool {
    let mut chars = ticker.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
}

/// Parse a comma-separated ticker list. Strict: empty tokens and duplicates are errors.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !is_valid_ticker(&ticker) {
            return Err(UniverseError::InvalidTicker(ticker));
        }
        if !seen.insert(ticker.clone()) {
            return Err(UniverseError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Normalise screener output: trim, upper-case, drop blanks and invalid
/// symbols, keep the first of any duplicates.
pub fn normalize_tickers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let valid = is_valid_ticker(s);
            if !valid {
                warn!(ticker = %s, "dropping invalid ticker symbol");
            }
            valid
        })
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FetchFailed(String),
    Incomplete { years: usize },
    Malformed(String),
}

impl SkipReason {
    pub fn from_error(err: &TurnscreenError) -> Self {
        match err {
            TurnscreenError::IncompleteHistory { years, .. } => SkipReason::Incomplete { years: *years },
            TurnscreenError::MalformedData { reason, .. } => SkipReason::Malformed(reason.clone()),
            other => SkipReason::FetchFailed(other.to_string()),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed(reason) => write!(f, "fetch failed: {reason}"),
            SkipReason::Incomplete { years } => write!(f, "only {years} fiscal years"),
            SkipReason::Malformed(reason) => write!(f, "malformed data: {reason}"),
        }
    }
}
