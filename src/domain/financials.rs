//! Annual statement figures for one ticker.

use crate::domain::error::TurnscreenError;

/// Number of fiscal years the filter looks at.
pub const REQUIRED_YEARS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FiscalYear {
    pub year: i32,
    /// Total revenue in USD.
    pub revenue: f64,
    /// Net income in USD.
    pub net_income: f64,
    /// Cash from operating activities in USD, when the source reports it.
    pub operating_cash_flow: Option<f64>,
    pub total_debt: Option<f64>,
    pub stockholders_equity: Option<f64>,
}

impl FiscalYear {
    /// Total debt over stockholders' equity. `None` when either figure is
    /// missing or equity is zero.
    pub fn debt_to_equity(&self) -> Option<f64> {
        let (debt, equity) = (self.total_debt?, self.stockholders_equity?);
        if equity == 0.0 {
            return None;
        }
        let ratio = debt / equity;
        ratio.is_finite().then_some(ratio)
    }
}

/// Raw figures as returned by a data source. Years may arrive in any order and
/// any count; [`FinancialRecord::recent_window`] normalises them.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialRecord {
    pub ticker: String,
    pub years: Vec<FiscalYear>,
    /// Market capitalisation in USD.
    pub market_cap: f64,
}

/// The three most recent fiscal years, ascending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearWindow {
    pub years: [FiscalYear; REQUIRED_YEARS],
}

impl YearWindow {
    pub fn earliest(&self) -> &FiscalYear {
        &self.years[0]
    }

    pub fn latest(&self) -> &FiscalYear {
        &self.years[REQUIRED_YEARS - 1]
    }

    /// Number of compounding periods between earliest and latest.
    pub fn periods(&self) -> u32 {
        (REQUIRED_YEARS - 1) as u32
    }
}

impl FinancialRecord {
    pub fn new(ticker: impl Into<String>, years: Vec<FiscalYear>, market_cap: f64) -> Self {
        Self {
            ticker: ticker.into(),
            years,
            market_cap,
        }
    }

    /// Pick the three most recent fiscal years.
    ///
    /// Fails with `IncompleteHistory` when fewer than three years are present and
    /// with `MalformedData` on duplicate years, non-finite figures or an unusable
    /// market cap.
    pub fn recent_window(&self) -> Result<YearWindow, TurnscreenError> {
        if !self.market_cap.is_finite() || self.market_cap <= 0.0 {
            return Err(self.malformed(format!("market cap {} is not usable", self.market_cap)));
        }

        let mut years = self.years.clone();
        years.sort_by_key(|y| y.year);

        if let Some(pair) = years.windows(2).find(|w| w[0].year == w[1].year) {
            return Err(self.malformed(format!("fiscal year {} reported twice", pair[0].year)));
        }

        if years.len() < REQUIRED_YEARS {
            return Err(TurnscreenError::IncompleteHistory {
                ticker: self.ticker.clone(),
                years: years.len(),
                required: REQUIRED_YEARS,
            });
        }

        let recent = &years[years.len() - REQUIRED_YEARS..];
        if let Some(bad) = recent
            .iter()
            .find(|y| !y.revenue.is_finite() || !y.net_income.is_finite())
        {
            return Err(self.malformed(format!("non-numeric figures for fiscal year {}", bad.year)));
        }

        Ok(YearWindow {
            years: [recent[0], recent[1], recent[2]],
        })
    }

    fn malformed(&self, reason: String) -> TurnscreenError {
        TurnscreenError::MalformedData {
            ticker: self.ticker.clone(),
            reason,
        }
    }
}
