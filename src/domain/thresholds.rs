//! Inclusion thresholds for the turnaround filter.

/// Slack applied to the CAGR floor so that a series compounding at exactly the
/// floor is not rejected by floating-point rounding.
pub const CAGR_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Minimum 3-year revenue CAGR as a fraction (0.20 = 20%).
    pub min_revenue_cagr: f64,
    /// Inclusive lower market-cap bound in USD.
    pub min_market_cap: f64,
    /// Inclusive upper market-cap bound in USD.
    pub max_market_cap: f64,
    /// Largest net loss in USD still counted as near break-even.
    pub max_breakeven_loss: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_revenue_cagr: 0.20,
            min_market_cap: 100_000_000.0,
            max_market_cap: 100_000_000_000.0,
            max_breakeven_loss: 20_000_000.0,
        }
    }
}

impl Thresholds {
    pub fn cagr_passes(&self, cagr: Option<f64>) -> bool {
        cagr.is_some_and(|c| c >= self.min_revenue_cagr - CAGR_TOLERANCE)
    }

    pub fn market_cap_passes(&self, market_cap: f64) -> bool {
        market_cap >= self.min_market_cap && market_cap <= self.max_market_cap
    }

    /// Profitable, or losing no more than `max_breakeven_loss`.
    pub fn turnaround_passes(&self, latest_net_income: f64) -> bool {
        latest_net_income > 0.0 || latest_net_income.abs() <= self.max_breakeven_loss
    }
}
