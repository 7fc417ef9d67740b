//! Financial data access port trait.

use crate::domain::error::TurnscreenError;
use crate::domain::financials::FinancialRecord;

pub trait FinancialDataPort {
    /// Fetch annual revenue, net income and current market cap for one ticker.
    ///
    /// Implementations return whatever years the source has; completeness is
    /// judged by the domain.
    fn fetch_financials(&self, ticker: &str) -> Result<FinancialRecord, TurnscreenError>;
}
