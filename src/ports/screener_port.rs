//! Screening source port trait.

use crate::domain::error::TurnscreenError;

pub trait ScreenerPort {
    /// Tickers whose multi-year sales growth exceeds `min_sales_growth_pct`.
    ///
    /// Any failure here is fatal for the run and must surface as
    /// `TurnscreenError::ScreenerUnavailable`.
    fn screen(&self, min_sales_growth_pct: u32) -> Result<Vec<String>, TurnscreenError>;
}
