//! Derived metrics and the turnaround inclusion test.

use crate::domain::error::TurnscreenError;
use crate::domain::financials::{FinancialRecord, YearWindow};
use crate::domain::thresholds::Thresholds;

/// Column header shared by every tabular export.
pub const TABLE_HEADER: [&str; 4] = ["ticker", "cagr", "net_income", "market_cap"];

/// `(end / start)^(1 / periods) - 1`, or `None` where growth is undefined
/// (non-positive start, zero periods, or a non-finite result).
pub fn compound_growth(start: f64, end: f64, periods: u32) -> Option<f64> {
    if periods == 0 || start <= 0.0 || !start.is_finite() || !end.is_finite() {
        return None;
    }
    let growth = (end / start).powf(1.0 / f64::from(periods)) - 1.0;
    growth.is_finite().then_some(growth)
}

/// Revenue CAGR across the window.
pub fn revenue_cagr(window: &YearWindow) -> Option<f64> {
    compound_growth(
        window.earliest().revenue,
        window.latest().revenue,
        window.periods(),
    )
}

/// Growth of the magnitude of net income; `None` when the earliest year is exactly zero.
pub fn net_income_cagr(window: &YearWindow) -> Option<f64> {
    let earliest = window.earliest().net_income;
    if earliest == 0.0 {
        return None;
    }
    compound_growth(
        earliest.abs(),
        window.latest().net_income.abs(),
        window.periods(),
    )
}

/// Loss in the earliest year, profit in the latest.
pub fn sign_change(window: &YearWindow) -> bool {
    window.earliest().net_income < 0.0 && window.latest().net_income > 0.0
}

/// One evaluated ticker, with a verdict per threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub ticker: String,
    pub window: YearWindow,
    pub cagr: Option<f64>,
    pub net_income: f64,
    pub market_cap: f64,
    pub net_income_cagr: Option<f64>,
    pub sign_change: bool,
    pub cagr_ok: bool,
    pub market_cap_ok: bool,
    pub turnaround_ok: bool,
}

impl CandidateRow {
    pub fn passes(&self) -> bool {
        self.cagr_ok && self.market_cap_ok && self.turnaround_ok
    }
}

/// Derive a row from a record. Errors only when the record lacks three usable
/// years; failing a threshold yields `Ok` with `passes() == false`.
pub fn evaluate(
    record: &FinancialRecord,
    thresholds: &Thresholds,
) -> Result<CandidateRow, TurnscreenError> {
    let window = record.recent_window()?;
    let cagr = revenue_cagr(&window);
    let net_income = window.latest().net_income;

    Ok(CandidateRow {
        ticker: record.ticker.clone(),
        cagr,
        net_income,
        market_cap: record.market_cap,
        net_income_cagr: net_income_cagr(&window),
        sign_change: sign_change(&window),
        cagr_ok: thresholds.cagr_passes(cagr),
        market_cap_ok: thresholds.market_cap_passes(record.market_cap),
        turnaround_ok: thresholds.turnaround_passes(net_income),
        window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::financials::FiscalYear;
    use approx::assert_relative_eq;

    fn record(revenues: [f64; 3], incomes: [f64; 3], market_cap: f64) -> FinancialRecord {
        let years = (0..3)
            .map(|i| FiscalYear {
                year: 2022 + i as i32,
                revenue: revenues[i],
                net_income: incomes[i],
                ..Default::default()
            })
            .collect();
        FinancialRecord::new("ACME", years, market_cap)
    }

    #[test]
    fn compound_growth_two_periods() {
        assert_relative_eq!(compound_growth(100.0, 144.0, 2).unwrap(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(compound_growth(100.0, 100.0, 2).unwrap(), 0.0);
        assert_relative_eq!(compound_growth(100.0, 25.0, 2).unwrap(), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn compound_growth_undefined_cases() {
        assert_eq!(compound_growth(0.0, 144.0, 2), None);
        assert_eq!(compound_growth(-10.0, 144.0, 2), None);
        assert_eq!(compound_growth(100.0, -44.0, 2), None);
        assert_eq!(compound_growth(100.0, 144.0, 0), None);
    }

    #[test]
    fn exact_twenty_percent_series_is_included() {
        let row = evaluate(&record([100.0, 140.0, 144.0], [1.0; 3], 1e9), &Thresholds::default())
            .unwrap();
        assert_relative_eq!(row.cagr.unwrap(), 0.2, epsilon = 1e-12);
        assert!(row.passes());
    }

    #[test]
    fn slow_growth_is_excluded() {
        let row = evaluate(&record([100.0, 110.0, 121.0], [1.0; 3], 1e9), &Thresholds::default())
            .unwrap();
        assert!(!row.cagr_ok);
        assert!(!row.passes());
    }

    #[test]
    fn zero_earliest_revenue_is_excluded_not_an_error() {
        let row = evaluate(&record([0.0, 50.0, 100.0], [1.0; 3], 1e9), &Thresholds::default())
            .unwrap();
        assert_eq!(row.cagr, None);
        assert!(!row.passes());
    }

    #[test]
    fn negative_earliest_revenue_is_excluded() {
        let row = evaluate(&record([-5.0, 50.0, 100.0], [1.0; 3], 1e9), &Thresholds::default())
            .unwrap();
        assert_eq!(row.cagr, None);
        assert!(!row.cagr_ok);
    }

    #[test]
    fn market_cap_boundaries_included() {
        let t = Thresholds::default();
        for cap in [100_000_000.0, 100_000_000_000.0] {
            let row = evaluate(&record([100.0, 150.0, 200.0], [1.0; 3], cap), &t).unwrap();
            assert!(row.market_cap_ok, "cap {cap} should pass");
            assert!(row.passes());
        }
        let row = evaluate(&record([100.0, 150.0, 200.0], [1.0; 3], 5e7), &t).unwrap();
        assert!(!row.market_cap_ok);
    }

    #[test]
    fn near_breakeven_loss_included() {
        let t = Thresholds::default();
        let row = evaluate(&record([100.0, 150.0, 200.0], [-90e6, -40e6, -15e6], 1e9), &t).unwrap();
        assert!(row.turnaround_ok);
        assert!(row.passes());

        let row = evaluate(&record([100.0, 150.0, 200.0], [-90e6, -40e6, -25e6], 1e9), &t).unwrap();
        assert!(!row.turnaround_ok);
        assert!(!row.passes());
    }

    #[test]
    fn supplementary_metrics() {
        let row = evaluate(
            &record([100.0, 150.0, 200.0], [-4e6, 1e6, 9e6], 1e9),
            &Thresholds::default(),
        )
        .unwrap();
        assert!(row.sign_change);
        assert_relative_eq!(row.net_income_cagr.unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(row.net_income, 9e6);

        let row = evaluate(
            &record([100.0, 150.0, 200.0], [0.0, 1e6, 9e6], 1e9),
            &Thresholds::default(),
        )
        .unwrap();
        assert!(!row.sign_change);
        assert_eq!(row.net_income_cagr, None);
    }

    #[test]
    fn incomplete_record_is_an_error() {
        let rec = FinancialRecord::new(
            "ACME",
            vec![FiscalYear {
                year: 2024,
                revenue: 1.0,
                net_income: 1.0,
                ..Default::default()
            }],
            1e9,
        );
        assert!(matches!(
            evaluate(&rec, &Thresholds::default()),
            Err(TurnscreenError::IncompleteHistory { years: 1, .. })
        ));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn cagr_is_deterministic_and_matches_formula(
                r0 in 1.0f64..1e12,
                r1 in 1.0f64..1e12,
                r2 in 1.0f64..1e12,
            ) {
                let rec = record([r0, r1, r2], [1.0; 3], 1e9);
                let a = evaluate(&rec, &Thresholds::default()).unwrap();
                let b = evaluate(&rec, &Thresholds::default()).unwrap();
                let expected = (r2 / r0).powf(0.5) - 1.0;
                prop_assert_eq!(a.cagr, b.cagr);
                prop_assert!((a.cagr.unwrap() - expected).abs() <= 1e-12 * (1.0 + expected.abs()));
            }

            #[test]
            fn cagr_below_floor_never_passes(
                r0 in 1.0f64..1e12,
                growth in -0.99f64..0.1999,
                cap in 1e8f64..1e11,
            ) {
                let r2 = r0 * (1.0 + growth).powi(2);
                let rec = record([r0, r0, r2], [5.0; 3], cap);
                let row = evaluate(&rec, &Thresholds::default()).unwrap();
                prop_assert!(!row.passes());
            }
        }
    }
}
