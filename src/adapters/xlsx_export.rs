//! XLSX workbook export.
//!
//! Sheet `candidates` mirrors the CSV table cell for cell. Sheet `financials`
//! carries the per-year figures behind each row, including cash flow and
//! leverage where the source reported them.

use crate::domain::candidate::{CandidateRow, TABLE_HEADER};
use crate::domain::error::TurnscreenError;
use crate::ports::export_port::TableExportPort;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::io::Write;

pub const CANDIDATES_SHEET: &str = "candidates";
pub const FINANCIALS_SHEET: &str = "financials";

const FINANCIALS_HEADER: [&str; 10] = [
    "ticker",
    "fiscal_year",
    "revenue",
    "net_income",
    "net_income_cagr",
    "sign_change",
    "operating_cash_flow",
    "total_debt",
    "stockholders_equity",
    "debt_to_equity",
];

pub struct XlsxExporter;

impl XlsxExporter {
    pub fn render(&self, rows: &[CandidateRow]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let money = Format::new().set_num_format("#,##0");

        let sheet = workbook.add_worksheet();
        sheet.set_name(CANDIDATES_SHEET)?;
        for (col, name) in TABLE_HEADER.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &bold)?;
        }
        for (i, row) in rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, row.ticker.as_str())?;
            if let Some(cagr) = row.cagr {
                sheet.write_number(r, 1, cagr)?;
            }
            sheet.write_number_with_format(r, 2, row.net_income, &money)?;
            sheet.write_number_with_format(r, 3, row.market_cap, &money)?;
        }
        sheet.set_freeze_panes(1, 0)?;

        let sheet = workbook.add_worksheet();
        sheet.set_name(FINANCIALS_SHEET)?;
        for (col, name) in FINANCIALS_HEADER.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &bold)?;
        }
        let mut r = 1u32;
        for row in rows {
            for year in &row.window.years {
                sheet.write_string(r, 0, row.ticker.as_str())?;
                sheet.write_number(r, 1, year.year)?;
                sheet.write_number_with_format(r, 2, year.revenue, &money)?;
                sheet.write_number_with_format(r, 3, year.net_income, &money)?;
                if let Some(ni_cagr) = row.net_income_cagr {
                    sheet.write_number(r, 4, ni_cagr)?;
                }
                sheet.write_boolean(r, 5, row.sign_change)?;
                for (col, value) in [
                    (6, year.operating_cash_flow),
                    (7, year.total_debt),
                    (8, year.stockholders_equity),
                ] {
                    if let Some(value) = value {
                        sheet.write_number_with_format(r, col, value, &money)?;
                    }
                }
                if let Some(ratio) = year.debt_to_equity() {
                    sheet.write_number(r, 9, ratio)?;
                }
                r += 1;
            }
        }
        sheet.set_freeze_panes(1, 0)?;

        workbook.save_to_buffer()
    }
}

impl TableExportPort for XlsxExporter {
    fn format_name(&self) -> &'static str {
        "xlsx"
    }

    fn write_rows(&self, rows: &[CandidateRow], out: &mut dyn Write) -> Result<(), TurnscreenError> {
        let bytes = self.render(rows).map_err(|e| TurnscreenError::Render {
            format: "xlsx".to_string(),
            reason: e.to_string(),
        })?;
        out.write_all(&bytes)?;
        Ok(())
    }
}
