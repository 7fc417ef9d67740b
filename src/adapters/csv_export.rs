//! CSV table export.

use crate::domain::candidate::{CandidateRow, TABLE_HEADER};
use crate::domain::error::TurnscreenError;
use crate::ports::export_port::TableExportPort;
use std::io::Write;

pub struct CsvExporter;

fn render_err(e: impl std::fmt::Display) -> TurnscreenError {
    TurnscreenError::Render {
        format: "csv".to_string(),
        reason: e.to_string(),
    }
}

impl TableExportPort for CsvExporter {
    fn format_name(&self) -> &'static str {
        "csv"
    }

    fn write_rows(&self, rows: &[CandidateRow], out: &mut dyn Write) -> Result<(), TurnscreenError> {
        let mut wtr = csv::Writer::from_writer(out);
        wtr.write_record(TABLE_HEADER).map_err(render_err)?;

        for row in rows {
            wtr.write_record([
                row.ticker.clone(),
                row.cagr.map(|c| c.to_string()).unwrap_or_default(),
                row.net_income.to_string(),
                row.market_cap.to_string(),
            ])
            .map_err(render_err)?;
        }

        wtr.flush().map_err(render_err)?;
        Ok(())
    }
}
