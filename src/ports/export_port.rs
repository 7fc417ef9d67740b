//! Tabular export port trait.

use crate::domain::candidate::CandidateRow;
use crate::domain::error::TurnscreenError;
use std::io::Write;

/// Renders surviving candidates into one file format.
pub trait TableExportPort {
    /// Short format name used in logs.
    fn format_name(&self) -> &'static str;

    fn write_rows(&self, rows: &[CandidateRow], out: &mut dyn Write) -> Result<(), TurnscreenError>;
}
