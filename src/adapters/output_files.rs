//! All-or-nothing replacement of the output files.
//!
//! Every export is first rendered into a temp file in its destination
//! directory. Destinations are replaced (by rename) only after every render
//! succeeded. Each existing destination is moved aside before its rename, so a
//! failure part-way through the renames restores every file already replaced.

use crate::domain::candidate::CandidateRow;
use crate::domain::error::TurnscreenError;
use crate::ports::export_port::TableExportPort;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile, TempPath};
use tracing::{debug, info, warn};

pub struct ExportTarget<'a> {
    pub exporter: &'a dyn TableExportPort,
    pub path: PathBuf,
}

fn destination_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn export_err(path: &Path, e: impl std::fmt::Display) -> TurnscreenError {
    TurnscreenError::Export {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Render `rows` to every target and replace the destinations together.
/// Returns the written paths in target order.
pub fn publish(rows: &[CandidateRow], targets: &[ExportTarget<'_>]) -> Result<Vec<PathBuf>, TurnscreenError> {
    let mut staged = Vec::with_capacity(targets.len());

    for target in targets {
        let dir = destination_dir(&target.path);
        fs::create_dir_all(&dir).map_err(|e| export_err(&target.path, e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| export_err(&target.path, e))?;
        target.exporter.write_rows(rows, &mut tmp)?;
        tmp.flush().map_err(|e| export_err(&target.path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| export_err(&target.path, e))?;

        debug!(
            format = target.exporter.format_name(),
            path = %target.path.display(),
            "staged output"
        );
        staged.push((tmp, &target.path));
    }

    let mut replaced: Vec<(&Path, Option<TempPath>)> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        let backup = match move_aside(path) {
            Ok(backup) => backup,
            Err(e) => {
                roll_back(replaced);
                return Err(export_err(path, e));
            }
        };

        if let Err(e) = tmp.persist(path) {
            if let Some(backup) = backup {
                restore(path, backup);
            }
            roll_back(replaced);
            return Err(export_err(path, e.error));
        }
        replaced.push((path.as_path(), backup));
    }

    let written: Vec<PathBuf> = replaced.iter().map(|(path, _)| path.to_path_buf()).collect();
    for path in &written {
        info!(path = %path.display(), rows = rows.len(), "wrote output");
    }
    Ok(written)
}

/// Rename an existing destination file to a hidden backup beside it. The
/// backup is deleted when the returned path is dropped.
fn move_aside(path: &Path) -> std::io::Result<Option<TempPath>> {
    if !path.is_file() {
        return Ok(None);
    }
    let backup = Builder::new()
        .prefix(".turnscreen-")
        .suffix(".bak")
        .tempfile_in(destination_dir(path))?
        .into_temp_path();
    fs::rename(path, &backup)?;
    Ok(Some(backup))
}

fn restore(path: &Path, backup: TempPath) {
    if let Err(e) = backup.persist(path) {
        warn!(path = %path.display(), error = %e.error, "failed to restore previous output");
    }
}

/// Undo completed replacements, newest first.
fn roll_back(replaced: Vec<(&Path, Option<TempPath>)>) {
    for (path, backup) in replaced.into_iter().rev() {
        match backup {
            Some(backup) => restore(path, backup),
            None => {
                if let Err(e) = fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove new output");
                }
            }
        }
    }
}
