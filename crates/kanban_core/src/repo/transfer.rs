//! Export artifact writing.
//!
//! The artifact is pretty-printed JSON named `kanban-board-YYYY-MM-DD.json`
//! after the export date. Import decoding lives in [`super::payload`].

use super::payload::BoardExport;
use crate::model::column::Column;
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Errors from producing an export artifact.
#[derive(Debug)]
pub enum ExportError {
    Encode(serde_json::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode export: {err}"),
            Self::Io(err) => write!(f, "failed to write export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// File name for an export taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("kanban-board-{}.json", date.format("%Y-%m-%d"))
}

/// Serializes the export artifact as pretty JSON.
pub fn encode_export(columns: &[Column], exported_at: DateTime<Utc>) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&BoardExport::new(
        columns,
        exported_at,
    ))?)
}

/// Writes the export artifact into `dir` and returns its path.
pub fn write_export(
    dir: &Path,
    columns: &[Column],
    exported_at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(exported_at.date_naive()));
    let result = encode_export(columns, exported_at)
        .and_then(|json| std::fs::write(&path, json).map_err(ExportError::from));
    match result {
        Ok(()) => {
            info!(
                "event=board_export module=persist status=ok columns={} path={}",
                columns.len(),
                path.display()
            );
            Ok(path)
        }
        Err(err) => {
            error!("event=board_export module=persist status=error error={err}");
            Err(err)
        }
    }
}
