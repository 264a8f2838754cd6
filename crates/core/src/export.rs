//! Winner list export

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::models::WinRecord;

/// One exported winner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub time: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub prize: String,
    pub caption: String,
}

impl From<&WinRecord> for ExportRow {
    fn from(record: &WinRecord) -> Self {
        Self {
            time: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            name: record.candidate.name.clone(),
            email: record.candidate.email.clone(),
            department: record.candidate.department.clone().unwrap_or_default(),
            prize: record.prize.name.clone(),
            caption: record.caption.clone().unwrap_or_default(),
        }
    }
}

/// Rows in record order
pub fn export_rows<'a>(records: impl IntoIterator<Item = &'a WinRecord>) -> Vec<ExportRow> {
    records.into_iter().map(ExportRow::from).collect()
}

/// Pretty JSON array of export rows
pub fn to_json<'a>(records: impl IntoIterator<Item = &'a WinRecord>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_rows(records))?)
}

/// Write `winners-<timestamp>.json` into `dir`, creating it if needed
pub fn write_export<'a>(
    dir: &Path,
    records: impl IntoIterator<Item = &'a WinRecord>,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let records: Vec<&WinRecord> = records.into_iter().collect();
    let path = dir.join(format!("winners-{}.json", Utc::now().format("%Y%m%d-%H%M%S")));
    std::fs::write(&path, to_json(records.iter().copied())?)?;

    info!(path = %path.display(), rows = records.len(), "Winners exported");
    Ok(path)
}
