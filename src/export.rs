//! Spreadsheet and log exports written to the exports directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::events::{EventField, StoredEvent};

/// File name of the events spreadsheet.
pub const EVENTS_FILE: &str = "eventmanager_events.csv";

/// Render events as CSV with a header row, in the given order.
pub fn events_to_csv(events: &[StoredEvent]) -> String {
    let mut header: Vec<&str> = EventField::ALL.iter().map(|f| f.column()).collect();
    header.push("Created At");

    let mut lines = vec![header.join(",")];
    for event in events {
        let mut cells: Vec<String> = EventField::ALL
            .iter()
            .map(|f| csv_cell(event.record.value(*f)))
            .collect();
        cells.push(csv_cell(&event.created_at.to_rfc3339()));
        lines.push(cells.join(","));
    }
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

/// Quote a cell when it contains a delimiter, quote or line break.
fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// Dated log file name, e.g. `eventmanager_logs_2024-03-01.log`.
pub fn dated_log_name(stem: &str, day: NaiveDate) -> String {
    format!("eventmanager_{stem}_{}.log", day.format("%Y-%m-%d"))
}

/// Writes export files into one directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    /// Export into `dir`, created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write(&self, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create exports dir {}", self.dir.display()))?;
        let path = self.dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write export {}", path.display()))?;
        info!(path = %path.display(), bytes = contents.len(), "export written");
        Ok(path)
    }

    /// Write the events spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_events(&self, events: &[StoredEvent]) -> anyhow::Result<PathBuf> {
        self.write(EVENTS_FILE, &events_to_csv(events))
    }

    /// Write a dated log file named after `stem`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_log(&self, stem: &str, contents: &str) -> anyhow::Result<PathBuf> {
        self.write(&dated_log_name(stem, Utc::now().date_naive()), contents)
    }
}
