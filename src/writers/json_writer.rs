use crate::error::Result;
use crate::processors::CumulativeStatsReport;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serializes a full report (statistics, station summaries and warnings).
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn write_report(&self, report: &CumulativeStatsReport, path: &Path) -> Result<()> {
        self.write_value(report, path)
    }

    /// Write any serializable value, used for chart data as well.
    pub fn write_value<T: Serialize>(&self, value: &T, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}
