pub mod csv_writer;
pub mod json_writer;
pub mod parquet_writer;

pub use csv_writer::CsvWriter;
pub use json_writer::JsonWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};

use crate::error::{ProcessingError, Result};
use crate::models::{percentile_label, DailyCumulativeStats};
use crate::processors::CumulativeStatsReport;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    Parquet,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "parquet" | "pq" => Ok(OutputFormat::Parquet),
            _ => Err(ProcessingError::InvalidConfig(format!(
                "Unsupported output format: {}",
                name
            ))),
        }
    }

    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                ProcessingError::InvalidConfig(format!(
                    "Cannot infer output format from {}",
                    path.display()
                ))
            })?;
        Self::from_name(extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Parquet => "parquet",
        }
    }
}

/// Column layout of the flattened statistics table.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsLayout {
    pub percentiles: Vec<f64>,
    pub include_overlay: bool,
}

impl StatsLayout {
    pub const KEY_COLUMNS: [&'static str; 4] = ["station_id", "day_of_year", "date", "n_years"];
    pub const SUMMARY_COLUMNS: [&'static str; 4] = ["mean", "median", "minimum", "maximum"];
    pub const OVERLAY_COLUMN: &'static str = "overlay";

    /// Every row of a run carries the same percentile list, so the first row decides.
    pub fn from_stats(stats: &[DailyCumulativeStats], overlay_year: Option<i32>) -> Self {
        Self {
            percentiles: stats
                .first()
                .map(|row| row.percentiles.iter().map(|p| p.percentile).collect())
                .unwrap_or_default(),
            include_overlay: overlay_year.is_some(),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = Self::KEY_COLUMNS
            .iter()
            .chain(Self::SUMMARY_COLUMNS.iter())
            .map(|c| c.to_string())
            .collect();
        headers.extend(self.percentiles.iter().map(|p| percentile_label(*p)));
        if self.include_overlay {
            headers.push(Self::OVERLAY_COLUMN.to_string());
        }
        headers
    }

    /// Numeric statistic columns of one row, in header order.
    pub fn values(&self, row: &DailyCumulativeStats) -> Vec<Option<f64>> {
        let mut values = vec![row.mean, row.median, row.minimum, row.maximum];
        values.extend(self.percentiles.iter().map(|p| row.percentile(*p)));
        if self.include_overlay {
            values.push(row.overlay);
        }
        values
    }
}

/// Write the statistics of `report` to `path` in `format`.
pub fn write_report(
    report: &CumulativeStatsReport,
    path: &Path,
    format: OutputFormat,
    compression: &str,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let layout = StatsLayout::from_stats(&report.stats, report.overlay_year);
    match format {
        OutputFormat::Csv => CsvWriter::new().write_stats(&report.stats, &layout, path)?,
        OutputFormat::Json => JsonWriter::new().write_report(report, path)?,
        OutputFormat::Parquet => ParquetWriter::new()
            .with_compression(compression)?
            .write_stats(&report.stats, &layout, path)?,
    }

    info!(
        path = %path.display(),
        rows = report.stats.len(),
        format = format.extension(),
        "Statistics written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PercentileValue;
    use chrono::NaiveDate;

    fn row() -> DailyCumulativeStats {
        DailyCumulativeStats {
            station_id: "08NM116".to_string(),
            day_of_year: 1,
            calendar_date: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            n_years: 2,
            mean: Some(2.0),
            median: Some(2.0),
            minimum: Some(1.0),
            maximum: Some(3.0),
            percentiles: vec![
                PercentileValue {
                    percentile: 5.0,
                    value: Some(1.1),
                },
                PercentileValue {
                    percentile: 95.0,
                    value: Some(2.9),
                },
            ],
            overlay: Some(1.5),
        }
    }

    #[test]
    fn test_format_inference() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/stats.CSV")).unwrap(),
            OutputFormat::Csv
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("stats.parquet")).unwrap(),
            OutputFormat::Parquet
        );
        assert!(OutputFormat::from_path(Path::new("stats")).is_err());
        assert!(OutputFormat::from_name("xlsx").is_err());
    }

    #[test]
    fn test_layout_headers() {
        let layout = StatsLayout::from_stats(&[row()], Some(2002));
        assert_eq!(
            layout.headers(),
            vec![
                "station_id",
                "day_of_year",
                "date",
                "n_years",
                "mean",
                "median",
                "minimum",
                "maximum",
                "P5",
                "P95",
                "overlay"
            ]
        );
        assert_eq!(
            layout.values(&row()),
            vec![Some(2.0), Some(2.0), Some(1.0), Some(3.0), Some(1.1), Some(2.9), Some(1.5)]
        );

        let layout = StatsLayout::from_stats(&[row()], None);
        assert_eq!(layout.headers().len(), 10);
    }
}
