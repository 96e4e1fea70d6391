use crate::error::ProcessingError;
use crate::models::DailyCumulativeStats;
use crate::processors::FlowUnits;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    MissingBasinArea,
    NoMatchingOverlayData,
    EmptyInput,
    DateOutOfRange,
}

/// A station-level problem that skipped part or all of that station's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationWarning {
    pub station_id: String,
    pub kind: WarningKind,
    pub details: String,
}

impl StationWarning {
    /// `None` for errors that are not scoped to a station.
    pub fn from_error(error: &ProcessingError) -> Option<Self> {
        let (station_id, kind) = match error {
            ProcessingError::MissingBasinArea { station_id } => {
                (station_id, WarningKind::MissingBasinArea)
            }
            ProcessingError::NoMatchingOverlayData { station_id, .. } => {
                (station_id, WarningKind::NoMatchingOverlayData)
            }
            ProcessingError::EmptyInput { station_id } => (station_id, WarningKind::EmptyInput),
            ProcessingError::DateOutOfRange { station_id, .. } => {
                (station_id, WarningKind::DateOutOfRange)
            }
            _ => return None,
        };

        Some(Self {
            station_id: station_id.clone(),
            kind,
            details: error.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub station_id: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub observed_days: usize,
    pub missing_days: usize,
    pub water_years: BTreeSet<i32>,
    pub included_years: BTreeSet<i32>,
    pub units: FlowUnits,
}

/// Everything a run produces: the statistics table plus what happened per station.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CumulativeStatsReport {
    pub stats: Vec<DailyCumulativeStats>,
    pub summaries: Vec<StationSummary>,
    pub warnings: Vec<StationWarning>,
    pub overlay_year: Option<i32>,
}

impl CumulativeStatsReport {
    pub fn stations(&self) -> BTreeSet<&str> {
        self.summaries.iter().map(|s| s.station_id.as_str()).collect()
    }

    pub fn station_stats(&self, station_id: &str) -> Vec<&DailyCumulativeStats> {
        self.stats
            .iter()
            .filter(|s| s.station_id == station_id)
            .collect()
    }

    pub fn warnings_of(&self, kind: WarningKind) -> Vec<&StationWarning> {
        self.warnings.iter().filter(|w| w.kind == kind).collect()
    }

    pub fn is_skipped(&self, station_id: &str) -> bool {
        !self.stats.iter().any(|s| s.station_id == station_id)
    }

    /// Human-readable run summary.
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Cumulative Flow Statistics ===\n");
        summary.push_str(&format!("Stations processed: {}\n", self.summaries.len()));
        summary.push_str(&format!("Statistics rows: {}\n", self.stats.len()));
        if let Some(year) = self.overlay_year {
            summary.push_str(&format!("Overlay water year: {}\n", year));
        }

        for station in &self.summaries {
            let total_days = station.observed_days + station.missing_days;
            let coverage = if total_days == 0 {
                0.0
            } else {
                100.0 * station.observed_days as f64 / total_days as f64
            };
            summary.push_str(&format!(
                "  {}: {} to {}, {} water years ({} included), {:.1}% of days observed, {}\n",
                station.station_id,
                station.first_date,
                station.last_date,
                station.water_years.len(),
                station.included_years.len(),
                coverage,
                station.units.label()
            ));
        }

        summary.push_str(&format!("\nWarnings: {}\n", self.warnings.len()));
        for (i, warning) in self.warnings.iter().take(10).enumerate() {
            summary.push_str(&format!(
                "  {}. Station {}: {}\n",
                i + 1,
                warning.station_id,
                warning.details
            ));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_from_error() {
        let error = ProcessingError::MissingBasinArea {
            station_id: "08NM116".to_string(),
        };
        let warning = StationWarning::from_error(&error).unwrap();

        assert_eq!(warning.station_id, "08NM116");
        assert_eq!(warning.kind, WarningKind::MissingBasinArea);
        assert!(warning.details.contains("basin area"));

        let error = ProcessingError::InvalidConfig("bad".to_string());
        assert!(StationWarning::from_error(&error).is_none());
    }

    #[test]
    fn test_summary_lists_warnings() {
        let report = CumulativeStatsReport {
            warnings: vec![StationWarning {
                station_id: "08NM116".to_string(),
                kind: WarningKind::EmptyInput,
                details: "No observations remain for station 08NM116".to_string(),
            }],
            overlay_year: Some(2001),
            ..CumulativeStatsReport::default()
        };

        let summary = report.generate_summary();
        assert!(summary.contains("Warnings: 1"));
        assert!(summary.contains("Overlay water year: 2001"));
        assert_eq!(report.warnings_of(WarningKind::EmptyInput).len(), 1);
        assert!(report.is_skipped("08NM116"));
    }
}
