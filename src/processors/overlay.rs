use crate::error::{ProcessingError, Result};
use crate::models::{CumulativeRecord, DailyCumulativeStats};
use std::collections::HashMap;

/// Cumulative trace of one water year, keyed by day of year.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySeries {
    pub station_id: String,
    pub water_year: i32,
    pub values: HashMap<u32, Option<f64>>,
}

impl OverlaySeries {
    /// Pull a single water year out of a station's cumulative records.
    ///
    /// The year is taken as-is: range, exclusion and month filters do not apply
    /// to the overlay. Fails when the year has no observed day.
    pub fn extract(station_id: &str, water_year: i32, records: &[CumulativeRecord]) -> Result<Self> {
        let year_records: Vec<&CumulativeRecord> = records
            .iter()
            .filter(|r| r.station_id == station_id && r.water_year == water_year)
            .collect();

        if !year_records.iter().any(|r| r.has_daily_value()) {
            return Err(ProcessingError::NoMatchingOverlayData {
                station_id: station_id.to_string(),
                year: water_year,
            });
        }

        Ok(Self {
            station_id: station_id.to_string(),
            water_year,
            values: year_records
                .into_iter()
                .map(|r| (r.day_of_year, r.cumulative_value))
                .collect(),
        })
    }

    pub fn value(&self, day_of_year: u32) -> Option<f64> {
        self.values.get(&day_of_year).copied().flatten()
    }

    /// Left join onto the statistics rows of the same station.
    pub fn attach(&self, stats: &mut [DailyCumulativeStats]) {
        for row in stats.iter_mut().filter(|r| r.station_id == self.station_id) {
            row.overlay = self.value(row.day_of_year);
        }
    }
}
