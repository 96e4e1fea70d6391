use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: Option<f64>,
}

impl PercentileValue {
    /// Column label, e.g. `P5` or `P2.5`.
    pub fn label(&self) -> String {
        percentile_label(self.percentile)
    }
}

pub fn percentile_label(percentile: f64) -> String {
    if percentile.fract() == 0.0 {
        format!("P{}", percentile as i64)
    } else {
        format!("P{}", percentile)
    }
}

/// Cross-year statistics of cumulative flow for one station and day of year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCumulativeStats {
    pub station_id: String,
    pub day_of_year: u32,
    pub calendar_date: NaiveDate,
    /// Number of non-null values behind the statistics.
    pub n_years: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub percentiles: Vec<PercentileValue>,
    /// Cumulative value of the overlay year on this day, when one was requested.
    pub overlay: Option<f64>,
}

impl DailyCumulativeStats {
    pub fn percentile(&self, percentile: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|p| (p.percentile - percentile).abs() < f64::EPSILON)
            .and_then(|p| p.value)
    }

    pub fn is_empty(&self) -> bool {
        self.n_years == 0
    }

    /// Month and day label used on calendar axes, e.g. `Mar-15`.
    pub fn month_day_label(&self) -> String {
        self.calendar_date.format("%b-%d").to_string()
    }

    /// Checks `min <= percentiles (ascending) <= max` and that the median sits
    /// in order. Rows without data are trivially ordered.
    pub fn is_ordered(&self) -> bool {
        let (Some(min), Some(max), Some(median)) = (self.minimum, self.maximum, self.median)
        else {
            return true;
        };

        let mut sequence = vec![(0.0, min), (50.0, median), (100.0, max)];
        for p in &self.percentiles {
            if let Some(value) = p.value {
                sequence.push((p.percentile, value));
            }
        }
        sequence.sort_by(|a, b| a.0.total_cmp(&b.0));

        let tolerance = 1e-9 * max.abs().max(1.0);
        sequence.windows(2).all(|w| w[0].1 <= w[1].1 + tolerance)
    }
}
