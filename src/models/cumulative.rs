use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Running total of daily flow from the first day of a water year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeRecord {
    pub station_id: String,
    pub water_year: i32,
    pub day_of_year: u32,
    /// Nominal calendar date of the slot (February 28 for a folded leap day).
    pub date: NaiveDate,
    /// Converted daily amount for the slot's nominal date.
    pub daily_value: Option<f64>,
    /// `None` once any earlier day of the water year was missing.
    pub cumulative_value: Option<f64>,
}

impl CumulativeRecord {
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn has_daily_value(&self) -> bool {
        self.daily_value.is_some()
    }
}
